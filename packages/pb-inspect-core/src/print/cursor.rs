//! Iteration cursor over the fields of one record.

use crate::memory::{Address, Memory, MemoryError};
use crate::schema::{FieldDef, MessageDescriptor, Storage, ValueKind};

/// Position of a traversal within one record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldCursor<'a> {
    message: &'a MessageDescriptor,
    base: Address,
    /// Index of the current field
    pub(crate) index: usize,
    pub(crate) field: &'a FieldDef,
    pub(crate) name: &'a str,
    /// Inline data cell of the current field
    pub(crate) cell: Address,
    /// Presence, discriminant or count cell and its width
    pub(crate) size_cell: Option<(Address, usize)>,
}

impl<'a> FieldCursor<'a> {
    /// Positions a cursor at the first field. `None` for messages without
    /// fields.
    pub(crate) fn begin(message: &'a MessageDescriptor, base: Address) -> Option<Self> {
        Self::at(message, base, 0)
    }

    fn at(message: &'a MessageDescriptor, base: Address, index: usize) -> Option<Self> {
        let (field, name) = message.field(index)?;
        Some(Self {
            message,
            base,
            index,
            field,
            name,
            cell: base.add(field.data_offset),
            size_cell: field
                .size_cell
                .map(|cell| (base.add(cell.offset), cell.width)),
        })
    }

    /// Advances to the next field. Returns `false` past the last field.
    pub(crate) fn next(&mut self) -> bool {
        match Self::at(self.message, self.base, self.index + 1) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }

    /// Resolves the location of the field's data.
    ///
    /// Pointer storage is dereferenced and yields `None` when the pointer is
    /// null. Extension slots are never dereferenced.
    pub(crate) fn data(&self, memory: &Memory) -> Result<Option<Address>, MemoryError> {
        match self.field.storage {
            Storage::Pointer if self.field.kind != ValueKind::Extension => {
                memory.read_pointer(self.cell)
            }
            _ => Ok(Some(self.cell)),
        }
    }
}
