//! Repeated fields and nested records.

use std::io::Write;

use super::cursor::FieldCursor;
use super::Printer;
use crate::error::PrintError;
use crate::memory::Address;
use crate::schema::{FieldDef, Storage};

impl<'a, W: Write> Printer<'a, W> {
    /// Prints a repeated field as `[e0,e1,...,]`.
    ///
    /// Elements are packed contiguously from `data` and read as inline
    /// values whatever the declared storage. The count is bounded by the
    /// static array size, or for pointer storage by the elements that fit in
    /// the pointed-to block.
    pub(super) fn print_array(
        &mut self,
        cursor: &FieldCursor<'a>,
        data: Address,
        depth: usize,
    ) -> Result<(), PrintError> {
        let field = cursor.field;
        let count = match cursor.size_cell {
            Some((cell, width)) => self.memory.read_uint(cell, width)?,
            None => field.array_size as u64,
        };
        // Externally-owned elements must lie within the pointed-to block.
        let capacity = match field.storage {
            Storage::Static => field.array_size,
            _ => self.memory.remaining(data) / field.data_size.max(1),
        };
        let count = usize::try_from(count)
            .ok()
            .filter(|&n| n <= capacity)
            .ok_or_else(|| PrintError::CountOverflow {
                path: String::new(),
                count,
                capacity,
            })?;

        write!(self.out, "[")?;
        let mut element = data;
        for _ in 0..count {
            let result = self.print_value(field, element, true, depth);
            write!(self.out, ",")?;
            element = element.add(field.data_size);
            result?;
        }
        write!(self.out, "]")?;
        Ok(())
    }

    /// Prints a nested record one indentation level deeper.
    pub(super) fn print_nested(
        &mut self,
        field: &'a FieldDef,
        data: Address,
        depth: usize,
    ) -> Result<(), PrintError> {
        writeln!(self.out)?;

        let schema = self.schema;
        match field.submessage.and_then(|id| schema.message(id)) {
            Some(nested) => self.print_message(nested, data, depth + 1),
            None => {
                tracing::warn!(
                    "Submessage field '{}' has no message descriptor, printing nothing",
                    self.path_string()
                );
                Ok(())
            }
        }
    }
}
