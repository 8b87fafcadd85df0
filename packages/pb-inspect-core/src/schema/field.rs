//! Field definitions within a message descriptor.

use serde::{Deserialize, Serialize};

/// Index of a message descriptor within its [`Schema`](super::Schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub usize);

/// Declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Varint,
    Uvarint,
    Svarint,
    Fixed32,
    Fixed64,
    Bytes,
    String,
    Submessage,
    SubmessageWithCallback,
    FixedLengthBytes,
    Extension,
}

impl ValueKind {
    /// Returns `true` for kinds rendered directly as one scalar value.
    pub fn is_scalar(self) -> bool {
        !matches!(
            self,
            ValueKind::Submessage | ValueKind::SubmessageWithCallback | ValueKind::Extension
        )
    }

    /// Returns `true` for kinds that reference a nested message type.
    pub fn is_submessage(self) -> bool {
        matches!(
            self,
            ValueKind::Submessage | ValueKind::SubmessageWithCallback
        )
    }
}

/// Presence discipline of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    Required,
    Optional,
    Oneof,
    Repeated,
}

/// How a field's data is located from the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    /// Data is stored inline in the record
    #[default]
    Static,
    /// An inline pointer cell references externally-owned data
    Pointer,
    /// Data is produced on demand by a callback and is not readable
    Callback,
}

/// Presence flag, oneof discriminant or element count cell of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeCell {
    /// Byte offset within the record
    pub offset: usize,
    /// Width of the cell in bytes
    pub width: usize,
}

/// Field definition within a message descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field number; the discriminant value for oneof members
    pub tag: u32,
    /// Declared value type
    pub kind: ValueKind,
    /// Presence discipline
    pub multiplicity: Multiplicity,
    /// Storage representation
    pub storage: Storage,
    /// Byte width of one value instance
    pub data_size: usize,
    /// Byte offset of the data cell within the record
    pub data_offset: usize,
    /// Byte width of the data cell within the record
    pub data_cell_size: usize,
    /// Presence, discriminant or count cell
    pub size_cell: Option<SizeCell>,
    /// Capacity of a static repeated field (1 for other fields)
    pub array_size: usize,
    /// Nested message type for submessage fields
    pub submessage: Option<MessageId>,
}
