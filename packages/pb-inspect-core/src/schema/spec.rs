//! Schema file format: message and field definitions without offsets.

use serde::{Deserialize, Serialize};

use super::field::{Multiplicity, Storage, ValueKind};

/// Default width of count, discriminant and length-prefix cells.
pub const DEFAULT_SIZE_WIDTH: usize = 2;

fn default_size_width() -> usize {
    DEFAULT_SIZE_WIDTH
}

fn default_array_size() -> usize {
    1
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Schema file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Width in bytes of count, discriminant and length-prefix cells
    #[serde(default = "default_size_width")]
    pub size_width: usize,
    /// Message definitions, in declaration order
    pub messages: Vec<MessageSpec>,
}

impl Default for SchemaFile {
    fn default() -> Self {
        Self {
            size_width: DEFAULT_SIZE_WIDTH,
            messages: Vec::new(),
        }
    }
}

/// Message definition as written in a schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSpec {
    /// Message type name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldSpec>,
}

impl MessageSpec {
    /// Creates a message definition with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// Field definition as written in a schema file.
///
/// `data_size` is the width of one value: the integer width for integer
/// kinds, length prefix plus capacity for `bytes`, buffer capacity for
/// `string`. For submessages with a resolvable type it may be left at zero
/// and is taken from the nested message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Field number
    pub tag: u32,
    /// Value type
    pub kind: ValueKind,
    /// Presence discipline
    pub multiplicity: Multiplicity,
    /// Storage representation
    #[serde(default)]
    pub storage: Storage,
    /// Byte width of one value
    #[serde(default)]
    pub data_size: usize,
    /// Optional field carries an explicit presence flag
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_flag: bool,
    /// Oneof group name for oneof members
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneof: Option<String>,
    /// Capacity of a repeated field
    #[serde(default = "default_array_size")]
    pub array_size: usize,
    /// Repeated field always holds `array_size` elements and has no count cell
    #[serde(default, skip_serializing_if = "is_false")]
    pub fixed_count: bool,
    /// Nested message type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submessage: Option<String>,
}

impl FieldSpec {
    fn new(
        name: impl Into<String>,
        tag: u32,
        kind: ValueKind,
        multiplicity: Multiplicity,
        data_size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            tag,
            kind,
            multiplicity,
            storage: Storage::Static,
            data_size,
            has_flag: false,
            oneof: None,
            array_size: 1,
            fixed_count: false,
            submessage: None,
        }
    }

    /// Required field.
    pub fn required(name: impl Into<String>, tag: u32, kind: ValueKind, data_size: usize) -> Self {
        Self::new(name, tag, kind, Multiplicity::Required, data_size)
    }

    /// Optional field without a presence flag.
    pub fn optional(name: impl Into<String>, tag: u32, kind: ValueKind, data_size: usize) -> Self {
        Self::new(name, tag, kind, Multiplicity::Optional, data_size)
    }

    /// Repeated field with room for `array_size` elements.
    pub fn repeated(
        name: impl Into<String>,
        tag: u32,
        kind: ValueKind,
        data_size: usize,
        array_size: usize,
    ) -> Self {
        let mut spec = Self::new(name, tag, kind, Multiplicity::Repeated, data_size);
        spec.array_size = array_size;
        spec
    }

    /// Member of the oneof group `group`.
    pub fn oneof(
        group: impl Into<String>,
        name: impl Into<String>,
        tag: u32,
        kind: ValueKind,
        data_size: usize,
    ) -> Self {
        let mut spec = Self::new(name, tag, kind, Multiplicity::Oneof, data_size);
        spec.oneof = Some(group.into());
        spec
    }

    /// Adds an explicit presence flag.
    pub fn with_has_flag(mut self) -> Self {
        self.has_flag = true;
        self
    }

    /// Switches to pointer storage.
    pub fn pointer(mut self) -> Self {
        self.storage = Storage::Pointer;
        self
    }

    /// Switches to callback storage.
    pub fn callback(mut self) -> Self {
        self.storage = Storage::Callback;
        self
    }

    /// Removes the count cell; the field always holds `array_size` elements.
    pub fn fixed_count(mut self) -> Self {
        self.fixed_count = true;
        self
    }

    /// Sets the nested message type.
    pub fn submessage(mut self, message: impl Into<String>) -> Self {
        self.submessage = Some(message.into());
        self
    }
}
