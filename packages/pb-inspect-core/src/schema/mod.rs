//! Message descriptors, schema construction and schema files.

mod error;
mod field;
pub(crate) mod layout;
mod spec;

use std::collections::HashMap;
use std::path::Path;

pub use error::SchemaError;
pub use field::{FieldDef, MessageId, Multiplicity, SizeCell, Storage, ValueKind};
pub use layout::CALLBACK_WIDTH;
pub use spec::{FieldSpec, MessageSpec, SchemaFile, DEFAULT_SIZE_WIDTH};

/// Descriptor for one message type: field definitions and the parallel
/// sequence of field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Message type name
    pub name: String,
    /// Field definitions in declaration order
    pub fields: Vec<FieldDef>,
    /// Field names, parallel to `fields`
    pub field_names: Vec<String>,
    /// Record size in bytes
    pub record_size: usize,
    /// Record alignment in bytes
    pub align: usize,
}

impl MessageDescriptor {
    /// Creates a descriptor, checking that names parallel the field
    /// definitions and every cell fits within the record.
    pub fn new(
        name: String,
        fields: Vec<FieldDef>,
        field_names: Vec<String>,
        record_size: usize,
        align: usize,
    ) -> Result<Self, SchemaError> {
        if fields.len() != field_names.len() {
            return Err(SchemaError::FieldNameMismatch {
                message: name,
                fields: fields.len(),
                names: field_names.len(),
            });
        }
        layout::validate_record_size(&name, &fields, &field_names, record_size)?;
        Ok(Self {
            name,
            fields,
            field_names,
            record_size,
            align,
        })
    }

    /// Returns the field definition and name at `index`.
    pub fn field(&self, index: usize) -> Option<(&FieldDef, &str)> {
        let field = self.fields.get(index)?;
        let name = self.field_names.get(index)?;
        Some((field, name.as_str()))
    }

    /// Looks up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.field_names
            .iter()
            .position(|n| n == name)
            .and_then(|index| self.fields.get(index))
    }
}

/// Immutable set of message descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    size_width: usize,
    messages: Vec<MessageDescriptor>,
    by_name: HashMap<String, MessageId>,
}

impl Schema {
    /// Builds a schema from a schema file.
    pub fn from_file(file: SchemaFile) -> Result<Self, SchemaError> {
        file.messages
            .into_iter()
            .fold(SchemaBuilder::new().size_width(file.size_width), SchemaBuilder::message)
            .build()
    }

    /// Parses and builds a schema from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = serde_json::from_str(text)?;
        Self::from_file(file)
    }

    /// Loads a schema from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Width in bytes of count, discriminant and length-prefix cells.
    pub fn size_width(&self) -> usize {
        self.size_width
    }

    /// Returns the message descriptor with the given id.
    pub fn message(&self, id: MessageId) -> Option<&MessageDescriptor> {
        self.messages.get(id.0)
    }

    /// Returns all message descriptors in declaration order.
    pub fn messages(&self) -> &[MessageDescriptor] {
        &self.messages
    }

    /// Looks up a message id by name.
    pub fn message_id(&self, name: &str) -> Option<MessageId> {
        self.by_name.get(name).copied()
    }

    /// Returns a descriptor handle for the named message type.
    pub fn descriptor(&self, name: &str) -> Option<Descriptor<'_>> {
        self.message_id(name).map(|id| Descriptor { schema: self, id })
    }
}

/// Handle naming one message type of a schema.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor<'s> {
    schema: &'s Schema,
    id: MessageId,
}

impl<'s> Descriptor<'s> {
    /// Returns a handle for message `id`, if the schema has it.
    pub fn new(schema: &'s Schema, id: MessageId) -> Option<Self> {
        schema.message(id)?;
        Some(Self { schema, id })
    }

    /// The schema this descriptor belongs to.
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// The message descriptor.
    pub fn message(&self) -> &'s MessageDescriptor {
        &self.schema.messages[self.id.0]
    }

    /// The message type name.
    pub fn name(&self) -> &'s str {
        &self.message().name
    }
}

/// Builder collecting message definitions into a [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    size_width: usize,
    messages: Vec<MessageSpec>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    /// Creates a builder with the default size cell width.
    pub fn new() -> Self {
        Self {
            size_width: DEFAULT_SIZE_WIDTH,
            messages: Vec::new(),
        }
    }

    /// Sets the width of count, discriminant and length-prefix cells.
    pub fn size_width(mut self, width: usize) -> Self {
        self.size_width = width;
        self
    }

    /// Adds a message definition.
    pub fn message(mut self, message: MessageSpec) -> Self {
        self.messages.push(message);
        self
    }

    /// Resolves references, computes layouts and builds the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        if !matches!(self.size_width, 1 | 2 | 4 | 8) {
            return Err(SchemaError::InvalidSizeWidth {
                width: self.size_width,
            });
        }

        let mut by_name = HashMap::new();
        for (index, message) in self.messages.iter().enumerate() {
            if by_name
                .insert(message.name.clone(), MessageId(index))
                .is_some()
            {
                return Err(SchemaError::DuplicateMessage {
                    name: message.name.clone(),
                });
            }
        }

        let messages = layout::layout_messages(self.size_width, &self.messages, &by_name)?;
        tracing::debug!(
            "Built schema with {} messages (size width {})",
            messages.len(),
            self.size_width
        );

        Ok(Schema {
            size_width: self.size_width,
            messages,
            by_name,
        })
    }
}
