/// Error type for schema construction, layout and loading.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Message '{name}' defined more than once")]
    DuplicateMessage { name: String },

    #[error("Field '{field}' of message '{message}' references unknown message '{target}'")]
    UnknownMessage {
        message: String,
        field: String,
        target: String,
    },

    #[error("Field '{field}' defined more than once in message '{message}'")]
    DuplicateField { message: String, field: String },

    #[error("Tag {tag} used more than once in message '{message}'")]
    DuplicateTag { message: String, tag: u32 },

    #[error("Message '{message}' has {fields} field definitions but {names} field names")]
    FieldNameMismatch {
        message: String,
        fields: usize,
        names: usize,
    },

    #[error("Field '{field}' of message '{message}' has invalid data size {size}")]
    InvalidDataSize {
        message: String,
        field: String,
        size: usize,
    },

    #[error("Field '{field}' of message '{message}': {reason}")]
    InvalidSpec {
        message: String,
        field: String,
        reason: String,
    },

    #[error("Message '{message}' embeds itself by value")]
    RecursiveEmbedding { message: String },

    #[error("Field '{field}' (offset={offset}, size={size}) exceeds record size {record_size} of message '{message}'")]
    FieldExceedsRecordSize {
        message: String,
        field: String,
        offset: usize,
        size: usize,
        record_size: usize,
    },

    #[error("Size cell width {width} is not one of 1, 2, 4 or 8 bytes")]
    InvalidSizeWidth { width: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
