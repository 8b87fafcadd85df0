//! Printing error types.

use thiserror::Error;

use crate::memory::MemoryError;
use crate::schema::ValueKind;

/// Reasons a print operation stopped early.
///
/// Every field-level variant carries the dotted path of the failing field
/// from the top-level record (`"outer.items.id"`).
#[derive(Error, Debug)]
pub enum PrintError {
    /// Required field whose storage holds no data
    #[error("Required field '{path}' has no data")]
    RequiredFieldMissing { path: String },

    /// Field filled in by a callback
    #[error("Field '{path}' uses callback storage and cannot be read")]
    CallbackStorage { path: String },

    /// Extension slot
    #[error("Field '{path}' is an extension field")]
    ExtensionField { path: String },

    /// Value kind with no printable representation
    #[error("Field '{path}' has unsupported kind {kind:?}")]
    UnsupportedKind { path: String, kind: ValueKind },

    /// Value kind and byte width do not form a readable value
    #[error("Field '{path}' has unsupported width {width} for kind {kind:?}")]
    UnsupportedWidth {
        path: String,
        kind: ValueKind,
        width: usize,
    },

    /// Length prefix larger than the inline buffer
    #[error("Field '{path}' length {len} exceeds capacity {capacity}")]
    LengthOverflow {
        path: String,
        len: usize,
        capacity: usize,
    },

    /// Element count larger than the array can hold
    #[error("Field '{path}' count {count} exceeds capacity {capacity}")]
    CountOverflow {
        path: String,
        count: u64,
        capacity: usize,
    },

    /// Nesting deeper than the configured limit
    #[error("Field '{path}' nests deeper than the limit of {limit}")]
    DepthExceeded { path: String, limit: usize },

    /// Record memory could not be read
    #[error("Field '{path}': {source}")]
    Memory {
        path: String,
        #[source]
        source: MemoryError,
    },

    /// Output sink failure
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    /// Path of the failing field, if the error is tied to one.
    pub fn path(&self) -> Option<&str> {
        match self {
            PrintError::RequiredFieldMissing { path }
            | PrintError::CallbackStorage { path }
            | PrintError::ExtensionField { path }
            | PrintError::UnsupportedKind { path, .. }
            | PrintError::UnsupportedWidth { path, .. }
            | PrintError::LengthOverflow { path, .. }
            | PrintError::CountOverflow { path, .. }
            | PrintError::DepthExceeded { path, .. }
            | PrintError::Memory { path, .. } => Some(path.as_str()),
            PrintError::Io(_) => None,
        }
    }

    /// Fills in the failing-field path unless a deeper level already did.
    pub(crate) fn locate(mut self, path: impl FnOnce() -> String) -> Self {
        match &mut self {
            PrintError::RequiredFieldMissing { path: slot }
            | PrintError::CallbackStorage { path: slot }
            | PrintError::ExtensionField { path: slot }
            | PrintError::UnsupportedKind { path: slot, .. }
            | PrintError::UnsupportedWidth { path: slot, .. }
            | PrintError::LengthOverflow { path: slot, .. }
            | PrintError::CountOverflow { path: slot, .. }
            | PrintError::DepthExceeded { path: slot, .. }
            | PrintError::Memory { path: slot, .. } => {
                if slot.is_empty() {
                    *slot = path();
                }
            }
            PrintError::Io(_) => {}
        }
        self
    }
}

impl From<MemoryError> for PrintError {
    fn from(source: MemoryError) -> Self {
        PrintError::Memory {
            path: String::new(),
            source,
        }
    }
}
