//! Memory image files: hex-encoded blocks plus the root record address.
//!
//! ```json
//! { "blocks": ["2a000000", "68690000"], "root": { "block": 0, "offset": 0 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::memory::{Address, Memory};

/// Error type for memory image loading.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Block {block} is not valid hex: {source}")]
    InvalidHex {
        block: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Root address block {block} offset {offset} is outside the image")]
    RootOutOfBounds { block: usize, offset: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serialized form of a [`Memory`] holding one record instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryImage {
    /// Blocks as hex strings, in block index order
    pub blocks: Vec<String>,
    /// Address of the root record
    #[serde(default)]
    pub root: Address,
}

impl MemoryImage {
    /// Captures every block of `memory`.
    pub fn from_memory(memory: &Memory, root: Address) -> Self {
        Self {
            blocks: memory.blocks().iter().map(hex::encode).collect(),
            root,
        }
    }

    /// Decodes the blocks into a [`Memory`] and returns it with the root
    /// address.
    pub fn to_memory(&self) -> Result<(Memory, Address), ImageError> {
        let mut memory = Memory::new();
        for (block, text) in self.blocks.iter().enumerate() {
            let bytes = hex::decode(text.trim())
                .map_err(|source| ImageError::InvalidHex { block, source })?;
            memory.alloc(bytes);
        }

        let root_in_bounds = memory
            .block(self.root.block)
            .is_some_and(|b| self.root.offset <= b.len());
        if !root_in_bounds {
            return Err(ImageError::RootOutOfBounds {
                block: self.root.block,
                offset: self.root.offset,
            });
        }
        Ok((memory, self.root))
    }

    /// Parses an image from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ImageError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads an image from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Writes the image to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
