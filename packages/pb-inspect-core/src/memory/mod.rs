//! Byte-addressed memory holding decoded record instances.
//!
//! A [`Memory`] is an ordered set of blocks. Inline record data lives in one
//! block; externally-owned data (pointer storage) lives in blocks of its own
//! and is reached through 8-byte pointer cells.

mod error;

pub use error::MemoryError;

/// Width in bytes of a pointer cell.
pub const POINTER_WIDTH: usize = 8;

/// Location of one byte inside a [`Memory`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Address {
    /// Index of the block
    pub block: usize,
    /// Byte offset within the block
    pub offset: usize,
}

impl Address {
    /// Creates an address from block index and offset.
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }

    /// Returns this address moved forward by `bytes`.
    pub fn add(self, bytes: usize) -> Self {
        Self {
            block: self.block,
            offset: self.offset + bytes,
        }
    }

    /// Encodes the address as the raw value stored in a pointer cell.
    pub fn to_raw(self) -> u64 {
        ((self.block as u64 + 1) << 32) | (self.offset as u64 & 0xffff_ffff)
    }

    /// Decodes a raw pointer cell value. Zero, and values with an empty block
    /// part, decode to `None`.
    pub fn from_raw(raw: u64) -> Option<Self> {
        if raw == 0 {
            return None;
        }
        let block = (raw >> 32).checked_sub(1)?;
        Some(Self {
            block: block as usize,
            offset: (raw & 0xffff_ffff) as usize,
        })
    }
}

/// Block-structured memory for record instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    blocks: Vec<Vec<u8>>,
}

impl Memory {
    /// Creates an empty memory.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Appends a block and returns the address of its first byte.
    pub fn alloc(&mut self, bytes: Vec<u8>) -> Address {
        self.blocks.push(bytes);
        Address::new(self.blocks.len() - 1, 0)
    }

    /// Appends a zero-filled block of `len` bytes.
    pub fn alloc_zeroed(&mut self, len: usize) -> Address {
        self.alloc(vec![0u8; len])
    }

    /// Returns the number of bytes from `addr` to the end of its block, or 0
    /// for an address outside memory.
    pub fn remaining(&self, addr: Address) -> usize {
        self.blocks
            .get(addr.block)
            .map_or(0, |b| b.len().saturating_sub(addr.offset))
    }

    /// Returns the bytes of one block.
    pub fn block(&self, block: usize) -> Option<&[u8]> {
        self.blocks.get(block).map(Vec::as_slice)
    }

    /// Returns all blocks in index order.
    pub fn blocks(&self) -> &[Vec<u8>] {
        &self.blocks
    }

    /// Reads `len` bytes starting at `addr`.
    pub fn read(&self, addr: Address, len: usize) -> Result<&[u8], MemoryError> {
        let out_of_bounds = MemoryError::OutOfBounds {
            block: addr.block,
            offset: addr.offset,
            len,
        };
        let block = self.blocks.get(addr.block).ok_or(out_of_bounds.clone())?;
        let end = addr.offset.checked_add(len).ok_or(out_of_bounds.clone())?;
        block.get(addr.offset..end).ok_or(out_of_bounds)
    }

    /// Reads a little-endian unsigned integer of exactly 1, 2, 4 or 8 bytes.
    pub fn read_uint(&self, addr: Address, width: usize) -> Result<u64, MemoryError> {
        if !matches!(width, 1 | 2 | 4 | 8) {
            return Err(MemoryError::UnsupportedWidth { width });
        }
        let bytes = self.read(addr, width)?;
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a flag cell of any width: true if any byte is nonzero.
    pub fn read_flag(&self, addr: Address, width: usize) -> Result<bool, MemoryError> {
        Ok(self.read(addr, width)?.iter().any(|&b| b != 0))
    }

    /// Reads a pointer cell. Returns `None` for the null pointer.
    pub fn read_pointer(&self, addr: Address) -> Result<Option<Address>, MemoryError> {
        let raw = self.read_uint(addr, POINTER_WIDTH)?;
        if raw == 0 {
            return Ok(None);
        }
        match Address::from_raw(raw) {
            Some(target) if target.block < self.blocks.len() => Ok(Some(target)),
            _ => Err(MemoryError::DanglingPointer { raw }),
        }
    }

    /// Reads a NUL-terminated byte string.
    ///
    /// With `capacity` the scan is bounded to that many bytes; without it the
    /// scan runs to the end of the block. The terminator is not included.
    pub fn read_c_str(
        &self,
        addr: Address,
        capacity: Option<usize>,
    ) -> Result<&[u8], MemoryError> {
        let len = capacity.unwrap_or_else(|| self.remaining(addr));
        let bytes = self.read(addr, len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(&bytes[..end])
    }

    /// Writes `bytes` starting at `addr`.
    pub fn write(&mut self, addr: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let out_of_bounds = MemoryError::OutOfBounds {
            block: addr.block,
            offset: addr.offset,
            len: bytes.len(),
        };
        let end = addr
            .offset
            .checked_add(bytes.len())
            .ok_or(out_of_bounds.clone())?;
        let slot = self
            .blocks
            .get_mut(addr.block)
            .and_then(|b| b.get_mut(addr.offset..end))
            .ok_or(out_of_bounds)?;
        slot.copy_from_slice(bytes);
        Ok(())
    }

    /// Writes a little-endian unsigned integer of exactly 1, 2, 4 or 8 bytes.
    pub fn write_uint(&mut self, addr: Address, width: usize, value: u64) -> Result<(), MemoryError> {
        if !matches!(width, 1 | 2 | 4 | 8) {
            return Err(MemoryError::UnsupportedWidth { width });
        }
        if width < 8 && value >> (width * 8) != 0 {
            return Err(MemoryError::ValueTooWide { value, width });
        }
        self.write(addr, &value.to_le_bytes()[..width])
    }

    /// Writes a pointer cell.
    pub fn write_pointer(&mut self, addr: Address, target: Option<Address>) -> Result<(), MemoryError> {
        let raw = target.map(Address::to_raw).unwrap_or(0);
        self.write_uint(addr, POINTER_WIDTH, raw)
    }
}
