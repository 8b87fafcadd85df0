/// Error type for reads and writes against a [`Memory`](super::Memory).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("Access of {len} bytes at block {block} offset {offset} is out of bounds")]
    OutOfBounds {
        block: usize,
        offset: usize,
        len: usize,
    },

    #[error("Integer width {width} is not one of 1, 2, 4 or 8 bytes")]
    UnsupportedWidth { width: usize },

    #[error("Pointer value {raw:#x} does not name an allocated block")]
    DanglingPointer { raw: u64 },

    #[error("Value {value:#x} does not fit in {width} bytes")]
    ValueTooWide { value: u64, width: usize },
}
