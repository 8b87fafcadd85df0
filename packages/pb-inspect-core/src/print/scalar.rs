//! Scalar value decoding and rendering.

use std::io::{self, Write};

use crate::error::PrintError;
use crate::memory::{Address, Memory};
use crate::schema::ValueKind;

/// Readable representation of one scalar value, derived from its kind and
/// declared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarLayout {
    /// Flag of any width, true if any byte is nonzero
    Bool { width: usize },
    /// Little-endian unsigned integer of 1, 2, 4 or 8 bytes
    UInt { width: usize },
    /// Fixed 32/64-bit little-endian block
    Fixed { len: usize },
    /// Fixed-length byte block
    Block { len: usize },
    /// Length prefix followed by data; `capacity` bounds inline buffers
    LengthPrefixed {
        prefix: usize,
        capacity: Option<usize>,
    },
    /// NUL-terminated text; `capacity` bounds inline buffers
    CString { capacity: Option<usize> },
}

impl ScalarLayout {
    /// Classifies a (kind, width) pair.
    ///
    /// `inline` is true when the value lives in a fixed-capacity buffer of
    /// `data_size` bytes rather than in an externally-owned block.
    pub(crate) fn classify(
        kind: ValueKind,
        data_size: usize,
        inline: bool,
        size_width: usize,
    ) -> Result<Self, PrintError> {
        let unsupported_width = || PrintError::UnsupportedWidth {
            path: String::new(),
            kind,
            width: data_size,
        };

        match kind {
            ValueKind::Bool if data_size > 0 => Ok(ScalarLayout::Bool { width: data_size }),
            ValueKind::Varint | ValueKind::Uvarint | ValueKind::Svarint
                if matches!(data_size, 1 | 2 | 4 | 8) =>
            {
                Ok(ScalarLayout::UInt { width: data_size })
            }
            ValueKind::Fixed32 if data_size == 4 => Ok(ScalarLayout::Fixed { len: 4 }),
            ValueKind::Fixed64 if data_size == 8 => Ok(ScalarLayout::Fixed { len: 8 }),
            ValueKind::FixedLengthBytes => Ok(ScalarLayout::Block { len: data_size }),
            ValueKind::Bytes if !inline => Ok(ScalarLayout::LengthPrefixed {
                prefix: size_width,
                capacity: None,
            }),
            ValueKind::Bytes if data_size >= size_width => Ok(ScalarLayout::LengthPrefixed {
                prefix: size_width,
                capacity: Some(data_size - size_width),
            }),
            ValueKind::String => Ok(ScalarLayout::CString {
                capacity: inline.then_some(data_size),
            }),
            ValueKind::Bool
            | ValueKind::Varint
            | ValueKind::Uvarint
            | ValueKind::Svarint
            | ValueKind::Fixed32
            | ValueKind::Fixed64
            | ValueKind::Bytes => Err(unsupported_width()),
            ValueKind::Submessage | ValueKind::SubmessageWithCallback | ValueKind::Extension => {
                Err(PrintError::UnsupportedKind {
                    path: String::new(),
                    kind,
                })
            }
        }
    }
}

/// One decoded scalar value borrowing from record memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarValue<'m> {
    Bool(bool),
    UInt(u64),
    Fixed(&'m [u8]),
    Block(&'m [u8]),
    Bytes(&'m [u8]),
    Text(&'m [u8]),
}

impl ScalarValue<'_> {
    /// Returns `true` if the value equals its kind's default.
    pub(crate) fn is_default(&self) -> bool {
        match self {
            ScalarValue::Bool(value) => !value,
            ScalarValue::UInt(value) => *value == 0,
            ScalarValue::Fixed(bytes) => bytes.iter().all(|&b| b == 0),
            ScalarValue::Block(bytes) | ScalarValue::Bytes(bytes) | ScalarValue::Text(bytes) => {
                bytes.is_empty()
            }
        }
    }

    /// Writes the textual form of the value.
    pub(crate) fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            ScalarValue::Bool(value) => out.write_all(if *value { b"true" } else { b"false" }),
            ScalarValue::UInt(value) => write!(out, "0x{:x}", value),
            // Most-significant byte first
            ScalarValue::Fixed(bytes) => write_nibbles(out, bytes.iter().rev()),
            ScalarValue::Block(bytes) | ScalarValue::Bytes(bytes) => write_nibbles(out, bytes.iter()),
            ScalarValue::Text(bytes) => out.write_all(bytes),
        }
    }
}

/// Writes the low nibble of each byte as one hex digit.
fn write_nibbles<'b, W: Write + ?Sized>(
    out: &mut W,
    bytes: impl Iterator<Item = &'b u8>,
) -> io::Result<()> {
    for byte in bytes {
        write!(out, "{:x}", byte & 0xf)?;
    }
    Ok(())
}

/// Decodes the value at `addr` according to `layout`.
pub(crate) fn decode(
    memory: &Memory,
    layout: ScalarLayout,
    addr: Address,
) -> Result<ScalarValue<'_>, PrintError> {
    let value = match layout {
        ScalarLayout::Bool { width } => ScalarValue::Bool(memory.read_flag(addr, width)?),
        ScalarLayout::UInt { width } => ScalarValue::UInt(memory.read_uint(addr, width)?),
        ScalarLayout::Fixed { len } => ScalarValue::Fixed(memory.read(addr, len)?),
        ScalarLayout::Block { len } => ScalarValue::Block(memory.read(addr, len)?),
        ScalarLayout::LengthPrefixed { prefix, capacity } => {
            let len = usize::try_from(memory.read_uint(addr, prefix)?).unwrap_or(usize::MAX);
            if let Some(capacity) = capacity {
                if len > capacity {
                    return Err(PrintError::LengthOverflow {
                        path: String::new(),
                        len,
                        capacity,
                    });
                }
            }
            ScalarValue::Bytes(memory.read(addr.add(prefix), len)?)
        }
        ScalarLayout::CString { capacity } => ScalarValue::Text(memory.read_c_str(addr, capacity)?),
    };
    Ok(value)
}
