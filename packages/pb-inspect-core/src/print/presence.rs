//! Field presence rules.

use super::cursor::FieldCursor;
use super::scalar::{self, ScalarLayout};
use crate::error::PrintError;
use crate::memory::{Address, Memory};
use crate::schema::{Multiplicity, Storage};

/// Outcome of presence evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// Field is printed; carries the resolved data location
    Present(Address),
    Absent,
}

/// Decides whether the field under the cursor is printed.
///
/// A required field whose pointer is null is an error rather than absent.
pub(crate) fn evaluate(
    memory: &Memory,
    size_width: usize,
    cursor: &FieldCursor<'_>,
) -> Result<Presence, PrintError> {
    let field = cursor.field;

    match field.multiplicity {
        Multiplicity::Oneof => {
            let Some((cell, width)) = cursor.size_cell else {
                return Ok(Presence::Absent);
            };
            if memory.read_uint(cell, width)? != u64::from(field.tag) {
                return Ok(Presence::Absent);
            }
        }
        Multiplicity::Optional => match cursor.size_cell {
            Some((cell, width)) => {
                if !memory.read_flag(cell, width)? {
                    return Ok(Presence::Absent);
                }
            }
            None if field.storage == Storage::Static && field.kind.is_scalar() => {
                // Without a presence flag, a value equal to its default is unset.
                let layout = ScalarLayout::classify(field.kind, field.data_size, true, size_width)?;
                if scalar::decode(memory, layout, cursor.cell)?.is_default() {
                    return Ok(Presence::Absent);
                }
            }
            None => {}
        },
        Multiplicity::Required | Multiplicity::Repeated => {}
    }

    match cursor.data(memory)? {
        Some(data) => Ok(Presence::Present(data)),
        None if field.multiplicity == Multiplicity::Required => {
            Err(PrintError::RequiredFieldMissing {
                path: String::new(),
            })
        }
        None => Ok(Presence::Absent),
    }
}
