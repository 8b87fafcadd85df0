//! Record layout calculation for schema file messages.
//!
//! Fields are placed in declaration order with natural alignment. Each
//! optional field with a presence flag gets a one-byte flag cell before its
//! data, each repeated field with a count gets a count cell before its data,
//! and each oneof group gets one discriminant cell followed by a union area
//! shared by all members.

use std::collections::{HashMap, HashSet};

use super::error::SchemaError;
use super::field::{FieldDef, MessageId, Multiplicity, SizeCell, Storage, ValueKind};
use super::spec::{FieldSpec, MessageSpec};
use super::MessageDescriptor;
use crate::memory::POINTER_WIDTH;

/// Width in bytes of a callback cell (function pointer and argument).
pub const CALLBACK_WIDTH: usize = 16;

/// Aligns an offset to the given alignment. `None` on overflow.
pub(crate) fn align_offset(offset: usize, align: usize) -> Option<usize> {
    if align == 0 {
        return Some(offset);
    }
    let remainder = offset % align;
    if remainder == 0 {
        Some(offset)
    } else {
        offset.checked_add(align - remainder)
    }
}

/// Places a cell of `size` bytes at the first `align`-aligned offset at or
/// after `offset`. Returns its start and end.
fn place(offset: usize, align: usize, size: usize) -> Option<(usize, usize)> {
    let start = align_offset(offset, align)?;
    Some((start, start.checked_add(size)?))
}

/// Validates that all data and size cells fit within the record size.
pub(crate) fn validate_record_size(
    message: &str,
    fields: &[FieldDef],
    names: &[String],
    record_size: usize,
) -> Result<(), SchemaError> {
    for (field, name) in fields.iter().zip(names) {
        let cells = std::iter::once((field.data_offset, field.data_cell_size))
            .chain(field.size_cell.map(|cell| (cell.offset, cell.width)));
        for (offset, size) in cells {
            if offset.saturating_add(size) > record_size {
                return Err(SchemaError::FieldExceedsRecordSize {
                    message: message.to_string(),
                    field: name.clone(),
                    offset,
                    size,
                    record_size,
                });
            }
        }
    }
    Ok(())
}

/// Size and alignment of a laid-out message.
#[derive(Debug, Clone, Copy)]
struct Extent {
    size: usize,
    align: usize,
}

/// Lays out every message of a schema.
///
/// Messages embedded by value are laid out before their embedders; pointer
/// references may form cycles.
pub(crate) fn layout_messages(
    size_width: usize,
    specs: &[MessageSpec],
    ids: &HashMap<String, MessageId>,
) -> Result<Vec<MessageDescriptor>, SchemaError> {
    let mut ctx = LayoutContext {
        size_width,
        specs,
        ids,
        done: vec![None; specs.len()],
        visiting: vec![false; specs.len()],
    };
    for index in 0..specs.len() {
        ctx.layout(MessageId(index))?;
    }

    let mut messages: Vec<MessageDescriptor> = ctx.done.into_iter().flatten().collect();

    // Pointer submessages take their element width from the target once every
    // message has a size.
    let sizes: Vec<usize> = messages.iter().map(|m| m.record_size).collect();
    for message in &mut messages {
        for field in &mut message.fields {
            if field.kind.is_submessage() && field.storage != Storage::Static && field.data_size == 0 {
                if let Some(MessageId(target)) = field.submessage {
                    field.data_size = sizes[target];
                }
            }
        }
    }

    Ok(messages)
}

struct LayoutContext<'a> {
    size_width: usize,
    specs: &'a [MessageSpec],
    ids: &'a HashMap<String, MessageId>,
    done: Vec<Option<MessageDescriptor>>,
    visiting: Vec<bool>,
}

impl LayoutContext<'_> {
    fn layout(&mut self, id: MessageId) -> Result<Extent, SchemaError> {
        if let Some(message) = &self.done[id.0] {
            return Ok(Extent {
                size: message.record_size,
                align: message.align,
            });
        }
        let specs = self.specs;
        let spec = &specs[id.0];
        if self.visiting[id.0] {
            return Err(SchemaError::RecursiveEmbedding {
                message: spec.name.clone(),
            });
        }
        self.visiting[id.0] = true;

        check_unique(spec)?;

        // Resolve nested references, laying out messages embedded by value.
        let mut resolved = Vec::with_capacity(spec.fields.len());
        for field in &spec.fields {
            check_field(spec, field)?;
            let target = match &field.submessage {
                Some(name) => Some(*self.ids.get(name).ok_or_else(|| {
                    SchemaError::UnknownMessage {
                        message: spec.name.clone(),
                        field: field.name.clone(),
                        target: name.clone(),
                    }
                })?),
                None => None,
            };
            let nested = match target {
                Some(target) if field.storage == Storage::Static => Some(self.layout(target)?),
                _ => None,
            };
            let cell = self.data_cell(spec, field, nested)?;
            resolved.push((target, cell));
        }

        // Union area of each oneof group is sized for its largest member.
        let mut groups: HashMap<&str, Extent> = HashMap::new();
        for (field, (_, cell)) in spec.fields.iter().zip(&resolved) {
            if let Some(group) = &field.oneof {
                let extent = groups.entry(group.as_str()).or_insert(Extent { size: 0, align: 1 });
                extent.size = extent.size.max(cell.size);
                extent.align = extent.align.max(cell.align);
            }
        }

        let sw = self.size_width;
        let mut offset = 0usize;
        let mut max_align = 1usize;
        let mut unions: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut fields = Vec::with_capacity(spec.fields.len());

        for (field, (target, cell)) in spec.fields.iter().zip(resolved) {
            let overflow = || too_large(spec, field);
            let (size_cell, data_offset) = match &field.oneof {
                Some(group) => {
                    let (disc, data) = match unions.get(group.as_str()) {
                        Some(&placed) => placed,
                        None => {
                            let extent = groups[group.as_str()];
                            let (disc, disc_end) = place(offset, sw, sw).ok_or_else(overflow)?;
                            let (data, end) =
                                place(disc_end, extent.align, extent.size).ok_or_else(overflow)?;
                            offset = end;
                            max_align = max_align.max(sw).max(extent.align);
                            unions.insert(group.as_str(), (disc, data));
                            (disc, data)
                        }
                    };
                    (Some(SizeCell { offset: disc, width: sw }), data)
                }
                None => {
                    let size_cell = match field.multiplicity {
                        Multiplicity::Optional if field.has_flag => {
                            let (flag, end) = place(offset, 1, 1).ok_or_else(overflow)?;
                            offset = end;
                            Some(SizeCell { offset: flag, width: 1 })
                        }
                        Multiplicity::Repeated if !field.fixed_count => {
                            let (count, end) = place(offset, sw, sw).ok_or_else(overflow)?;
                            offset = end;
                            max_align = max_align.max(sw);
                            Some(SizeCell { offset: count, width: sw })
                        }
                        _ => None,
                    };
                    let (data, end) = place(offset, cell.align, cell.size).ok_or_else(overflow)?;
                    offset = end;
                    max_align = max_align.max(cell.align);
                    (size_cell, data)
                }
            };

            fields.push(FieldDef {
                tag: field.tag,
                kind: field.kind,
                multiplicity: field.multiplicity,
                storage: field.storage,
                data_size: cell.elem_size,
                data_offset,
                data_cell_size: cell.size,
                size_cell,
                array_size: if field.multiplicity == Multiplicity::Repeated {
                    field.array_size
                } else {
                    1
                },
                submessage: target,
            });
        }

        let record_size = match (align_offset(offset, max_align), spec.fields.last()) {
            (Some(size), _) => size,
            (None, Some(last)) => return Err(too_large(spec, last)),
            (None, None) => 0,
        };
        let names = spec.fields.iter().map(|f| f.name.clone()).collect();
        let message = MessageDescriptor::new(spec.name.clone(), fields, names, record_size, max_align)?;

        self.visiting[id.0] = false;
        self.done[id.0] = Some(message);
        Ok(Extent {
            size: record_size,
            align: max_align,
        })
    }

    fn data_cell(
        &self,
        message: &MessageSpec,
        field: &FieldSpec,
        nested: Option<Extent>,
    ) -> Result<DataCell, SchemaError> {
        let invalid_size = |size| SchemaError::InvalidDataSize {
            message: message.name.clone(),
            field: field.name.clone(),
            size,
        };

        match field.storage {
            Storage::Pointer => {
                return Ok(DataCell {
                    elem_size: field.data_size,
                    size: POINTER_WIDTH,
                    align: POINTER_WIDTH,
                })
            }
            Storage::Callback => {
                return Ok(DataCell {
                    elem_size: field.data_size,
                    size: CALLBACK_WIDTH,
                    align: POINTER_WIDTH,
                })
            }
            Storage::Static => {}
        }

        let (elem_size, align) = match field.kind {
            ValueKind::Submessage | ValueKind::SubmessageWithCallback => match nested {
                Some(extent) if field.data_size == 0 || field.data_size == extent.size => {
                    (extent.size, extent.align)
                }
                Some(_) => return Err(invalid_size(field.data_size)),
                None => (field.data_size, POINTER_WIDTH.min(natural_align(field.data_size))),
            },
            ValueKind::Extension => (POINTER_WIDTH, POINTER_WIDTH),
            ValueKind::Bytes => {
                if field.data_size < self.size_width {
                    return Err(invalid_size(field.data_size));
                }
                (field.data_size, self.size_width)
            }
            ValueKind::String | ValueKind::FixedLengthBytes => (field.data_size, 1),
            ValueKind::Bool
            | ValueKind::Varint
            | ValueKind::Uvarint
            | ValueKind::Svarint
            | ValueKind::Fixed32
            | ValueKind::Fixed64 => {
                if field.data_size == 0 {
                    return Err(invalid_size(field.data_size));
                }
                (field.data_size, natural_align(field.data_size))
            }
        };

        let count = if field.multiplicity == Multiplicity::Repeated {
            field.array_size
        } else {
            1
        };
        Ok(DataCell {
            elem_size,
            size: elem_size
                .checked_mul(count)
                .ok_or_else(|| invalid_size(field.data_size))?,
            align,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct DataCell {
    /// Width of one value
    elem_size: usize,
    /// Width of the whole inline cell
    size: usize,
    align: usize,
}

/// Error for a field whose cells do not fit in the address space.
fn too_large(message: &MessageSpec, field: &FieldSpec) -> SchemaError {
    SchemaError::InvalidDataSize {
        message: message.name.clone(),
        field: field.name.clone(),
        size: field.data_size,
    }
}

/// Alignment of an inline value of `size` bytes: its size when that is a
/// power of two up to 8, byte alignment otherwise.
fn natural_align(size: usize) -> usize {
    if size.is_power_of_two() && size <= 8 {
        size
    } else {
        1
    }
}

fn check_unique(spec: &MessageSpec) -> Result<(), SchemaError> {
    let mut seen_names = HashSet::new();
    let mut seen_tags = HashSet::new();
    for field in &spec.fields {
        if !seen_names.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                message: spec.name.clone(),
                field: field.name.clone(),
            });
        }
        if !seen_tags.insert(field.tag) {
            return Err(SchemaError::DuplicateTag {
                message: spec.name.clone(),
                tag: field.tag,
            });
        }
    }
    Ok(())
}

fn check_field(message: &MessageSpec, field: &FieldSpec) -> Result<(), SchemaError> {
    let invalid = |reason: &str| {
        Err(SchemaError::InvalidSpec {
            message: message.name.clone(),
            field: field.name.clone(),
            reason: reason.to_string(),
        })
    };

    if field.has_flag && field.multiplicity != Multiplicity::Optional {
        return invalid("only optional fields carry a presence flag");
    }
    if field.oneof.is_some() != (field.multiplicity == Multiplicity::Oneof) {
        return invalid("oneof members need a group name and only oneof members may have one");
    }
    if field.fixed_count && field.multiplicity != Multiplicity::Repeated {
        return invalid("only repeated fields may have a fixed count");
    }
    if field.multiplicity == Multiplicity::Repeated && field.array_size == 0 {
        return invalid("repeated fields need an array size of at least 1");
    }
    if field.multiplicity == Multiplicity::Repeated && field.kind.is_scalar() && field.data_size == 0 {
        return invalid("repeated elements need a nonzero data size");
    }
    if field.submessage.is_some() && !field.kind.is_submessage() {
        return invalid("only submessage fields may reference a message type");
    }
    Ok(())
}
