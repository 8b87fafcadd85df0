//! Field traversal and rendering of record instances.
//!
//! Output is an indented bullet tree: four spaces per nesting level,
//! `- name: value` per present field, nested records on the lines after
//! their field name, arrays as `[a,b,]`, and one trailing newline per
//! record.

mod composite;
mod cursor;
mod presence;
mod scalar;

use std::io::Write;

use cursor::FieldCursor;
use presence::Presence;
use scalar::ScalarLayout;

use crate::config::PrintConfig;
use crate::error::PrintError;
use crate::memory::{Address, Memory};
use crate::schema::{Descriptor, FieldDef, MessageDescriptor, Multiplicity, Schema, Storage, ValueKind};

const INDENT: &str = "    ";

/// Record instance: a base address within borrowed memory.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'m> {
    pub memory: &'m Memory,
    pub base: Address,
}

impl<'m> Instance<'m> {
    pub fn new(memory: &'m Memory, base: Address) -> Self {
        Self { memory, base }
    }
}

/// Prints a record to standard output.
///
/// Returns `true` if every field was evaluated and, where present, fully
/// printed. On `false` the output written so far is left in place.
pub fn pretty_print(descriptor: Descriptor<'_>, instance: &Instance<'_>) -> bool {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match print_to(&mut out, descriptor, instance, &PrintConfig::default()) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Printing '{}' stopped: {}", descriptor.name(), e);
            false
        }
    }
}

/// Prints a record to `out`.
pub fn print_to<W: Write>(
    out: &mut W,
    descriptor: Descriptor<'_>,
    instance: &Instance<'_>,
    config: &PrintConfig,
) -> Result<(), PrintError> {
    tracing::debug!(
        "Printing '{}' at block {} offset {}",
        descriptor.name(),
        instance.base.block,
        instance.base.offset
    );
    let mut printer = Printer {
        out: &mut *out,
        schema: descriptor.schema(),
        memory: instance.memory,
        config,
        path: Vec::new(),
    };
    let result = printer.print_message(descriptor.message(), instance.base, 0);
    out.flush()?;
    result
}

/// Prints a record into a string. The text is returned even when printing
/// stops early.
pub fn render_to_string(
    descriptor: Descriptor<'_>,
    instance: &Instance<'_>,
    config: &PrintConfig,
) -> (String, Result<(), PrintError>) {
    let mut buf = Vec::new();
    let result = print_to(&mut buf, descriptor, instance, config);
    (String::from_utf8_lossy(&buf).into_owned(), result)
}

pub(crate) struct Printer<'a, W: Write> {
    out: &'a mut W,
    schema: &'a Schema,
    memory: &'a Memory,
    config: &'a PrintConfig,
    /// Names of the fields being printed, outermost first
    path: Vec<&'a str>,
}

impl<'a, W: Write> Printer<'a, W> {
    fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Prints every present field of one record.
    fn print_message(
        &mut self,
        message: &'a MessageDescriptor,
        base: Address,
        depth: usize,
    ) -> Result<(), PrintError> {
        if depth > self.config.max_depth {
            return Err(PrintError::DepthExceeded {
                path: self.path_string(),
                limit: self.config.max_depth,
            });
        }

        let Some(mut cursor) = FieldCursor::begin(message, base) else {
            writeln!(self.out)?;
            return Ok(());
        };

        loop {
            self.path.push(cursor.name);
            self.print_entry(&cursor, depth)
                .map_err(|e| e.locate(|| self.path_string()))?;
            self.path.pop();

            if !cursor.next() {
                break;
            }
        }

        writeln!(self.out)?;
        Ok(())
    }

    /// Evaluates one field and prints its line if present.
    fn print_entry(&mut self, cursor: &FieldCursor<'a>, depth: usize) -> Result<(), PrintError> {
        if cursor.field.kind == ValueKind::Extension {
            return Err(PrintError::ExtensionField {
                path: String::new(),
            });
        }

        let data = match presence::evaluate(self.memory, self.schema.size_width(), cursor)? {
            Presence::Present(data) => data,
            Presence::Absent => {
                tracing::trace!("Field '{}' absent", cursor.name);
                return Ok(());
            }
        };

        for _ in 0..depth {
            write!(self.out, "{}", INDENT)?;
        }
        write!(self.out, "- {}: ", cursor.name)?;
        self.print_field(cursor, data, depth)?;
        writeln!(self.out)?;
        Ok(())
    }

    /// Chooses the renderer for a present field.
    fn print_field(
        &mut self,
        cursor: &FieldCursor<'a>,
        data: Address,
        depth: usize,
    ) -> Result<(), PrintError> {
        let field = cursor.field;
        if field.storage == Storage::Callback {
            return Err(PrintError::CallbackStorage {
                path: String::new(),
            });
        }
        if field.multiplicity == Multiplicity::Repeated {
            return self.print_array(cursor, data, depth);
        }
        self.print_value(field, data, field.storage == Storage::Static, depth)
    }

    /// Prints one value: a field, an array element or a oneof member.
    fn print_value(
        &mut self,
        field: &'a FieldDef,
        data: Address,
        inline: bool,
        depth: usize,
    ) -> Result<(), PrintError> {
        if field.kind == ValueKind::Submessage {
            return self.print_nested(field, data, depth);
        }
        let layout =
            ScalarLayout::classify(field.kind, field.data_size, inline, self.schema.size_width())?;
        let value = scalar::decode(self.memory, layout, data)?;
        value.write_to(&mut *self.out)?;
        Ok(())
    }
}
