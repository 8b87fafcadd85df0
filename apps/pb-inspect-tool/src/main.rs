//! Command-line inspector for record memory images.
//!
//! Provides commands for:
//! - Printing a record from a schema file and a memory image
//! - Showing computed record layouts, for crafting images by hand
//! - Validating schema files

mod cli;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use pb_inspect_core::config::PrintConfig;
use pb_inspect_core::image::MemoryImage;
use pb_inspect_core::schema::{MessageDescriptor, Schema};
use pb_inspect_core::{print_to, Instance};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr, the record to stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match cli.command {
        Commands::Print {
            schema,
            message,
            image,
            max_depth,
        } => print_record(&schema, &message, &image, PrintConfig { max_depth }),
        Commands::Layout { schema, message } => {
            show_layout(&schema, message.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { schema } => {
            let loaded = load_schema(&schema)?;
            println!(
                "{}: {} message(s), size width {}",
                schema.display(),
                loaded.messages().len(),
                loaded.size_width()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_schema(path: &Path) -> Result<Schema> {
    Schema::load(path).with_context(|| format!("Failed to load schema {}", path.display()))
}

fn print_record(schema_path: &Path, message: &str, image_path: &Path, config: PrintConfig) -> Result<ExitCode> {
    let schema = load_schema(schema_path)?;
    let descriptor = schema
        .descriptor(message)
        .with_context(|| format!("Message '{}' not found in {}", message, schema_path.display()))?;
    let (memory, root) = MemoryImage::load(image_path)
        .and_then(|image| image.to_memory())
        .with_context(|| format!("Failed to load image {}", image_path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match print_to(&mut out, descriptor, &Instance::new(&memory, root), &config) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("Printing '{}' failed: {}", message, e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show_layout(schema_path: &Path, only: Option<&str>) -> Result<()> {
    let schema = load_schema(schema_path)?;
    let messages: Vec<&MessageDescriptor> = match only {
        Some(name) => vec![schema
            .descriptor(name)
            .with_context(|| format!("Message '{}' not found in {}", name, schema_path.display()))?
            .message()],
        None => schema.messages().iter().collect(),
    };

    for message in messages {
        println!(
            "{} (size {}, align {})",
            message.name, message.record_size, message.align
        );
        for (field, name) in message.fields.iter().zip(&message.field_names) {
            let size_cell = field
                .size_cell
                .map(|cell| format!(" size_cell={}+{}", cell.offset, cell.width))
                .unwrap_or_default();
            println!(
                "    {}: tag {} {:?} {:?} {:?} offset={} cell={} data_size={} array_size={}{}",
                name,
                field.tag,
                field.kind,
                field.multiplicity,
                field.storage,
                field.data_offset,
                field.data_cell_size,
                field.data_size,
                field.array_size,
                size_cell
            );
        }
    }
    Ok(())
}
