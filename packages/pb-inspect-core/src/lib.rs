//! Schema-driven pretty printer for decoded records.
//!
//! Provides the block memory model holding record instances, message
//! descriptors with computed layouts, memory image files, and the field
//! traversal that renders a record as an indented text tree.

pub mod config;
pub mod error;
pub mod image;
pub mod memory;
pub mod print;
pub mod schema;

pub use print::{pretty_print, print_to, render_to_string, Instance};
