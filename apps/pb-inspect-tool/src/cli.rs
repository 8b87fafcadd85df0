use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pb_inspect_core::config::DEFAULT_MAX_DEPTH;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one record from a memory image
    Print {
        /// Schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Message type of the root record
        #[arg(short, long)]
        message: String,

        /// Memory image file (JSON)
        #[arg(short, long)]
        image: PathBuf,

        /// Maximum nesting depth before printing stops
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Show the computed record layout of each message
    Layout {
        /// Schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Only show this message type
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Load and validate a schema file
    Validate {
        /// Schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },
}
