//! CLI argument parsing for sharedstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ss")]
#[command(author, version, about = "Inspect and edit the shared turntalk store", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides config)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value of a key (empty line when absent)
    Get {
        #[arg(required = true)]
        key: String,
    },

    /// Write a key
    Set {
        #[arg(required = true)]
        key: String,

        /// Value to store (may be empty)
        #[arg(required = true, allow_hyphen_values = true)]
        value: String,
    },

    /// Remove every key
    Clear,

    /// Print every key and value
    Dump,
}
