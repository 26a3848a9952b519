//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// turntalk - two-party chat over a polled shared store
#[derive(Parser, Debug)]
#[command(name = "tt", author, version, about = "Two-party turn-based chat over a shared key-value store")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Store directory (overrides config)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Join the chat session (CTRL+C to leave cleanly)
    Chat {
        /// Display name; prompted for when omitted
        #[arg(short, long)]
        name: Option<String>,

        /// Poll interval in milliseconds (overrides config)
        #[arg(long)]
        poll_ms: Option<u64>,
    },

    /// Show the shared session state and any broken invariants
    Status,
}
