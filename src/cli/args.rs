//! CLI argument definitions using clap
//!
//! Commands:
//! - docindex search <QUERY> [--symbol] [--section S] [--limit N]
//! - docindex show <KEY>
//! - docindex keys [--section S]
//! - docindex stats
//! - docindex serve
//!
//! Every command takes `--index <PATH>` (fragment file or search directory);
//! without it the configured path or the bundled fragment is used.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// docindex - query generated documentation search indexes
#[derive(Parser, Debug)]
#[command(name = "docindex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimum log severity written to stderr (trace, info, warn, error, fatal)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to load the index from
#[derive(Args, Debug, Clone, Default)]
pub struct IndexSource {
    /// Fragment file or search directory
    #[arg(long)]
    pub index: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find entries whose key contains QUERY
    Search {
        /// Substring to look for
        query: String,

        /// Escape QUERY the way the generator escapes keys before matching
        #[arg(long)]
        symbol: bool,

        /// Only search one section (all, classes, functions, ...)
        #[arg(long)]
        section: Option<String>,

        /// Maximum number of entries returned
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        source: IndexSource,
    },

    /// Show the entry stored under KEY
    Show {
        /// Exact key
        key: String,

        #[command(flatten)]
        source: IndexSource,
    },

    /// List all keys in table order
    Keys {
        /// Only list keys of one section
        #[arg(long)]
        section: Option<String>,

        #[command(flatten)]
        source: IndexSource,
    },

    /// Print index and load statistics
    Stats {
        #[command(flatten)]
        source: IndexSource,
    },

    /// Answer JSON requests read line by line from stdin
    Serve {
        #[command(flatten)]
        source: IndexSource,
    },
}

impl Command {
    /// The index source of any command
    pub fn source(&self) -> &IndexSource {
        match self {
            Command::Search { source, .. }
            | Command::Show { source, .. }
            | Command::Keys { source, .. }
            | Command::Stats { source }
            | Command::Serve { source } => source,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
