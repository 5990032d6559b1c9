//! CLI module for docindex
//!
//! Provides command-line interface for:
//! - search: Substring search over index keys
//! - show: Exact key lookup
//! - keys: Key listing
//! - stats: Index and load counters
//! - serve: Line-oriented JSON requests on stdin

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, IndexSource};
pub use commands::{entry_json, run, run_command, serve, Request, Session};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_error_to, write_response, write_response_to};
