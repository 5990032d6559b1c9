//! JSON I/O handling for CLI
//!
//! - Input: one JSON request object per line on stdin (`serve`)
//! - Output: one JSON object per response on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read JSON requests from `input`, one per line.
///
/// Blank lines are skipped. A line that is not UTF-8 or not JSON is a bad
/// request; only a failing reader yields an I/O error.
pub fn read_requests<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<Value>> {
    input
        .lines()
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => {
                    CliError::bad_request(format!("Invalid request encoding: {}", e))
                }
                _ => CliError::from(e),
            })?;
            serde_json::from_str(&line)
                .map_err(|e| CliError::bad_request(format!("Invalid request JSON: {}", e)))
        })
}

/// Write a success response
pub fn write_response_to<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write an error response
pub fn write_error_to<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout().lock(), data)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout().lock(), code, message)
}
