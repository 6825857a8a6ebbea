//! JSON I/O handling for CLI
//!
//! Command results are written to stdout as one JSON object per line.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON array of walks from a file
pub fn read_walks_file(path: &Path) -> CliResult<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
    })?;

    match serde_json::from_str(&content)? {
        Value::Array(items) => Ok(items),
        _ => Err(CliError::io_error(format!(
            "{} must contain a JSON array of walks",
            path.display()
        ))),
    }
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
