//! JSON line I/O for the CLI
//!
//! - Input: one JSON object per line
//! - Output: one JSON object per line, flushed immediately
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a single request line from stdin
pub fn read_request_line() -> CliResult<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(line)
}

/// Non-blank request lines from `reader`
pub fn request_lines<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<String>> {
    reader
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
}

/// Write a success envelope to `out`
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write an error envelope to `out`
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
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

/// Write a pre-rendered JSON line to `out`
pub fn write_json<W: Write>(out: &mut W, json_str: &str) -> CliResult<()> {
    writeln!(out, "{}", json_str)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_blank_lines_skipped() {
        let input = Cursor::new("{\"op\":\"stats\"}\n\n   \n{\"op\":\"all_keys\"}\n");
        let lines: Vec<String> = request_lines(input).map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("all_keys"));
    }

    #[test]
    fn test_write_error_envelope() {
        let mut out = Vec::new();
        write_error(&mut out, "KEYLEDGER_CLI_IO_ERROR", "boom").unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "KEYLEDGER_CLI_IO_ERROR");
        assert!(out.ends_with(b"\n"));
    }
}
