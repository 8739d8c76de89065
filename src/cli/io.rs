//! JSON I/O handling for CLI
//!
//! - Request bodies come from `--body`, or stdin with `--body -`
//! - Output: one JSON object per line on stdout

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Resolve a `--body` argument into a JSON value
pub fn read_body(arg: Option<&str>) -> CliResult<Option<Value>> {
    let text = match arg {
        None => return Ok(None),
        Some("-") => {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            buf
        }
        Some(text) => text.to_string(),
    };

    if text.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| CliError::io_error(format!("--body is not valid JSON: {}", e)))
}

/// Write a JSON value to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_inline_body() {
        let body = read_body(Some(r#"{"title": "C"}"#)).unwrap();
        assert_eq!(body, Some(serde_json::json!({"title": "C"})));
    }

    #[test]
    fn test_read_absent_body() {
        assert_eq!(read_body(None).unwrap(), None);
        assert_eq!(read_body(Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_read_invalid_body() {
        assert!(read_body(Some("{nope")).is_err());
    }
}
