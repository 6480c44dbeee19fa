//! JSON output for CLI commands: one JSON object per line on stdout.

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

/// Write a JSON value as one line
pub fn write_json_to(out: &mut impl Write, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_json_to(&mut io::stdout(), &json!({ "status": "ok", "data": data }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_object_per_line() {
        let mut out = Vec::new();
        write_json_to(&mut out, &json!({"a": 1})).unwrap();
        write_json_to(&mut out, &json!({"b": 2})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1}\n{\"b\":2}\n");
    }
}
