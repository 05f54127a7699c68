use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use scalarql_graphql::{Response, ServerError};

/// Writes a response and returns the process exit code.
///
/// A clean response goes to `out`. A partial result (data plus field errors)
/// is written whole to `err`; a rejected request only lists its errors there.
pub fn write_response(
    response: &Response,
    pretty: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    if response.is_ok() {
        writeln!(out, "{}", to_json(response, pretty)?)?;
        return Ok(0);
    }

    if response.data.is_some() {
        writeln!(err, "{}", to_json(response, pretty)?)?;
    } else {
        for error in &response.errors {
            writeln!(err, "{}", error_line(&server_error_message(error)))?;
        }
    }
    Ok(1)
}

pub fn print_error(msg: &str) {
    eprintln!("{}", error_line(msg));
}

fn to_json(response: &Response, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    }
}

fn error_line(msg: &str) -> String {
    format!("{} {}", "✗".red(), msg)
}

fn server_error_message(error: &ServerError) -> String {
    let code = error.code().unwrap_or("ERROR");
    let mut line = format!("{} {}", format!("[{code}]").yellow(), error.message);
    if !error.path.is_empty() {
        let path = serde_json::to_string(&error.path).unwrap_or_default();
        line.push_str(&format!(" {}", format!("at {path}").dimmed()));
    }
    line
}
