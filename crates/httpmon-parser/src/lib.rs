//! Parser for the fixed access-log grammar.
//!
//! One line of input maps to one [`LogRecord`] or one [`ParseError`].
//! A malformed line is an expected, recoverable condition: it is reported
//! as a value so the caller can decide whether to count or discard it, and
//! never aborts ingestion.
//!
//! Grammar: `HOST IDENT AUTHUSER [DATE] "METHOD URL PROTOCOL" STATUS BYTES`

use httpmon_common::types::LogRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(\S+) (\S+) (\S+) \[(\d{1,2}/[A-Za-z]+/\d+:\d{2}:\d{2}:\d{2} [+-] ?\d{4})\] "(.+)" (\d+) (\d+)$"#,
    )
    .expect("access log pattern is valid")
});

/// Errors produced while parsing a single log line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line does not match the access log grammar.
    #[error("Parse: line does not match the access log grammar")]
    MalformedLine,

    /// The quoted request segment did not split into exactly
    /// `METHOD URL PROTOCOL`. This fails the whole line.
    #[error("Parse: request segment has {fields} fields, expected 3")]
    MalformedRequest { fields: usize },
}

/// Convenience `Result` alias for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parses one raw log line into a [`LogRecord`].
///
/// A trailing newline is tolerated; everything else must match the grammar
/// exactly. The quoted request segment is split on single spaces and must
/// yield exactly three fields.
///
/// # Errors
///
/// Returns [`ParseError::MalformedLine`] when the line does not match the
/// grammar, and [`ParseError::MalformedRequest`] when the quoted segment
/// has the wrong field count.
pub fn parse_line(line: &str) -> Result<LogRecord> {
    let caps = LINE_PATTERN
        .captures(line.trim_end_matches(['\r', '\n']))
        .ok_or(ParseError::MalformedLine)?;

    let request: Vec<&str> = caps[5].split(' ').collect();
    if request.len() != 3 {
        return Err(ParseError::MalformedRequest {
            fields: request.len(),
        });
    }

    Ok(LogRecord {
        host: caps[1].to_string(),
        client_id: caps[2].to_string(),
        auth_user: caps[3].to_string(),
        date: caps[4].to_string(),
        request_method: request[0].to_string(),
        request_url: request[1].to_string(),
        request_protocol: request[2].to_string(),
        status: caps[6].to_string(),
        bytes: caps[7].to_string(),
    })
}
