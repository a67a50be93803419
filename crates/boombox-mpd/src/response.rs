//! Line-level parsing for the MPD text protocol.

use crate::error::{MpdError, Result};

/// Splits a `key: value` response line. Returns `None` for lines that
/// don't follow the pair format (e.g. `OK`, `ACK ...`).
pub fn parse_pair(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(": ")?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parses an `ACK [code@index] {command} message` error line.
pub fn parse_ack(line: &str) -> Result<MpdError> {
    let rest = line
        .strip_prefix("ACK [")
        .ok_or_else(|| MpdError::Malformed(line.to_string()))?;
    let (codes, rest) = rest
        .split_once("] {")
        .ok_or_else(|| MpdError::Malformed(line.to_string()))?;
    let (command, message) = rest
        .split_once("} ")
        .ok_or_else(|| MpdError::Malformed(line.to_string()))?;
    let code = codes
        .split('@')
        .next()
        .and_then(|c| c.parse().ok())
        .ok_or_else(|| MpdError::Malformed(line.to_string()))?;
    Ok(MpdError::Server {
        code,
        command: command.to_string(),
        message: message.to_string(),
    })
}

/// Quotes a command argument, escaping backslashes and double quotes.
pub fn quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_splits_on_first_colon_space() {
        assert_eq!(
            parse_pair("Title: Some: Song"),
            Some(("Title", "Some: Song"))
        );
        assert_eq!(parse_pair("OK"), None);
        assert_eq!(parse_pair(": empty key"), None);
    }

    #[test]
    fn ack_line_parses_into_server_error() {
        let err = parse_ack("ACK [50@0] {lsinfo} No such directory").unwrap();
        match err {
            MpdError::Server {
                code,
                command,
                message,
            } => {
                assert_eq!(code, 50);
                assert_eq!(command, "lsinfo");
                assert_eq!(message, "No such directory");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ack_garbage_is_malformed() {
        assert!(matches!(
            parse_ack("ACK nonsense"),
            Err(MpdError::Malformed(_))
        ));
    }

    #[test]
    fn quote_escapes_quotes_and_backslashes() {
        assert_eq!(quote(r#"pod/a "b".mp3"#), r#""pod/a \"b\".mp3""#);
        assert_eq!(quote("plain"), "\"plain\"");
    }
}
