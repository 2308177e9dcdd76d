//! CSV parsing into header-keyed records.
//!
//! Converts raw text into [`Record`]s. No email-specific logic here.
//!
//! Normalization applied on the way in:
//! - a leading byte-order mark is stripped from the first header token
//! - lines that are empty (or whitespace only) are skipped
//! - every field is trimmed, including spaces around a quoted field
//! - rows longer than the header are cut, shorter rows keep fewer fields
//!
//! An unterminated quoted field fails the whole parse: record boundaries
//! after it cannot be recovered.

use std::borrow::Cow;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{CsvError, CsvResult};
use crate::models::Record;

const BOM: char = '\u{feff}';

/// Result of parsing: header names plus data records in file order.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Column headers, empty when the input has no non-blank line
    pub headers: Vec<String>,
    /// Parsed data records
    pub records: Vec<Record>,
}

/// Decode raw bytes as UTF-8, replacing invalid sequences.
pub fn decode_content(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Parse raw CSV bytes.
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<ParseResult> {
    parse_csv(&decode_content(bytes))
}

/// Parse CSV text with a header row.
///
/// # Example
/// ```
/// use csv_email_validator::parser::parse_csv;
///
/// let parsed = parse_csv("name,email\nAlice, alice@example.com \n").unwrap();
///
/// assert_eq!(parsed.headers, vec!["name", "email"]);
/// assert_eq!(parsed.records.len(), 1);
/// assert_eq!(parsed.records[0].get("email"), Some("alice@example.com"));
/// ```
pub fn parse_csv(content: &str) -> CsvResult<ParseResult> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let content = strip_quote_padding(content);
    check_quotes(&content)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        if is_blank_line(&content, &row) {
            continue;
        }

        match &headers {
            None => headers = Some(row.iter().map(str::to_string).collect()),
            Some(h) => records.push(Record::from_pairs(h, row.iter())),
        }
    }

    Ok(ParseResult {
        headers: headers.unwrap_or_default(),
        records,
    })
}

/// A row is blank when it is a single empty field that was not quoted.
///
/// The reader already drops empty lines; this catches whitespace-only ones,
/// which trimming turns into one empty field.
fn is_blank_line(content: &str, row: &StringRecord) -> bool {
    if row.len() != 1 || !row[0].is_empty() {
        return false;
    }
    let start = row.position().map(|p| p.byte() as usize).unwrap_or(0);
    content
        .get(start..)
        .and_then(|rest| rest.trim_start_matches(['\r', '\n']).lines().next())
        .map(|line| !line.trim_start().starts_with('"'))
        .unwrap_or(true)
}

/// Drop spaces and tabs that pad a quoted field.
///
/// The reader only recognizes a quote as the very first character of a
/// field and trims afterwards, so ` "a@b.co" ` would keep its quotes.
/// Whitespace before an opening quote or between a closing quote and the
/// next delimiter is removed; anything else is left as written.
fn strip_quote_padding(content: &str) -> Cow<'_, str> {
    if !content.contains('"') {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len());
    let mut pending = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut after_close = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    out.push('"');
                } else {
                    in_quotes = false;
                    after_close = true;
                }
            }
            continue;
        }

        if matches!(c, ' ' | '\t') && (at_field_start || after_close) {
            pending.push(c);
            continue;
        }

        let keep_pending = match c {
            '"' if at_field_start => {
                in_quotes = true;
                false
            }
            ',' | '\r' | '\n' => !after_close,
            _ => true,
        };
        if keep_pending {
            out.push_str(&pending);
        }
        pending.clear();

        out.push(c);
        after_close = false;
        at_field_start = matches!(c, ',' | '\r' | '\n');
    }

    if !after_close {
        out.push_str(&pending);
    }
    Cow::Owned(out)
}

/// Reject input that ends inside a quoted field.
///
/// Follows the reader's rules: a quote opens a quoted field only as the
/// first character of a field, and `""` inside a quoted field is an escaped
/// quote.
fn check_quotes(content: &str) -> CsvResult<()> {
    let mut line = 1;
    let mut open_line: Option<usize> = None;
    let mut at_field_start = true;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if open_line.is_some() {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => {
                    open_line = None;
                    at_field_start = false;
                }
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if at_field_start => open_line = Some(line),
            ',' | '\r' => at_field_start = true,
            '\n' => {
                line += 1;
                at_field_start = true;
            }
            _ => at_field_start = false,
        }
    }

    match open_line {
        Some(line) => Err(CsvError::UnterminatedQuote { line }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let parsed = parse_csv("name,email\nAlice,alice@example.com\nBob,bob@example.com").unwrap();

        assert_eq!(parsed.headers, vec!["name", "email"]);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].get("name"), Some("Alice"));
        assert_eq!(parsed.records[1].get("email"), Some("bob@example.com"));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,email\n\"Doe, Jane\",\"jane@example.com\"\n";
        let parsed = parse_csv(csv).unwrap();

        assert_eq!(parsed.records[0].get("name"), Some("Doe, Jane"));
        assert_eq!(parsed.records[0].get("email"), Some("jane@example.com"));
    }

    #[test]
    fn test_embedded_newline_and_escaped_quote() {
        let csv = "note,email\n\"line one\nsaid \"\"hi\"\"\",a@b.co\n";
        let parsed = parse_csv(csv).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get("note"), Some("line one\nsaid \"hi\""));
        assert_eq!(parsed.records[0].get("email"), Some("a@b.co"));
    }

    #[test]
    fn test_bom_stripped_from_header() {
        let parsed = parse_csv("\u{feff}email\nuser@example.com\n").unwrap();
        assert_eq!(parsed.headers, vec!["email"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let parsed = parse_csv("email\n\na@b.co\n\n\nc@d.co\n\n").unwrap();
        assert_eq!(parsed.records.len(), 2);
    }

    #[test]
    fn test_whitespace_only_line_skipped() {
        let parsed = parse_csv("email\na@b.co\n   \n").unwrap();
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn test_quoted_empty_field_is_a_record() {
        let parsed = parse_csv("email\n\"\"\n").unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get("email"), Some(""));
    }

    #[test]
    fn test_fields_trimmed() {
        let parsed = parse_csv("  name , email \n  Alice ,  a@b.co  \n").unwrap();

        assert_eq!(parsed.headers, vec!["name", "email"]);
        assert_eq!(parsed.records[0].get("email"), Some("a@b.co"));
    }

    #[test]
    fn test_missing_trailing_values() {
        let parsed = parse_csv("name,email\nAlice\n").unwrap();

        assert_eq!(parsed.records[0].get("name"), Some("Alice"));
        assert_eq!(parsed.records[0].get("email"), None);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let parsed = parse_csv("name,email\nAlice,a@b.co,extra,more\n").unwrap();

        assert_eq!(parsed.records[0].len(), 2);
        assert_eq!(parsed.records[0].get("email"), Some("a@b.co"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = parse_csv("email\r\na@b.co\r\n\r\n").unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get("email"), Some("a@b.co"));
    }

    #[test]
    fn test_unterminated_quote_is_fatal() {
        let err = parse_csv("email\n\"broken\n").unwrap_err();
        match err {
            CsvError::UnterminatedQuote { line } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spaces_around_quoted_field_are_dropped() {
        let parsed = parse_csv("name,email\n  \"Doe, Jane\" , \"a@b.co\"  \n").unwrap();

        assert_eq!(parsed.records[0].len(), 2);
        assert_eq!(parsed.records[0].get("name"), Some("Doe, Jane"));
        assert_eq!(parsed.records[0].get("email"), Some("a@b.co"));
    }

    #[test]
    fn test_padded_quoted_empty_field_is_a_record() {
        let parsed = parse_csv("email\n  \"\"  \n").unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get("email"), Some(""));
    }

    #[test]
    fn test_padded_multiline_quoted_field() {
        let parsed = parse_csv("note,email\n \"two\n lines\" ,a@b.co\n").unwrap();

        assert_eq!(parsed.records[0].get("note"), Some("two\n lines"));
        assert_eq!(parsed.records[0].get("email"), Some("a@b.co"));
    }

    #[test]
    fn test_padded_unterminated_quote_is_fatal() {
        let err = parse_csv("email\na@b.co\n   \"broken\n").unwrap_err();
        assert!(matches!(err, CsvError::UnterminatedQuote { line: 3 }));
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let parsed = parse_csv("name,email\nO\"Brien,a@b.co\n").unwrap();
        assert_eq!(parsed.records[0].get("name"), Some("O\"Brien"));
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        let parsed = parse_csv("").unwrap();
        assert!(parsed.headers.is_empty());
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let bytes: &[u8] = b"email\nbad\xffuser@example.com\n";
        let parsed = parse_bytes(bytes).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.records[0].get("email").unwrap().contains('\u{fffd}'));
    }
}
