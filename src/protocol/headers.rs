//! HTTP header handling.
//!
//! Headers are an ordered multimap from field-name to field-value. Lookup is
//! ASCII-case-insensitive while the original casing and insertion order are
//! preserved for serialization. Each entry also records the 1-based line
//! number it was parsed from, so that faults detected after header parsing
//! (for example a duplicated Host header) can point back into the source
//! bytes.
//!
//! [`HttpHeaders`] is immutable; it is produced by a [`HeadersBuilder`],
//! which is the only mutable stage of a header block's lifecycle.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

/// Error returned by [`HeadersBuilder`] when a field-name contains characters
/// outside the token charset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid header name: {name:?}")]
pub struct InvalidHeaderName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    value: String,
    line: usize,
}

/// An immutable, ordered, case-insensitive multimap of HTTP header fields.
#[derive(Debug, Clone, Default)]
pub struct HttpHeaders {
    entries: Vec<HeaderEntry>,
    // uppercased field-name to positions in `entries`
    index: HashMap<String, Vec<usize>>,
}

impl HttpHeaders {
    /// Creates a builder for a new header block.
    pub fn builder() -> HeadersBuilder {
        HeadersBuilder::default()
    }

    /// Returns a header block with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All values for the given field-name, in insertion order.
    pub fn get(&self, name: &str) -> Vec<&str> {
        match self.index.get(&name.to_ascii_uppercase()) {
            Some(positions) => positions.iter().map(|&i| self.entries[i].value.as_str()).collect(),
            None => Vec::new(),
        }
    }

    /// The first value for the given field-name, if any.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        let positions = self.index.get(&name.to_ascii_uppercase())?;
        positions.first().map(|&i| self.entries[i].value.as_str())
    }

    /// Whether at least one entry with the given field-name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_uppercase())
    }

    /// The source line numbers of all entries with the given field-name.
    pub fn line_numbers(&self, name: &str) -> Vec<usize> {
        match self.index.get(&name.to_ascii_uppercase()) {
            Some(positions) => positions.iter().map(|&i| self.entries[i].line).collect(),
            None => Vec::new(),
        }
    }

    /// Iterates over `(name, value)` pairs in insertion order, with the
    /// original field-name casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.name.as_str(), e.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes each entry as `Name: Value` followed by CRLF, in insertion
    /// order. The blank line ending the header block is not written.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            write!(sink, "{}: {}\r\n", entry.name, entry.value)?;
        }
        Ok(())
    }
}

/// Equality compares names (case-sensitively) and values in order. Line
/// numbers are diagnostic metadata and do not participate.
impl PartialEq for HttpHeaders {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl Eq for HttpHeaders {}

impl fmt::Display for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}: {}\r\n", entry.name, entry.value)?;
        }
        Ok(())
    }
}

/// Builds an [`HttpHeaders`] block. Not thread-safe; intended for a single
/// owner.
#[derive(Debug, Clone, Default)]
pub struct HeadersBuilder {
    entries: Vec<HeaderEntry>,
}

impl HeadersBuilder {
    /// Appends an entry. The field-name must be a valid token.
    pub fn with(&mut self, name: &str, value: &str) -> Result<&mut Self, InvalidHeaderName> {
        self.with_line(name, value, 0)?;
        Ok(self)
    }

    /// Appends an entry recording the source line it was parsed from.
    pub(crate) fn with_line(
        &mut self,
        name: &str,
        value: &str,
        line: usize,
    ) -> Result<(), InvalidHeaderName> {
        validate_name(name)?;
        self.entries.push(HeaderEntry { name: name.to_string(), value: value.to_string(), line });
        Ok(())
    }

    /// Replaces all entries with the given field-name by a single entry,
    /// placed at the position of the first replaced entry. Appends when no
    /// entry matches.
    pub fn overwrite(&mut self, name: &str, value: &str) -> Result<&mut Self, InvalidHeaderName> {
        validate_name(name)?;
        let upper = name.to_ascii_uppercase();
        let first = self.entries.iter().position(|e| e.name.to_ascii_uppercase() == upper);
        self.entries.retain(|e| e.name.to_ascii_uppercase() != upper);
        let entry = HeaderEntry { name: name.to_string(), value: value.to_string(), line: 0 };
        match first {
            Some(position) => self.entries.insert(position, entry),
            None => self.entries.push(entry),
        }
        Ok(self)
    }

    /// The first value for the given field-name, if any.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        let upper = name.to_ascii_uppercase();
        self.entries.iter().find(|e| e.name.to_ascii_uppercase() == upper).map(|e| e.value.as_str())
    }

    /// The source line numbers of all entries with the given field-name.
    pub fn line_numbers(&self, name: &str) -> Vec<usize> {
        let upper = name.to_ascii_uppercase();
        self.entries.iter().filter(|e| e.name.to_ascii_uppercase() == upper).map(|e| e.line).collect()
    }

    /// Parses header lines in the `Name: Value` shape, recording line
    /// numbers starting at `first_line_number`. The value separator is a
    /// colon optionally followed by a single whitespace character; any
    /// further leading whitespace belongs to the value.
    pub(crate) fn parse_lines<E>(
        lines: &[String],
        first_line_number: usize,
        make_error: impl Fn(String, usize) -> E,
    ) -> Result<HeadersBuilder, E> {
        let mut builder = HeadersBuilder::default();
        let mut line_number = first_line_number;
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            let Some(colon) = line.find(':') else {
                return Err(make_error("Invalid header".to_string(), line_number));
            };
            let name = &line[..colon];
            let value = &line[colon + 1..];
            let value = value.strip_prefix([' ', '\t']).unwrap_or(value);
            builder
                .with_line(name, value, line_number)
                .map_err(|e| make_error(e.to_string(), line_number))?;
            line_number += 1;
        }
        Ok(builder)
    }

    /// Freezes the builder into an immutable header block.
    pub fn build(self) -> HttpHeaders {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, entry) in self.entries.iter().enumerate() {
            index.entry(entry.name.to_ascii_uppercase()).or_default().push(position);
        }
        HttpHeaders { entries: self.entries, index }
    }
}

fn validate_name(name: &str) -> Result<(), InvalidHeaderName> {
    if name.is_empty() || index_of_not_allowed_in_tokens(name).is_some() {
        return Err(InvalidHeaderName { name: name.to_string() });
    }
    Ok(())
}

/// The position of the first character outside the RFC 7230 token charset,
/// if any.
pub(crate) fn index_of_not_allowed_in_tokens(str: &str) -> Option<usize> {
    str.bytes().position(|b| !is_token_char(b))
}

fn is_token_char(b: u8) -> bool {
    matches!(b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.'
        | b'^' | b'_' | b'`' | b'|' | b'~')
        || b.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pairs: &[(&str, &str)]) -> HttpHeaders {
        let mut builder = HttpHeaders::builder();
        for (name, value) in pairs {
            builder.with(name, value).unwrap();
        }
        builder.build()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let headers = build(&[("Content-Type", "text/plain"), ("Accept", "*/*")]);
        assert_eq!(headers.get_first("content-type"), Some("text/plain"));
        assert_eq!(headers.get_first("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(headers.get("ACCEPT"), vec!["*/*"]);
        assert!(headers.contains("accept"));
        assert!(!headers.contains("Host"));
    }

    #[test]
    fn multi_valued_names_keep_order() {
        let headers = build(&[("Accept", "text/html"), ("Host", "x"), ("Accept", "text/plain")]);
        assert_eq!(headers.get("Accept"), vec!["text/html", "text/plain"]);
        assert_eq!(headers.get_first("Accept"), Some("text/html"));
    }

    #[test]
    fn serialization_preserves_casing_and_order() {
        let headers = build(&[("X-b", "1"), ("x-A", "2"), ("X-b", "3")]);
        let mut out = Vec::new();
        headers.write_to(&mut out).unwrap();
        assert_eq!(out, b"X-b: 1\r\nx-A: 2\r\nX-b: 3\r\n");
    }

    #[test]
    fn overwrite_collapses_entries_in_place() {
        let mut builder = HttpHeaders::builder();
        builder.with("Host", "a").unwrap();
        builder.with("Accept", "*/*").unwrap();
        builder.with("Host", "b").unwrap();
        builder.overwrite("Host", "c").unwrap();
        let headers = builder.build();
        assert_eq!(headers.get("Host"), vec!["c"]);
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("Host", "c"), ("Accept", "*/*")]);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut builder = HttpHeaders::builder();
        assert!(builder.with("", "x").is_err());
        assert!(builder.with("Bad Name", "x").is_err());
        assert!(builder.with("Bad:Name", "x").is_err());
        assert!(builder.with("Good-Name", "x").is_ok());
    }

    #[test]
    fn parse_lines_splits_on_first_colon() {
        let lines = vec!["Host: example.com".to_string(), "X-Time: 12:30:00".to_string()];
        let headers = HeadersBuilder::parse_lines(&lines, 2, |m, l| format!("{m}@{l}"))
            .unwrap()
            .build();
        assert_eq!(headers.get_first("Host"), Some("example.com"));
        assert_eq!(headers.get_first("X-Time"), Some("12:30:00"));
        assert_eq!(headers.line_numbers("X-Time"), vec![3]);
    }

    #[test]
    fn parse_lines_consumes_at_most_one_space_after_colon() {
        let lines = vec!["X-Padded:   wide".to_string()];
        let headers = HeadersBuilder::parse_lines(&lines, 2, |m, l| format!("{m}@{l}"))
            .unwrap()
            .build();
        assert_eq!(headers.get_first("X-Padded"), Some("  wide"));
    }

    #[test]
    fn parse_lines_rejects_missing_colon() {
        let lines = vec!["Host: ok".to_string(), "not a header".to_string()];
        let err = HeadersBuilder::parse_lines(&lines, 2, |m, l| format!("{m}@{l}")).unwrap_err();
        assert_eq!(err, "Invalid header@3");
    }

    #[test]
    fn equality_ignores_line_numbers() {
        let lines = vec!["Host: example.com".to_string()];
        let parsed = HeadersBuilder::parse_lines(&lines, 2, |m, l| format!("{m}@{l}"))
            .unwrap()
            .build();
        let built = build(&[("Host", "example.com")]);
        assert_eq!(parsed, built);
        assert_ne!(parsed.line_numbers("Host"), built.line_numbers("Host"));
    }
}
