//! HTTP response model: the status-line and the response message.

use std::fmt;
use std::io::{self, Write};

use crate::protocol::body::{EagerBody, LazyBodyReader};
use crate::protocol::{HttpHeaders, HttpVersion, ParseError};

/// The status-line of an HTTP response: version, status code and reason
/// phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    version: HttpVersion,
    code: u16,
    reason: String,
}

impl StatusLine {
    /// Parses a status-line.
    ///
    /// The line is split on whitespace into at most three tokens. When the
    /// first token starts with `HTTP` it is the version, followed by the
    /// status code and an optional reason phrase. Otherwise the first token
    /// is the status code, any remaining tokens form the reason phrase, and
    /// the version defaults to HTTP/1.1 when
    /// `insert_http_version_if_missing` is set.
    pub fn parse(line: &str, insert_http_version_if_missing: bool) -> Result<Self, ParseError> {
        if line.trim().is_empty() {
            return Err(ParseError::invalid_response("Empty status line", 1));
        }
        let parts: Vec<&str> = line.splitn(3, char::is_whitespace).collect();

        let mut version_token = None;
        let code_token;
        let mut reason = String::new();

        if parts.len() == 1 {
            code_token = parts[0];
        } else if parts[0].starts_with("HTTP") {
            version_token = Some(parts[0]);
            code_token = parts[1];
            if parts.len() == 3 {
                reason = parts[2].to_string();
            }
        } else {
            code_token = parts[0];
            reason = parts[1].to_string();
            if parts.len() == 3 {
                reason.push(' ');
                reason.push_str(parts[2]);
            }
        }

        let version = match version_token {
            Some(token) => HttpVersion::try_from(token)
                .map_err(|_| ParseError::invalid_response("Invalid HTTP version", 1))?,
            None if insert_http_version_if_missing => HttpVersion::Http1_1,
            None => return Err(ParseError::invalid_response("Missing HTTP version", 1)),
        };

        let is_three_digits = code_token.len() == 3 && code_token.bytes().all(|b| b.is_ascii_digit());
        let code = if is_three_digits { code_token.parse::<u16>().ok() } else { None };
        let Some(code) = code else {
            return Err(ParseError::invalid_response("Invalid status code", 1));
        };

        Ok(StatusLine { version, code, reason })
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// The reason phrase, possibly empty.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Renders `version SP code SP reason`, dropping the trailing space when the
/// reason phrase is empty.
impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{} {}", self.version, self.code)
        } else {
            write!(f, "{} {} {}", self.version, self.code, self.reason)
        }
    }
}

/// A parsed HTTP response.
///
/// The body, when present, is a [`LazyBodyReader`] owning the remaining bytes
/// of the source stream; [`HttpResponse::eagerly`] drains it into memory.
#[derive(Debug)]
pub struct HttpResponse<B = LazyBodyReader> {
    status_line: StatusLine,
    headers: HttpHeaders,
    body: Option<B>,
}

/// A response whose body is fully buffered in memory.
pub type EagerHttpResponse = HttpResponse<EagerBody>;

impl<B> HttpResponse<B> {
    pub(crate) fn new(status_line: StatusLine, headers: HttpHeaders, body: Option<B>) -> Self {
        Self { status_line, headers, body }
    }

    pub fn status_line(&self) -> &StatusLine {
        &self.status_line
    }

    pub fn status_code(&self) -> u16 {
        self.status_line.code()
    }

    pub fn version(&self) -> HttpVersion {
        self.status_line.version()
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    fn write_head<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        write!(sink, "{}\r\n", self.status_line)?;
        self.headers.write_to(sink)?;
        sink.write_all(b"\r\n")
    }
}

impl HttpResponse<LazyBodyReader> {
    /// Takes the body reader out of the response.
    pub fn into_body(self) -> Option<LazyBodyReader> {
        self.body
    }

    /// Buffers the whole message in memory, closing the source stream.
    pub fn eagerly(self) -> io::Result<EagerHttpResponse> {
        let body = match self.body {
            Some(reader) => Some(reader.eagerly()?),
            None => None,
        };
        Ok(HttpResponse { status_line: self.status_line, headers: self.headers, body })
    }

    /// Serializes the message, streaming the body through. Consumes the
    /// response since the body reader is single-use.
    pub fn write_to<W: Write>(self, sink: &mut W) -> io::Result<()> {
        self.write_head(sink)?;
        match self.body {
            Some(reader) => reader.write_to(sink),
            None => Ok(()),
        }
    }
}

impl HttpResponse<EagerBody> {
    /// Serializes the message. The buffered body can be written any number
    /// of times.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        self.write_head(sink)?;
        match &self.body {
            Some(body) => body.write_to(sink),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_status_line() {
        let line = StatusLine::parse("HTTP/1.1 200 OK", false).unwrap();
        assert_eq!(line.version(), HttpVersion::Http1_1);
        assert_eq!(line.code(), 200);
        assert_eq!(line.reason(), "OK");
    }

    #[test]
    fn reason_phrase_keeps_inner_spaces() {
        let line = StatusLine::parse("HTTP/1.0 404 Not Found", false).unwrap();
        assert_eq!(line.version(), HttpVersion::Http1_0);
        assert_eq!(line.reason(), "Not Found");
    }

    #[test]
    fn version_and_code_without_reason() {
        let line = StatusLine::parse("HTTP/1.1 204", false).unwrap();
        assert_eq!(line.code(), 204);
        assert_eq!(line.reason(), "");
        assert_eq!(line.to_string(), "HTTP/1.1 204");
    }

    #[test]
    fn bare_code_defaults_version_when_lenient() {
        let line = StatusLine::parse("200", true).unwrap();
        assert_eq!(line.version(), HttpVersion::Http1_1);
        assert_eq!(line.code(), 200);

        let err = StatusLine::parse("200", false).unwrap_err();
        assert_eq!(err.to_string(), "invalid http response: Missing HTTP version (line 1)");
    }

    #[test]
    fn code_first_status_line_collects_reason() {
        let line = StatusLine::parse("404 Not Found", true).unwrap();
        assert_eq!(line.code(), 404);
        assert_eq!(line.reason(), "Not Found");
    }

    #[test]
    fn invalid_status_codes_are_rejected() {
        for line in ["HTTP/1.1 abc OK", "HTTP/1.1 20 OK", "HTTP/1.1 2000 OK", "HTTP/1.1 0x1 OK"] {
            let err = StatusLine::parse(line, true).unwrap_err();
            assert_eq!(
                err.to_string(),
                "invalid http response: Invalid status code (line 1)",
                "for {line:?}"
            );
        }
    }

    #[test]
    fn whitespace_only_line_is_rejected() {
        assert!(StatusLine::parse("   ", true).is_err());
    }

    #[test]
    fn display_round_trips() {
        for text in ["HTTP/1.1 200 OK", "HTTP/1.0 404 Not Found", "HTTP/1.1 204"] {
            let line = StatusLine::parse(text, false).unwrap();
            assert_eq!(line.to_string(), text);
        }
    }
}
