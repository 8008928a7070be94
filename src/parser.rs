//! The HTTP message parser.
//!
//! [`RawHttp`] combines the metadata tokenizer, the start-line parsers, the
//! header parser and the body-reader factory into whole-message parsing for
//! requests and responses. An instance holds nothing but its options, so it
//! can be shared freely; every parse call works on a caller-supplied source.
//!
//! Parsing consumes the source up to the end of the header block and not one
//! byte further. When the framing rules say the message has a body, the
//! returned message owns the source through a
//! [`LazyBodyReader`](crate::protocol::LazyBodyReader); otherwise the source
//! is dropped with its remaining bytes untouched.

use std::fs::File;
use std::io::{Cursor, Read};
use std::net::IpAddr;
use std::num::ParseIntError;
use std::path::Path;

use tracing::trace;

use crate::codec::tokenizer::read_metadata_lines;
use crate::options::RawHttpOptions;
use crate::protocol::{
    BodyType, EagerHttpRequest, EagerHttpResponse, HeadersBuilder, HttpHeaders, HttpRequest,
    HttpResponse, LazyBodyReader, ParseError, RequestLine, StatusLine,
};

#[derive(Debug, Clone, Copy)]
enum MessageKind {
    Request,
    Response,
}

impl MessageKind {
    fn error(self, message: &str, line: usize) -> ParseError {
        match self {
            MessageKind::Request => ParseError::invalid_request(message, line),
            MessageKind::Response => ParseError::invalid_response(message, line),
        }
    }
}

/// Parser for HTTP/1.0 and HTTP/1.1 requests and responses.
///
/// The default instance is lenient (it fixes up new-lines and missing Host
/// headers, for example); construct one over [`RawHttpOptions::strict`] to
/// accept wire-exact messages only.
#[derive(Debug, Clone, Default)]
pub struct RawHttp {
    options: RawHttpOptions,
}

impl RawHttp {
    /// Creates a parser with the default, lenient options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given options.
    pub fn with_options(options: RawHttpOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RawHttpOptions {
        &self.options
    }

    /// Parses an HTTP request given in text form.
    pub fn parse_request(&self, request: &str) -> Result<HttpRequest, ParseError> {
        self.parse_request_bytes(request.as_bytes())
    }

    /// Parses an HTTP request given in raw bytes.
    pub fn parse_request_bytes(&self, request: &[u8]) -> Result<HttpRequest, ParseError> {
        self.parse_request_from_stream(Cursor::new(request.to_vec()), None)
    }

    /// Parses the HTTP request contained in a file, buffering its body.
    pub fn parse_request_from_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<EagerHttpRequest, ParseError> {
        let file = File::open(path)?;
        Ok(self.parse_request_from_stream(file, None)?.eagerly()?)
    }

    /// Parses the HTTP request produced by a stream.
    ///
    /// Ownership of the stream transfers to the parsed message's body reader
    /// when the message has a body; otherwise the stream is dropped without
    /// reading past the header block. `sender` is the address of the request
    /// sender, when known.
    pub fn parse_request_from_stream<R: Read + 'static>(
        &self,
        stream: R,
        sender: Option<IpAddr>,
    ) -> Result<HttpRequest, ParseError> {
        let mut stream = stream;
        let kind = MessageKind::Request;
        let lines = read_metadata_lines(
            &mut stream,
            |m, l| kind.error(m, l),
            self.options.allow_new_line_without_return,
            self.options.ignore_leading_empty_line,
        )?;
        if lines.is_empty() {
            return Err(kind.error("No content", 0));
        }

        let request_line =
            RequestLine::parse(&lines[0], self.options.insert_http_version_if_missing)?;
        let mut headers_builder =
            HeadersBuilder::parse_lines(&lines[1..], 2, |m, l| kind.error(&m, l))?;
        let request_line = self.verify_host(request_line, &mut headers_builder)?;
        let headers = headers_builder.build();

        let has_body = Self::request_has_body(&headers);
        let body = self.create_body_reader(stream, &headers, has_body, kind)?;
        trace!(
            method = request_line.method(),
            uri = %request_line.uri(),
            has_body,
            "parsed http request"
        );

        Ok(HttpRequest::new(request_line, headers, body, sender))
    }

    /// Parses an HTTP response given in text form.
    pub fn parse_response(&self, response: &str) -> Result<HttpResponse, ParseError> {
        self.parse_response_bytes(response.as_bytes())
    }

    /// Parses an HTTP response given in raw bytes.
    pub fn parse_response_bytes(&self, response: &[u8]) -> Result<HttpResponse, ParseError> {
        self.parse_response_from_stream(Cursor::new(response.to_vec()), None)
    }

    /// Parses the HTTP response contained in a file, buffering its body.
    pub fn parse_response_from_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<EagerHttpResponse, ParseError> {
        let file = File::open(path)?;
        Ok(self.parse_response_from_stream(file, None)?.eagerly()?)
    }

    /// Parses the HTTP response produced by a stream.
    ///
    /// `request_line` is the request-line of the request that caused this
    /// response, when known; it participates in the body-presence decision
    /// (HEAD and CONNECT responses carry no body).
    pub fn parse_response_from_stream<R: Read + 'static>(
        &self,
        stream: R,
        request_line: Option<&RequestLine>,
    ) -> Result<HttpResponse, ParseError> {
        let mut stream = stream;
        let kind = MessageKind::Response;
        let lines = read_metadata_lines(
            &mut stream,
            |m, l| kind.error(m, l),
            self.options.allow_new_line_without_return,
            self.options.ignore_leading_empty_line,
        )?;
        if lines.is_empty() {
            return Err(kind.error("No content", 0));
        }

        let status_line =
            StatusLine::parse(&lines[0], self.options.insert_http_version_if_missing)?;
        let headers =
            HeadersBuilder::parse_lines(&lines[1..], 2, |m, l| kind.error(&m, l))?.build();

        let has_body = Self::response_has_body(&status_line, request_line);
        let body = self.create_body_reader(stream, &headers, has_body, kind)?;
        trace!(status = status_line.code(), has_body, "parsed http response");

        Ok(HttpResponse::new(status_line, headers, body))
    }

    /// Whether a request with the given headers has a body.
    ///
    /// Request message framing is independent of method semantics: the
    /// presence of a body is signaled by a Content-Length or
    /// Transfer-Encoding header field alone.
    pub fn request_has_body(headers: &HttpHeaders) -> bool {
        headers.contains("Content-Length") || headers.contains("Transfer-Encoding")
    }

    /// Whether a response with the given status-line has a body, taking the
    /// originating request into account when known.
    pub fn response_has_body(
        status_line: &StatusLine,
        request_line: Option<&RequestLine>,
    ) -> bool {
        let code = status_line.code();
        if let Some(request_line) = request_line {
            if request_line.method().eq_ignore_ascii_case("HEAD") {
                return false;
            }
            // a successful CONNECT switches to tunnelling
            if request_line.method().eq_ignore_ascii_case("CONNECT") && in_group(2, code) {
                return false;
            }
        }

        let has_no_body = in_group(1, code) || code == 204 || code == 304;
        !has_no_body
    }

    /// The body framing mode for a message with the given headers.
    ///
    /// A Transfer-Encoding header takes precedence over Content-Length; its
    /// last value must be `chunked`, any other coding being unsupported.
    /// With neither header, `body_length` decides between Content-Length and
    /// close-terminated framing.
    pub fn body_type(
        headers: &HttpHeaders,
        body_length: Option<u64>,
    ) -> Result<BodyType, ParseError> {
        if let Some(encoding) = headers.get("Transfer-Encoding").last().copied() {
            if encoding.eq_ignore_ascii_case("chunked") {
                Ok(BodyType::Chunked)
            } else {
                Err(ParseError::unsupported_encoding(encoding))
            }
        } else if body_length.is_some() {
            Ok(BodyType::ContentLength)
        } else {
            Ok(BodyType::CloseTerminated)
        }
    }

    /// The value of the first Content-Length header, if any.
    pub fn parse_content_length(
        headers: &HttpHeaders,
    ) -> Option<Result<u64, ParseIntError>> {
        headers.get_first("Content-Length").map(|value| value.parse::<u64>())
    }

    /// Reconciles the request-line authority with the Host header(s).
    ///
    /// Exactly one source of the host must remain: a Host header given in
    /// the input fills in the request-line's authority, an authority given
    /// in the request-target synthesizes the Host header (when the options
    /// allow), and conflicting or duplicated hosts fail.
    fn verify_host(
        &self,
        request_line: RequestLine,
        headers: &mut HeadersBuilder,
    ) -> Result<RequestLine, ParseError> {
        let host_lines = headers.line_numbers("Host");
        match host_lines.len() {
            0 => {
                if !self.options.insert_host_header_if_missing {
                    Err(ParseError::invalid_request("Host header is missing", 1))
                } else if let Some(host) = request_line.uri().host() {
                    let host = host.to_string();
                    headers
                        .with("Host", &host)
                        .map_err(|e| ParseError::invalid_request(e.to_string(), 1))?;
                    Ok(request_line)
                } else {
                    Err(ParseError::invalid_request(
                        "Host not given either in method line or Host header",
                        1,
                    ))
                }
            }
            1 => {
                if request_line.uri().host().is_some() {
                    return Err(ParseError::invalid_request(
                        "Host specified both in Host header and in method line",
                        1,
                    ));
                }
                let host_value = headers.get_first("Host").unwrap_or_default().to_string();
                match request_line.with_host(&host_value) {
                    Ok(rebuilt) => {
                        let authority = rebuilt
                            .uri()
                            .authority()
                            .map(|a| a.as_str().to_string())
                            .unwrap_or(host_value);
                        headers.overwrite("Host", &authority).map_err(|e| {
                            ParseError::invalid_request(e.to_string(), host_lines[0])
                        })?;
                        Ok(rebuilt)
                    }
                    Err(e) => Err(ParseError::invalid_request(
                        format!("Invalid host header: {e}"),
                        host_lines[0],
                    )),
                }
            }
            _ => Err(ParseError::invalid_request(
                "More than one Host header specified",
                host_lines[1],
            )),
        }
    }

    fn create_body_reader<R: Read + 'static>(
        &self,
        stream: R,
        headers: &HttpHeaders,
        has_body: bool,
        kind: MessageKind,
    ) -> Result<Option<LazyBodyReader>, ParseError> {
        if !has_body {
            return Ok(None);
        }
        let length = content_length_of(headers, kind)?;
        let body_type = Self::body_type(headers, length)?;
        Ok(Some(LazyBodyReader::new(
            body_type,
            length,
            stream,
            self.options.allow_new_line_without_return,
        )))
    }
}

/// The first Content-Length value, reported as a parse fault at that
/// header's source line when malformed.
fn content_length_of(headers: &HttpHeaders, kind: MessageKind) -> Result<Option<u64>, ParseError> {
    match RawHttp::parse_content_length(headers) {
        None => Ok(None),
        Some(Ok(length)) => Ok(Some(length)),
        Some(Err(_)) => {
            let line = headers.line_numbers("Content-Length").first().copied().unwrap_or(0);
            let value = headers.get_first("Content-Length").unwrap_or_default();
            Err(kind.error(&format!("Invalid Content-Length: {value}"), line))
        }
    }
}

fn in_group(first_digit: u16, status_code: u16) -> bool {
    let min_code = first_digit * 100;
    (min_code..=min_code + 99).contains(&status_code)
}
