//! HTTP request model: the request-line and the request message.

use std::fmt;
use std::io::{self, Write};
use std::net::IpAddr;

use http::uri::{Authority, PathAndQuery, Scheme};
use http::Uri;

use crate::protocol::body::{EagerBody, LazyBodyReader};
use crate::protocol::headers::index_of_not_allowed_in_tokens;
use crate::protocol::{HttpHeaders, HttpVersion, ParseError};

/// The request-line of an HTTP request: method, target URI and version.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLine {
    method: String,
    uri: Uri,
    version: HttpVersion,
}

impl RequestLine {
    /// Parses a request-line.
    ///
    /// The line is split at each whitespace character; separator runs are
    /// not collapsed, so doubled whitespace between tokens fails the token
    /// count (trailing separators are dropped). Three tokens are method,
    /// target and version; two tokens are accepted only when
    /// `insert_http_version_if_missing` is set, in which case the version
    /// defaults to HTTP/1.1. The method must be a non-empty RFC 7230 token.
    pub fn parse(line: &str, insert_http_version_if_missing: bool) -> Result<Self, ParseError> {
        if line.is_empty() {
            return Err(ParseError::invalid_request("Empty request line", 1));
        }
        let mut parts: Vec<&str> = line.split(char::is_whitespace).collect();
        while parts.last() == Some(&"") {
            parts.pop();
        }
        if parts.len() != 2 && parts.len() != 3 {
            return Err(ParseError::invalid_request("Invalid request line", 1));
        }

        let method = parts[0];
        if method.is_empty() || index_of_not_allowed_in_tokens(method).is_some() {
            return Err(ParseError::invalid_request("Invalid method name", 1));
        }

        let uri = create_uri(parts[1])?;

        let version = if parts.len() == 3 {
            HttpVersion::try_from(parts[2])
                .map_err(|_| ParseError::invalid_request("Invalid HTTP version", 1))?
        } else if insert_http_version_if_missing {
            HttpVersion::Http1_1
        } else {
            return Err(ParseError::invalid_request("Missing HTTP version", 1));
        };

        Ok(RequestLine { method: method.to_string(), uri, version })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// Rebuilds this request-line with the given authority. The scheme
    /// defaults to `http` and the path to `/` when absent.
    pub fn with_host(&self, host: &str) -> Result<RequestLine, http::Error> {
        let authority = host.parse::<Authority>()?;
        let mut parts = self.uri.clone().into_parts();
        if parts.scheme.is_none() {
            parts.scheme = Some(Scheme::HTTP);
        }
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.authority = Some(authority);
        let uri = Uri::from_parts(parts)?;
        Ok(RequestLine { method: self.method.clone(), uri, version: self.version })
    }

    /// The request-target in origin form: path and query, `/` when the URI
    /// has no path.
    pub fn origin_form(&self) -> &str {
        self.uri.path_and_query().map(PathAndQuery::as_str).unwrap_or("/")
    }
}

/// Renders `method SP request-target SP version`. CONNECT requests keep the
/// authority form of their target; every other method serializes in origin
/// form, so the authority never appears twice (the Host header already
/// carries it).
impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = if self.method.eq_ignore_ascii_case("CONNECT") {
            self.uri.authority().map(Authority::as_str).unwrap_or_else(|| self.origin_form())
        } else {
            self.origin_form()
        };
        write!(f, "{} {} {}", self.method, target, self.version)
    }
}

/// Parses the request-target into a URI.
///
/// Origin-form targets (starting with `/`) are parsed as-is. Any other target
/// not starting with `http` has `http://` prepended first, so that
/// `host.example/path` yields a URI whose host is `host.example`. Targets
/// starting with `http` are parsed verbatim, including schemes like
/// `httpx://` that merely share the prefix.
fn create_uri(target: &str) -> Result<Uri, ParseError> {
    let prefixed;
    let candidate = if target.starts_with('/') || target.starts_with("http") {
        target
    } else {
        prefixed = format!("http://{target}");
        &prefixed
    };
    candidate
        .parse::<Uri>()
        .map_err(|e| ParseError::invalid_request(format!("Invalid URI: {e}"), 1))
}

/// A parsed HTTP request.
///
/// The body, when present, is a [`LazyBodyReader`] owning the remaining bytes
/// of the source stream; [`HttpRequest::eagerly`] drains it into memory,
/// producing an [`EagerHttpRequest`] that can be inspected and serialized
/// repeatedly.
#[derive(Debug)]
pub struct HttpRequest<B = LazyBodyReader> {
    request_line: RequestLine,
    headers: HttpHeaders,
    body: Option<B>,
    sender: Option<IpAddr>,
}

/// A request whose body is fully buffered in memory.
pub type EagerHttpRequest = HttpRequest<EagerBody>;

impl<B> HttpRequest<B> {
    pub(crate) fn new(
        request_line: RequestLine,
        headers: HttpHeaders,
        body: Option<B>,
        sender: Option<IpAddr>,
    ) -> Self {
        Self { request_line, headers, body, sender }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &str {
        self.request_line.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request_line.uri()
    }

    pub fn version(&self) -> HttpVersion {
        self.request_line.version()
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// The address of the request sender, when known.
    pub fn sender(&self) -> Option<IpAddr> {
        self.sender
    }

    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    fn write_head<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        write!(sink, "{}\r\n", self.request_line)?;
        self.headers.write_to(sink)?;
        sink.write_all(b"\r\n")
    }
}

impl HttpRequest<LazyBodyReader> {
    /// Takes the body reader out of the request.
    pub fn into_body(self) -> Option<LazyBodyReader> {
        self.body
    }

    /// Buffers the whole message in memory, closing the source stream.
    pub fn eagerly(self) -> io::Result<EagerHttpRequest> {
        let body = match self.body {
            Some(reader) => Some(reader.eagerly()?),
            None => None,
        };
        Ok(HttpRequest {
            request_line: self.request_line,
            headers: self.headers,
            body,
            sender: self.sender,
        })
    }

    /// Serializes the message, streaming the body through. Consumes the
    /// request since the body reader is single-use.
    pub fn write_to<W: Write>(self, sink: &mut W) -> io::Result<()> {
        self.write_head(sink)?;
        match self.body {
            Some(reader) => reader.write_to(sink),
            None => Ok(()),
        }
    }
}

impl HttpRequest<EagerBody> {
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
