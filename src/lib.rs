//! Wire-level HTTP/1.0 and HTTP/1.1 message handling.
//!
//! This crate parses raw request and response bytes into structured
//! messages, serializes structured messages back to bytes, and streams
//! message bodies in the three HTTP/1.x framing modes (Content-Length,
//! chunked, close-terminated). It gives callers direct control over HTTP
//! framing without the policy layers of a full HTTP stack: no cookies, no
//! redirects, no connection pooling, no caching.
//!
//! # Architecture
//!
//! - [`RawHttp`] is the parser: it reads a message head from a byte source
//!   and decides how the body is framed.
//! - [`protocol`] holds the message model: start-lines, the ordered
//!   case-insensitive header multimap, and the lazy/eager body types.
//! - [`codec`] holds the byte-level machinery: the metadata-line tokenizer
//!   and the body decoders/encoders.
//!
//! # Example
//!
//! ```
//! use rawhttp::RawHttp;
//!
//! let request = RawHttp::new()
//!     .parse_request("GET / HTTP/1.1\r\nHost: example.com\r\n\r\n")
//!     .unwrap();
//!
//! assert_eq!(request.method(), "GET");
//! assert_eq!(request.headers().get_first("host"), Some("example.com"));
//! assert!(!request.has_body());
//! ```
//!
//! Parsed messages are immutable. A message parsed from a stream holds the
//! stream in a lazy body reader; call `eagerly()` to buffer the body and
//! release the stream.

pub mod codec;
pub mod protocol;

mod options;
mod parser;

pub use options::RawHttpOptions;
pub use parser::RawHttp;

pub use protocol::{
    BodyType, Chunk, ChunkedBody, EagerBody, EagerHttpRequest, EagerHttpResponse, HttpHeaders,
    HttpRequest, HttpResponse, HttpVersion, LazyBodyReader, ParseError, RequestLine, StatusLine,
};
