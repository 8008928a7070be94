pub mod body;
mod error;
mod headers;
mod http_version;
mod request;
mod response;

pub use body::{BodyType, ChunkedBody, Chunk, EagerBody, LazyBodyReader};
pub use error::ParseError;
pub use headers::{HeadersBuilder, HttpHeaders, InvalidHeaderName};
pub use http_version::{HttpVersion, InvalidHttpVersion};
pub use request::{EagerHttpRequest, HttpRequest, RequestLine};
pub use response::{EagerHttpResponse, HttpResponse, StatusLine};
