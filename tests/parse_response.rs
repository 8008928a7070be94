use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rawhttp::{BodyType, HttpVersion, ParseError, RawHttp, RequestLine};

/// Wraps an in-memory source and records how many bytes were consumed, so
/// tests can assert what the parser left on the stream.
struct CountingReader {
    inner: Cursor<Vec<u8>>,
    consumed: Arc<AtomicUsize>,
}

impl CountingReader {
    fn new(input: &[u8]) -> (Self, Arc<AtomicUsize>) {
        let consumed = Arc::new(AtomicUsize::new(0));
        (Self { inner: Cursor::new(input.to_vec()), consumed: consumed.clone() }, consumed)
    }
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.fetch_add(n, Ordering::Relaxed);
        Ok(n)
    }
}

fn request_line(text: &str) -> RequestLine {
    RequestLine::parse(text, false).unwrap()
}

#[test]
fn plain_ok_response() {
    let response = RawHttp::new()
        .parse_response("HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nHELLO")
        .unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.version(), HttpVersion::Http1_1);
    assert_eq!(response.status_line().reason(), "OK");

    let body = response.into_body().unwrap();
    assert_eq!(body.body_type(), BodyType::ContentLength);
    assert_eq!(body.length(), Some(5));
    assert_eq!(&body.decode().unwrap()[..], b"HELLO");
}

#[test]
fn no_content_response_leaves_the_stream_unread() {
    let head = "HTTP/1.1 204 No Content\r\nContent-Length: 5\r\n\r\n";
    let (reader, consumed) = CountingReader::new(format!("{head}HELLO").as_bytes());

    let response = RawHttp::new().parse_response_from_stream(reader, None).unwrap();
    assert_eq!(response.status_code(), 204);
    assert!(!response.has_body());
    assert_eq!(consumed.load(Ordering::Relaxed), head.len());
}

#[test]
fn chunked_response_decodes_to_payload() {
    let response = RawHttp::new()
        .parse_response("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n")
        .unwrap();

    let chunked = response.into_body().unwrap().decode_chunked().unwrap();
    assert_eq!(&chunked.data()[..], b"hello");
    assert!(chunked.trailers().is_empty());
}

#[test]
fn chunked_trailers_are_exposed() {
    let response = RawHttp::new()
        .parse_response(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
             5\r\nhello\r\n0\r\nX-Checksum: abc123\r\n\r\n",
        )
        .unwrap();

    let chunked = response.into_body().unwrap().decode_chunked().unwrap();
    assert_eq!(chunked.trailers().get_first("x-checksum"), Some("abc123"));
}

#[test]
fn invalid_status_code_fails_at_line_one() {
    let err = RawHttp::new().parse_response("HTTP/1.1 abc OK\r\n\r\n").unwrap_err();
    match err {
        ParseError::InvalidResponse { message, line } => {
            assert_eq!(message, "Invalid status code");
            assert_eq!(line, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn head_responses_have_no_body() {
    let head = request_line("HEAD /big HTTP/1.1");
    let message_head = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n";
    let (reader, consumed) = CountingReader::new(format!("{message_head}unsent").as_bytes());

    let response = RawHttp::new().parse_response_from_stream(reader, Some(&head)).unwrap();
    assert!(!response.has_body());
    assert_eq!(consumed.load(Ordering::Relaxed), message_head.len());
}

#[test]
fn connect_2xx_responses_have_no_body() {
    let connect = request_line("CONNECT example.com:443 HTTP/1.1");
    let response = RawHttp::new()
        .parse_response_from_stream(
            Cursor::new(b"HTTP/1.1 200 Connection Established\r\n\r\n".to_vec()),
            Some(&connect),
        )
        .unwrap();
    assert!(!response.has_body());
}

#[test]
fn informational_and_not_modified_responses_have_no_body() {
    for head in ["HTTP/1.1 100 Continue", "HTTP/1.1 304 Not Modified", "HTTP/1.1 101 Switching"] {
        let response = RawHttp::new()
            .parse_response(&format!("{head}\r\nContent-Length: 10\r\n\r\n"))
            .unwrap();
        assert!(!response.has_body(), "body for {head:?}");
    }
}

#[test]
fn close_terminated_body_reads_to_eof() {
    let response = RawHttp::new()
        .parse_response("HTTP/1.1 200 OK\r\n\r\neverything until the connection closes")
        .unwrap();

    let body = response.into_body().unwrap();
    assert_eq!(body.body_type(), BodyType::CloseTerminated);
    assert_eq!(&body.decode().unwrap()[..], b"everything until the connection closes");
}

#[test]
fn unsupported_transfer_encoding_is_rejected() {
    let err = RawHttp::new()
        .parse_response("HTTP/1.1 200 OK\r\nTransfer-Encoding: gzip\r\n\r\n")
        .unwrap_err();
    assert_eq!(err.to_string(), "transfer encoding is not supported: gzip");
}

#[test]
fn content_length_short_body_fails_on_read() {
    let response = RawHttp::new()
        .parse_response("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc")
        .unwrap();

    let err = response.into_body().unwrap().decode().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn versionless_status_line_in_lenient_mode() {
    let response = RawHttp::new().parse_response("404 Not Found\r\n\r\n").unwrap();
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.version(), HttpVersion::Http1_1);
    assert_eq!(response.status_line().reason(), "Not Found");
}
