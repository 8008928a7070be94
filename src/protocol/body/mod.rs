//! HTTP message bodies.
//!
//! A parsed message owns the remainder of its source stream through a
//! [`LazyBodyReader`]; nothing past the header block is consumed at parse
//! time. The reader knows its framing mode ([`BodyType`]) and exposes
//! single-use operations that either stream the body somewhere or buffer it
//! into an [`EagerBody`]. Chunked bodies keep their frame structure
//! ([`ChunkedBody`], [`Chunk`]) so trailers and chunk extensions survive
//! re-serialization.

use std::fmt;
use std::io::{self, Read, Write};

use bytes::{Bytes, BytesMut};

use crate::codec::body::{ChunkedDecoder, ChunkedEncoder, LengthDecoder};
use crate::protocol::HttpHeaders;

/// How the end of a message body is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// The body is exactly Content-Length bytes.
    ContentLength,
    /// The body uses the chunked transfer coding.
    Chunked,
    /// The body ends when the connection closes.
    CloseTerminated,
}

/// One frame of a chunked body: the decoded data plus the raw extension text
/// from the size line, if any. The terminal frame has empty data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    extensions: Option<String>,
    data: Bytes,
}

impl Chunk {
    pub(crate) fn new(extensions: Option<String>, data: Bytes) -> Self {
        Self { extensions, data }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// The raw text that followed the first `;` on the size line.
    pub fn extensions(&self) -> Option<&str> {
        self.extensions.as_deref()
    }

    /// Whether this is the terminal zero-size chunk.
    pub fn is_last(&self) -> bool {
        self.data.is_empty()
    }
}

/// The framed form of a decoded chunked body: every chunk (terminal one
/// included) and the trailer headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedBody {
    chunks: Vec<Chunk>,
    trailers: HttpHeaders,
}

impl ChunkedBody {
    pub(crate) fn new(chunks: Vec<Chunk>, trailers: HttpHeaders) -> Self {
        Self { chunks, trailers }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn trailers(&self) -> &HttpHeaders {
        &self.trailers
    }

    /// The decoded payload: all chunk data concatenated.
    pub fn data(&self) -> Bytes {
        let mut data = BytesMut::with_capacity(self.chunks.iter().map(Chunk::size).sum());
        for chunk in &self.chunks {
            data.extend_from_slice(chunk.data());
        }
        data.freeze()
    }

    /// Re-emits the body in chunked framing, trailers included.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        let mut encoder = ChunkedEncoder::new();
        for chunk in &self.chunks {
            encoder.write_chunk(chunk, sink)?;
        }
        encoder.write_trailers(&self.trailers, sink)
    }
}

/// A lazy, single-use handle over the unread body bytes of a parsed message.
///
/// The reader owns the source stream. Every operation takes the reader by
/// value; once consumed the stream is either drained or dropped, so a body
/// cannot be read twice. Dropping the reader without consuming it closes the
/// stream and discards the body.
pub struct LazyBodyReader {
    body_type: BodyType,
    length: Option<u64>,
    source: Box<dyn Read>,
    allow_new_line_without_return: bool,
}

impl LazyBodyReader {
    pub(crate) fn new<R: Read + 'static>(
        body_type: BodyType,
        length: Option<u64>,
        source: R,
        allow_new_line_without_return: bool,
    ) -> Self {
        Self { body_type, length, source: Box::new(source), allow_new_line_without_return }
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// The declared body length, known only for Content-Length framing.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Streams the framed body bytes to `sink`. Chunked bodies are re-emitted
    /// in chunked framing chunk by chunk, without buffering the whole body.
    pub fn write_to<W: Write>(mut self, sink: &mut W) -> io::Result<()> {
        match self.body_type {
            BodyType::ContentLength => {
                LengthDecoder::new(self.length.unwrap_or(0)).copy(&mut self.source, sink)?;
                Ok(())
            }
            BodyType::Chunked => {
                let mut decoder =
                    ChunkedDecoder::new(&mut self.source, self.allow_new_line_without_return);
                let mut encoder = ChunkedEncoder::new();
                loop {
                    let chunk = decoder.read_chunk()?;
                    encoder.write_chunk(&chunk, sink)?;
                    if chunk.is_last() {
                        break;
                    }
                }
                let trailers = decoder.read_trailers()?;
                encoder.write_trailers(&trailers, sink)
            }
            BodyType::CloseTerminated => {
                io::copy(&mut self.source, sink)?;
                Ok(())
            }
        }
    }

    /// Decodes the body into its payload bytes, stripping any framing.
    pub fn decode(self) -> io::Result<Bytes> {
        Ok(self.eagerly()?.into_bytes())
    }

    /// Decodes a chunked body into its framed representation. Fails with
    /// `InvalidInput` for the other framing modes.
    pub fn decode_chunked(mut self) -> io::Result<ChunkedBody> {
        if self.body_type != BodyType::Chunked {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "body does not use the chunked transfer coding",
            ));
        }
        let decoder = ChunkedDecoder::new(&mut self.source, self.allow_new_line_without_return);
        let (chunks, trailers) = decoder.decode()?;
        Ok(ChunkedBody::new(chunks, trailers))
    }

    /// Reads the whole body into memory and closes the source stream.
    pub fn eagerly(mut self) -> io::Result<EagerBody> {
        match self.body_type {
            BodyType::ContentLength => {
                let bytes =
                    LengthDecoder::new(self.length.unwrap_or(0)).decode(&mut self.source)?;
                Ok(EagerBody { body_type: self.body_type, bytes, chunked: None })
            }
            BodyType::Chunked => {
                let chunked = self.decode_chunked()?;
                Ok(EagerBody {
                    body_type: BodyType::Chunked,
                    bytes: chunked.data(),
                    chunked: Some(chunked),
                })
            }
            BodyType::CloseTerminated => {
                let mut buffer = Vec::new();
                self.source.read_to_end(&mut buffer)?;
                Ok(EagerBody {
                    body_type: self.body_type,
                    bytes: Bytes::from(buffer),
                    chunked: None,
                })
            }
        }
    }
}

impl fmt::Debug for LazyBodyReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBodyReader")
            .field("body_type", &self.body_type)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// A body fully buffered in memory. Can be read and serialized repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerBody {
    body_type: BodyType,
    bytes: Bytes,
    chunked: Option<ChunkedBody>,
}

impl EagerBody {
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// The decoded payload bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// The framed representation, present for chunked bodies.
    pub fn chunked(&self) -> Option<&ChunkedBody> {
        self.chunked.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes the framed body bytes: chunked framing for chunked bodies, the
    /// payload verbatim otherwise.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        match &self.chunked {
            Some(chunked) => chunked.write_to(sink),
            None => sink.write_all(&self.bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(body_type: BodyType, length: Option<u64>, input: &[u8]) -> LazyBodyReader {
        LazyBodyReader::new(body_type, length, Cursor::new(input.to_vec()), false)
    }

    #[test]
    fn content_length_body_reads_exactly_the_declared_bytes() {
        let body = reader(BodyType::ContentLength, Some(5), b"HELLO more").eagerly().unwrap();
        assert_eq!(&body.bytes()[..], b"HELLO");
        assert_eq!(body.chunked(), None);
    }

    #[test]
    fn content_length_short_read_fails() {
        let err = reader(BodyType::ContentLength, Some(10), b"short").eagerly().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn close_terminated_body_reads_to_eof() {
        let body = reader(BodyType::CloseTerminated, None, b"anything goes").eagerly().unwrap();
        assert_eq!(&body.bytes()[..], b"anything goes");
    }

    #[test]
    fn chunked_body_decodes_frames_and_payload() {
        let input = b"5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let body = reader(BodyType::Chunked, None, input).eagerly().unwrap();
        assert_eq!(&body.bytes()[..], b"hello world");

        let chunked = body.chunked().unwrap();
        assert_eq!(chunked.chunks().len(), 3);
        assert_eq!(&chunked.data()[..], b"hello world");
        assert!(chunked.trailers().is_empty());
    }

    #[test]
    fn chunked_payload_length_matches_chunk_sum() {
        let input = b"3\r\nabc\r\n4\r\ndefg\r\n0\r\n\r\n";
        let chunked = reader(BodyType::Chunked, None, input).decode_chunked().unwrap();
        let sum: usize = chunked.chunks().iter().map(Chunk::size).sum();
        assert_eq!(chunked.data().len(), sum);
    }

    #[test]
    fn decode_chunked_rejects_other_framings() {
        let err = reader(BodyType::ContentLength, Some(3), b"abc").decode_chunked().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn write_to_re_frames_chunked_bodies() {
        let input = b"5;x=1\r\nhello\r\n0\r\nX-Check: 9\r\n\r\n";
        let mut out = Vec::new();
        reader(BodyType::Chunked, None, input).write_to(&mut out).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn write_to_streams_content_length_verbatim() {
        let mut out = Vec::new();
        reader(BodyType::ContentLength, Some(5), b"HELLO extra").write_to(&mut out).unwrap();
        assert_eq!(out, b"HELLO");
    }

    #[test]
    fn eager_body_can_be_written_twice() {
        let body = reader(BodyType::ContentLength, Some(4), b"data").eagerly().unwrap();
        let mut first = Vec::new();
        let mut second = Vec::new();
        body.write_to(&mut first).unwrap();
        body.write_to(&mut second).unwrap();
        assert_eq!(first, second);
    }
}
