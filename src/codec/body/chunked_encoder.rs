use std::io::{self, Write};

use crate::protocol::body::Chunk;
use crate::protocol::HttpHeaders;

/// Writes chunked transfer framing to a blocking sink.
///
/// The output mirrors what [`ChunkedDecoder`] consumed: size line (with any
/// preserved extensions), data, CRLF, then after the terminal chunk the
/// trailer lines and the final blank line.
///
/// [`ChunkedDecoder`]: super::ChunkedDecoder
#[derive(Debug, Clone, Default)]
pub struct ChunkedEncoder;

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Writes one chunk frame. The terminal zero-size chunk carries no data
    /// and no trailing CRLF; trailers follow via [`write_trailers`].
    ///
    /// [`write_trailers`]: ChunkedEncoder::write_trailers
    pub fn write_chunk<W: Write>(&mut self, chunk: &Chunk, sink: &mut W) -> io::Result<()> {
        match chunk.extensions() {
            Some(extensions) => write!(sink, "{:X};{}\r\n", chunk.size(), extensions)?,
            None => write!(sink, "{:X}\r\n", chunk.size())?,
        }
        if !chunk.is_last() {
            sink.write_all(chunk.data())?;
            sink.write_all(b"\r\n")?;
        }
        Ok(())
    }

    /// Writes the trailer header lines and the blank line ending the body.
    pub fn write_trailers<W: Write>(
        &mut self,
        trailers: &HttpHeaders,
        sink: &mut W,
    ) -> io::Result<()> {
        trailers.write_to(sink)?;
        sink.write_all(b"\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::body::ChunkedDecoder;
    use std::io::Cursor;

    #[test]
    fn encodes_what_the_decoder_read() {
        let input = b"5;tag=1\r\nhello\r\n6\r\n world\r\n0\r\nX-Sum: ok\r\n\r\n";
        let (chunks, trailers) =
            ChunkedDecoder::new(Cursor::new(input.to_vec()), false).decode().unwrap();

        let mut encoder = ChunkedEncoder::new();
        let mut out = Vec::new();
        for chunk in &chunks {
            encoder.write_chunk(chunk, &mut out).unwrap();
        }
        encoder.write_trailers(&trailers, &mut out).unwrap();

        assert_eq!(out, input);
    }

    #[test]
    fn empty_body_is_a_lone_terminal_chunk() {
        let (chunks, trailers) =
            ChunkedDecoder::new(Cursor::new(b"0\r\n\r\n".to_vec()), false).decode().unwrap();

        let mut encoder = ChunkedEncoder::new();
        let mut out = Vec::new();
        for chunk in &chunks {
            encoder.write_chunk(chunk, &mut out).unwrap();
        }
        encoder.write_trailers(&trailers, &mut out).unwrap();

        assert_eq!(out, b"0\r\n\r\n");
    }
}
