//! Decoder for the chunked transfer coding.
//!
//! Each chunk is a hexadecimal size line (optionally carrying extensions
//! after a `;`), the data bytes, and a CRLF. A zero size terminates the
//! body; it is followed by optional trailer header lines and a final blank
//! line. Extensions are not interpreted, but their raw text is preserved so
//! a re-serialized body is byte-faithful.

use std::io::{self, Read};

use bytes::Bytes;

use crate::codec::read_byte;
use crate::codec::tokenizer::read_metadata_lines;
use crate::protocol::body::Chunk;
use crate::protocol::{HeadersBuilder, HttpHeaders};

#[derive(Debug, Clone, Copy, PartialEq)]
enum HeaderState {
    Size,
    SizeLws,
    Extension,
}

/// Reads chunked-coded frames from a blocking source.
pub struct ChunkedDecoder<R> {
    source: R,
    allow_new_line_without_return: bool,
}

impl<R: Read> ChunkedDecoder<R> {
    pub fn new(source: R, allow_new_line_without_return: bool) -> Self {
        Self { source, allow_new_line_without_return }
    }

    /// Reads the next chunk frame. The terminal zero-size chunk is returned
    /// like any other; callers must follow up with [`read_trailers`].
    ///
    /// [`read_trailers`]: ChunkedDecoder::read_trailers
    pub fn read_chunk(&mut self) -> io::Result<Chunk> {
        let (size, extensions) = self.read_chunk_header()?;
        if size == 0 {
            return Ok(Chunk::new(extensions, Bytes::new()));
        }
        let data = self.read_chunk_data(size)?;
        self.read_chunk_terminator()?;
        Ok(Chunk::new(extensions, data))
    }

    /// Reads the trailer header lines and the final blank line after the
    /// terminal chunk.
    pub fn read_trailers(&mut self) -> io::Result<HttpHeaders> {
        let lines = read_metadata_lines(
            &mut self.source,
            trailer_error,
            self.allow_new_line_without_return,
            false,
        )?;
        let builder = HeadersBuilder::parse_lines(&lines, 1, |m, l| trailer_error(&m, l))?;
        Ok(builder.build())
    }

    /// Decodes the whole body: every chunk frame, then the trailers.
    pub fn decode(mut self) -> io::Result<(Vec<Chunk>, HttpHeaders)> {
        let mut chunks = Vec::new();
        loop {
            let chunk = self.read_chunk()?;
            let last = chunk.is_last();
            chunks.push(chunk);
            if last {
                break;
            }
        }
        let trailers = self.read_trailers()?;
        Ok((chunks, trailers))
    }

    fn read_chunk_header(&mut self) -> io::Result<(u64, Option<String>)> {
        let mut state = HeaderState::Size;
        let mut size: u64 = 0;
        let mut seen_digit = false;
        let mut extensions: Option<String> = None;

        loop {
            let b = self.next_byte()?;
            match b {
                b'\r' => {
                    self.expect_line_feed()?;
                    break;
                }
                b'\n' if self.allow_new_line_without_return => break,
                b'\n' => {
                    return Err(invalid_chunk(
                        "Illegal new-line character without preceding return in chunk size line",
                    ));
                }
                _ => {}
            }
            match state {
                HeaderState::Size => match b {
                    b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' => {
                        let digit = (b as char).to_digit(16).unwrap_or(0) as u64;
                        size = size
                            .checked_mul(16)
                            .and_then(|s| s.checked_add(digit))
                            .ok_or_else(|| invalid_chunk("invalid chunk size: overflow"))?;
                        seen_digit = true;
                    }
                    b'\t' | b' ' => state = HeaderState::SizeLws,
                    b';' => {
                        extensions = Some(String::new());
                        state = HeaderState::Extension;
                    }
                    _ => return Err(invalid_chunk("invalid chunk size")),
                },
                // whitespace can follow the size, but no more digits may come
                HeaderState::SizeLws => match b {
                    b'\t' | b' ' => {}
                    b';' => {
                        extensions = Some(String::new());
                        state = HeaderState::Extension;
                    }
                    _ => return Err(invalid_chunk("invalid chunk size linear white space")),
                },
                HeaderState::Extension => {
                    if let Some(ext) = extensions.as_mut() {
                        ext.push(b as char);
                    }
                }
            }
        }

        if !seen_digit {
            return Err(invalid_chunk("invalid chunk size"));
        }
        Ok((size, extensions))
    }

    fn read_chunk_data(&mut self, size: u64) -> io::Result<Bytes> {
        let size = usize::try_from(size)
            .map_err(|_| invalid_chunk("chunk size exceeds addressable memory"))?;
        let mut data = vec![0u8; size];
        self.source.read_exact(&mut data)?;
        Ok(Bytes::from(data))
    }

    fn read_chunk_terminator(&mut self) -> io::Result<()> {
        match self.next_byte()? {
            b'\r' => self.expect_line_feed(),
            b'\n' if self.allow_new_line_without_return => Ok(()),
            _ => Err(invalid_chunk("expected CRLF after chunk data")),
        }
    }

    fn expect_line_feed(&mut self) -> io::Result<()> {
        match self.next_byte()? {
            b'\n' => Ok(()),
            _ => Err(invalid_chunk("Illegal character after return")),
        }
    }

    fn next_byte(&mut self) -> io::Result<u8> {
        read_byte(&mut self.source)?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "EOF while reading chunked body")
        })
    }
}

fn invalid_chunk(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

fn trailer_error(message: &str, line: usize) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("{message} (trailer line {line})"))
}
