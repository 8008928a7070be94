use std::cmp;
use std::io::{self, Read, Write};

use bytes::Bytes;

const COPY_BUF_SIZE: usize = 8 * 1024;

/// Reads a body of a declared length from a blocking source.
///
/// Reaching EOF before the declared length is a framing error
/// (`UnexpectedEof`), never a short result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Reads the full declared length into memory.
    pub fn decode<R: Read>(&mut self, source: &mut R) -> io::Result<Bytes> {
        let expected = self.remaining;
        let mut buffer = Vec::new();
        source.take(expected).read_to_end(&mut buffer)?;
        self.remaining = expected - buffer.len() as u64;
        if self.remaining > 0 {
            return Err(short_read(expected, buffer.len() as u64));
        }
        Ok(Bytes::from(buffer))
    }

    /// Streams the full declared length to `sink`, returning the number of
    /// bytes copied.
    pub fn copy<R: Read, W: Write>(&mut self, source: &mut R, sink: &mut W) -> io::Result<u64> {
        let expected = self.remaining;
        let mut buffer = [0u8; COPY_BUF_SIZE];
        while self.remaining > 0 {
            let want = cmp::min(self.remaining, COPY_BUF_SIZE as u64) as usize;
            let read = match source.read(&mut buffer[..want]) {
                Ok(0) => return Err(short_read(expected, expected - self.remaining)),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            sink.write_all(&buffer[..read])?;
            self.remaining -= read as u64;
        }
        Ok(expected)
    }
}

fn short_read(expected: u64, got: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("body ended after {got} bytes, Content-Length declared {expected}"),
    )
}
