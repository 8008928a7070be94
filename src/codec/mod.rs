//! Byte-level decoding and encoding of HTTP/1.x framing.
//!
//! The codec layer knows nothing about message semantics. It turns octets
//! into metadata lines and body frames, and frames back into octets:
//!
//! - [`tokenizer`]: reads the start-line and header lines up to the blank
//!   line ending the header block, tracking line numbers.
//! - [`body`]: the three body framing modes. [`body::LengthDecoder`] reads a
//!   declared number of bytes, [`body::ChunkedDecoder`] decodes chunked
//!   transfer coding including extensions and trailers, and
//!   [`body::ChunkedEncoder`] re-emits chunked framing.
//!
//! Everything here reads from and writes to blocking `std::io` streams; the
//! caller decides buffering and timeouts.

pub mod body;
pub(crate) mod tokenizer;

use std::io::{self, Read};

/// Reads a single byte, retrying on interruption. `None` means EOF.
pub(crate) fn read_byte<R: Read>(source: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match source.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
