//! The metadata-line tokenizer.
//!
//! Reads bytes from a source stream up to and including the blank line that
//! ends the header block, returning the start-line and header lines in
//! order. Bytes after the blank line belong to the body and are never
//! consumed here.
//!
//! Line terminators are CRLF; a bare LF is accepted only when
//! `allow_new_line_without_return` is set. A CR followed by anything other
//! than LF (or EOF) is a framing error. Line numbers start at 1 on the
//! start-line and advance once per consumed terminator, so errors can point
//! at the offending source line. Terminators skipped through
//! `ignore_leading_empty_line` do not advance the count.
//!
//! The error constructor is passed in by the caller, so the same tokenizer
//! serves request parsing, response parsing and chunked-trailer reading with
//! their respective error types.

use std::io::{self, Read};
use std::mem;

use crate::codec::read_byte;

pub(crate) fn read_metadata_lines<R, E, F>(
    source: &mut R,
    make_error: F,
    allow_new_line_without_return: bool,
    ignore_leading_empty_line: bool,
) -> Result<Vec<String>, E>
where
    R: Read,
    E: From<io::Error>,
    F: Fn(&str, usize) -> E,
{
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut was_new_line = true;
    let mut skip_new_line = ignore_leading_empty_line;
    let mut line_number = 1usize;

    while let Some(b) = read_byte(source)? {
        if b == b'\r' {
            let next = read_byte(source)?;
            match next {
                None | Some(b'\n') => {
                    if skip_new_line {
                        continue;
                    }
                    line_number += 1;
                    if was_new_line {
                        break;
                    }
                    lines.push(mem::take(&mut current));
                    if next.is_none() {
                        break;
                    }
                    was_new_line = true;
                }
                Some(_) => {
                    return Err(make_error("Illegal character after return", line_number));
                }
            }
        } else if b == b'\n' {
            if skip_new_line {
                continue;
            }
            if !allow_new_line_without_return {
                return Err(make_error(
                    "Illegal new-line character without preceding return",
                    line_number,
                ));
            }
            line_number += 1;
            if was_new_line {
                break;
            }
            lines.push(mem::take(&mut current));
            was_new_line = true;
        } else {
            // bytes widen to chars directly; header text is treated as a
            // single-byte encoding
            current.push(b as char);
            was_new_line = false;
        }
        skip_new_line = false;
    }

    if !current.is_empty() {
        lines.push(current);
    }

    Ok(lines)
}
