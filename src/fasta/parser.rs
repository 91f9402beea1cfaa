//! Offset-tracking FASTA record reading.
//!
//! The FASTA grammar itself carries no positions, so the reader counts every
//! byte it consumes: the offset of each record is the position of its `>`
//! line, and the caller-supplied position cursor is advanced in lockstep with
//! the stream. Line handling is byte-level (`\n` with one trailing `\r`
//! stripped), identical on every platform.

use std::io::BufRead;

use memchr::memchr;

use crate::error::{FormatError, Result};

/// A FASTA record as it appears in the stream, before identifier rewriting
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Header text after the `>` marker, trimmed
    pub header: String,
    /// Concatenated sequence bytes, line breaks removed
    pub symbols: Vec<u8>,
    /// Byte offset of the `>` line in the source stream
    pub offset: u64,
}

/// Reads exactly one record from a reader positioned at `*pos`.
///
/// Blank lines before the record are skipped. Returns `Ok(None)` at end of
/// stream; a first meaningful line not starting with `>` is a format error.
/// `*pos` is advanced by every byte consumed.
pub fn read_record<R: BufRead>(reader: &mut R, pos: &mut u64) -> Result<Option<RawRecord>> {
    let Some((offset, line)) = next_meaningful_line(reader, pos)? else {
        return Ok(None);
    };
    let Some(header) = line.strip_prefix('>') else {
        return Err(FormatError::MissingSequenceHeader(offset).into());
    };
    let header = header.trim_end().to_string();

    let mut symbols = Vec::new();
    let mut line_open = false;
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        // the next header marks the end of this record; leave it unconsumed
        if !line_open && available[0] == b'>' {
            break;
        }
        match memchr(b'\n', available) {
            Some(eol) => {
                let mut line = &available[..eol];
                if line.last() == Some(&b'\r') {
                    line = &line[..line.len() - 1];
                }
                symbols.extend_from_slice(line);
                // a '\r' split across reads lands at the tail; drop it
                if line.is_empty() && symbols.last() == Some(&b'\r') {
                    symbols.pop();
                }
                reader.consume(eol + 1);
                *pos += (eol + 1) as u64;
                line_open = false;
            }
            None => {
                let n = available.len();
                symbols.extend_from_slice(available);
                reader.consume(n);
                *pos += n as u64;
                line_open = true;
            }
        }
    }

    Ok(Some(RawRecord {
        header,
        symbols,
        offset,
    }))
}

/// Advances past blank lines to the next meaningful one, returning it with
/// the byte offset it started at. Returns `Ok(None)` at end of stream.
fn next_meaningful_line<R: BufRead>(
    reader: &mut R,
    pos: &mut u64,
) -> Result<Option<(u64, String)>> {
    loop {
        let line_start = *pos;
        let mut raw = Vec::new();
        let n = reader.read_until(b'\n', &mut raw)?;
        if n == 0 {
            return Ok(None);
        }
        *pos += n as u64;
        while let Some(&b) = raw.last() {
            if b == b'\n' || b == b'\r' {
                raw.pop();
            } else {
                break;
            }
        }
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let line = std::str::from_utf8(&raw)?.to_string();
        return Ok(Some((line_start, line)));
    }
}
