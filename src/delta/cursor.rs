//! One read cursor over the line-oriented delta grammar.
//!
//! A record is a line group: an `@<offset>` marker that must equal the byte
//! position it was read from, a `><referenceId>` line, a query-identifier
//! line carrying the query's corpus offset as a suffix, a seven-integer
//! coordinate line, and signed delta-offset lines until a `*` terminator,
//! end of stream, or the next `@` marker. Blank lines between meaningful
//! lines are skipped. Any sentinel failure aborts the parse with no partial
//! record.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::error::{CorruptionError, FormatError, Result};
use crate::fasta::{split_offset_suffix, PositionIndex, SequenceRecord};

use super::record::{DeltaRecord, RawCoordinates};

/// Sentinel opening every record
const RECORD_MARKER: char = '@';
/// Sentinel opening the reference line
const REFERENCE_MARKER: char = '>';
/// Sentinel terminating a record's delta-offset lines
const TERMINATOR: char = '*';

/// The header line group of one record: identity, reference id, query line
pub(crate) struct RecordHeader {
    pub identity: u64,
    pub reference_id: String,
    pub query_line: String,
}

/// A private, seekable read position over a delta stream.
///
/// Holds a one-slot query-resolution cache so a run of records sharing a
/// query resolves the sequence once.
pub(crate) struct DeltaCursor {
    reader: BufReader<File>,
    pos: u64,
    pending: Option<(u64, String)>,
    last_query: Option<(String, Arc<SequenceRecord>)>,
}

impl DeltaCursor {
    pub fn open(path: &Path, offset: u64) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        if offset > 0 {
            reader.seek(SeekFrom::Start(offset))?;
        }
        Ok(Self {
            reader,
            pos: offset,
            pending: None,
            last_query: None,
        })
    }

    /// Reads the next fully parsed record, resolving its query sequence
    /// through `sequences`. Returns `Ok(None)` at end of stream.
    pub fn read_record(&mut self, sequences: &PositionIndex) -> Result<Option<DeltaRecord>> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        let query = self.resolve_query(&header.query_line, sequences)?;

        let Some((line_start, line)) = self.next_meaningful_line()? else {
            return Err(FormatError::TruncatedRecord(header.identity).into());
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(FormatError::InvalidCoordinates {
                offset: line_start,
                found: fields.len(),
            }
            .into());
        }
        let coords = RawCoordinates {
            first_start: parse_u64(fields[0])?,
            first_end: parse_u64(fields[1])?,
            second_start: parse_u64(fields[2])?,
            second_end: parse_u64(fields[3])?,
            errors: parse_u64(fields[4])?,
            similarity_errors: parse_u64(fields[5])?,
            non_alphas: parse_u64(fields[6])?,
        };

        let mut deltas = Vec::new();
        while let Some((line_start, line)) = self.next_meaningful_line()? {
            if line.starts_with(TERMINATOR) {
                break;
            }
            if line.starts_with(RECORD_MARKER) {
                // next record; leave it for the following read
                self.push_back(line_start, line);
                break;
            }
            deltas.push(parse_i64(&line)?);
        }

        Ok(Some(DeltaRecord::assemble(
            header.identity,
            header.reference_id,
            query,
            coords,
            deltas,
        )))
    }

    /// Reads only the header line group of the next record, leaving the
    /// cursor inside its body. Returns `Ok(None)` at end of stream.
    pub fn read_header(&mut self) -> Result<Option<RecordHeader>> {
        let Some((line_start, line)) = self.next_meaningful_line()? else {
            return Ok(None);
        };
        let Some(digits) = line.strip_prefix(RECORD_MARKER) else {
            return Err(FormatError::MissingRecordMarker {
                offset: line_start,
                found: line,
            }
            .into());
        };
        let identity = parse_u64(digits)?;
        if identity != line_start {
            return Err(CorruptionError::OffsetMismatch {
                reported: identity,
                actual: line_start,
            }
            .into());
        }

        let Some((ref_start, ref_line)) = self.next_meaningful_line()? else {
            return Err(FormatError::TruncatedRecord(identity).into());
        };
        let Some(reference_id) = ref_line.strip_prefix(REFERENCE_MARKER) else {
            return Err(FormatError::MissingReferenceLine {
                offset: ref_start,
                found: ref_line,
            }
            .into());
        };
        let reference_id = reference_id.trim().to_string();

        let Some((_, query_line)) = self.next_meaningful_line()? else {
            return Err(FormatError::TruncatedRecord(identity).into());
        };
        Ok(Some(RecordHeader {
            identity,
            reference_id,
            query_line: query_line.trim().to_string(),
        }))
    }

    /// Reads the self-reported offset of the next record without validating
    /// or parsing its body, then skips to the record after it. Returns
    /// `Ok(None)` at end of stream.
    pub fn read_position(&mut self) -> Result<Option<u64>> {
        let Some((line_start, line)) = self.next_meaningful_line()? else {
            return Ok(None);
        };
        let Some(digits) = line.strip_prefix(RECORD_MARKER) else {
            return Err(FormatError::MissingRecordMarker {
                offset: line_start,
                found: line,
            }
            .into());
        };
        let position = parse_u64(digits)?;
        self.skip_body()?;
        Ok(Some(position))
    }

    /// Skips lines until the next `@` marker (pushed back) or end of stream
    pub fn skip_body(&mut self) -> Result<()> {
        while let Some((line_start, line)) = self.next_meaningful_line()? {
            if line.starts_with(RECORD_MARKER) {
                self.push_back(line_start, line);
                break;
            }
        }
        Ok(())
    }

    fn resolve_query(
        &mut self,
        query_line: &str,
        sequences: &PositionIndex,
    ) -> Result<Arc<SequenceRecord>> {
        if let Some((last_id, record)) = &self.last_query {
            if last_id == query_line {
                return Ok(Arc::clone(record));
            }
        }
        let (_, seq_offset) = split_offset_suffix(query_line)?;
        let record = sequences.sequence_at(seq_offset)?;
        self.last_query = Some((query_line.to_string(), Arc::clone(&record)));
        Ok(record)
    }

    fn push_back(&mut self, line_start: u64, line: String) {
        debug_assert!(self.pending.is_none());
        self.pending = Some((line_start, line));
    }

    /// Advances past blank lines to the next meaningful one, returning it
    /// with the byte offset it started at
    fn next_meaningful_line(&mut self) -> Result<Option<(u64, String)>> {
        if let Some(entry) = self.pending.take() {
            return Ok(Some(entry));
        }
        loop {
            let line_start = self.pos;
            let mut raw = Vec::new();
            let n = self.reader.read_until(b'\n', &mut raw)?;
            if n == 0 {
                return Ok(None);
            }
            self.pos += n as u64;
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
}

fn parse_u64(text: &str) -> Result<u64> {
    text.trim()
        .parse()
        .map_err(|_| FormatError::InvalidInteger(text.to_string()).into())
}

fn parse_i64(text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| FormatError::InvalidInteger(text.to_string()).into())
}
