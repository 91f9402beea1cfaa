use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{CorruptionError, FormatError, Result};
use crate::fasta::PositionIndex;

use super::cursor::DeltaCursor;
use super::record::DeltaRecord;

/// Streaming and random-access reader over a delta-alignment text stream.
///
/// The store owns the delta file path and the [`PositionIndex`] that
/// resolves query sequences. Every operation that reads the stream opens a
/// private cursor, so random accesses and concurrent iterations never share
/// position state; parallel use means one cursor per task, which is exactly
/// what each call creates.
pub struct DeltaStore {
    path: PathBuf,
    sequences: PositionIndex,
}

impl DeltaStore {
    /// Opens a store over the delta file at `path`, resolving query
    /// sequences through `sequences`.
    pub fn new<P: AsRef<Path>>(path: P, sequences: PositionIndex) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        drop(File::open(&path)?);
        Ok(Self { path, sequences })
    }

    /// Convenience constructor building the sequence index from a FASTA path
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(delta: P, fasta: Q) -> Result<Self> {
        Self::new(delta, PositionIndex::from_path(fasta)?)
    }

    /// The sequence corpus index this store resolves queries through
    #[must_use]
    pub fn sequences(&self) -> &PositionIndex {
        &self.sequences
    }

    /// Mutable access to the sequence index, e.g. to build its cache
    pub fn sequences_mut(&mut self) -> &mut PositionIndex {
        &mut self.sequences
    }

    /// Streams the self-reported byte offset of every record, in file order.
    ///
    /// This is the single upfront scan an offset index is built from; it
    /// collects only the integer after each `@` marker and builds no
    /// records.
    pub fn positions(&self) -> Result<PositionIter> {
        Ok(PositionIter {
            cursor: DeltaCursor::open(&self.path, 0)?,
            done: false,
        })
    }

    /// Parses exactly one record from the given byte offset.
    ///
    /// Opens an independent cursor, verifies the record's self-reported
    /// offset against the request, and resolves the query sequence.
    pub fn record_at(&self, offset: u64) -> Result<DeltaRecord> {
        let mut cursor = DeltaCursor::open(&self.path, offset)?;
        let record = cursor
            .read_record(&self.sequences)?
            .ok_or(FormatError::TruncatedRecord(offset))?;
        if record.identity() != offset {
            return Err(CorruptionError::OffsetMismatch {
                reported: record.identity(),
                actual: offset,
            }
            .into());
        }
        Ok(record)
    }

    /// Reads only the query identifier of the record at the given offset
    pub fn query_id_at(&self, offset: u64) -> Result<String> {
        let mut cursor = DeltaCursor::open(&self.path, offset)?;
        let header = cursor
            .read_header()?
            .ok_or(FormatError::TruncatedRecord(offset))?;
        Ok(header.query_line)
    }

    /// Streams `(offset, query id)` pairs, one per record, in file order
    pub fn query_ids(&self) -> Result<QueryIdIter> {
        Ok(QueryIdIter {
            cursor: DeltaCursor::open(&self.path, 0)?,
            done: false,
        })
    }

    /// Streams fully parsed records from the start of the stream
    pub fn records(&self) -> Result<RecordIter<'_>> {
        self.records_from(0)
    }

    /// Streams fully parsed records beginning at the given byte offset
    pub fn records_from(&self, offset: u64) -> Result<RecordIter<'_>> {
        Ok(RecordIter {
            cursor: DeltaCursor::open(&self.path, offset)?,
            sequences: &self.sequences,
            done: false,
        })
    }
}

/// Lazy pass over record offsets; see [`DeltaStore::positions`]
pub struct PositionIter {
    cursor: DeltaCursor,
    done: bool,
}

impl Iterator for PositionIter {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.read_position() {
            Ok(Some(position)) => Some(Ok(position)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Lazy pass over `(offset, query id)` pairs; see [`DeltaStore::query_ids`]
pub struct QueryIdIter {
    cursor: DeltaCursor,
    done: bool,
}

impl Iterator for QueryIdIter {
    type Item = Result<(u64, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let header = match self.cursor.read_header() {
            Ok(Some(header)) => header,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        if let Err(e) = self.cursor.skip_body() {
            self.done = true;
            return Some(Err(e));
        }
        Some(Ok((header.identity, header.query_line)))
    }
}

/// Lazy pass over fully parsed records; see [`DeltaStore::records`]
pub struct RecordIter<'a> {
    cursor: DeltaCursor,
    sequences: &'a PositionIndex,
    done: bool,
}

impl Iterator for RecordIter<'_> {
    type Item = Result<DeltaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.read_record(self.sequences) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                // structural errors abort the pass; no partial records
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
