use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use memmap2::Mmap;
use tracing::debug;

use crate::error::{CorruptionError, RangeError, Result};
use crate::fasta::{split_offset_suffix, strip_paired_suffix};

use super::record::DeltaRecord;
use super::store::{DeltaStore, RecordIter};

/// Width of one spill-store entry in bytes
const ENTRY_SIZE: usize = 8;

/// Dense, array-like view over a delta-alignment stream.
///
/// Construction makes one linear pass over the stream, harvesting every
/// record's self-reported byte offset into an anonymous spill file as flat
/// fixed-width little-endian integers, with no header: the spill length
/// (`len * 8`) is the only metadata. The finished spill is mapped read-only
/// and never written again, so random access costs one entry read plus one
/// record parse, and holds no records in memory.
pub struct OffsetIndex {
    store: DeltaStore,
    spill: Option<Mmap>,
    count: usize,
}

impl OffsetIndex {
    /// Builds the index over `store` with a single offset-harvesting scan
    pub fn new(store: DeltaStore) -> Result<Self> {
        let mut writer = BufWriter::new(tempfile::tempfile()?);
        let mut count = 0usize;
        for position in store.positions()? {
            writer.write_u64::<LittleEndian>(position?)?;
            count += 1;
        }
        writer.flush()?;
        let file = writer.into_inner().map_err(std::io::IntoInnerError::into_error)?;

        // zero-length files cannot be mapped portably; an empty stream
        // simply has no spill
        let spill = if count == 0 {
            None
        } else {
            let spill = unsafe { Mmap::map(&file)? };
            if spill.len() % ENTRY_SIZE != 0 {
                return Err(CorruptionError::TruncatedIndex(spill.len()).into());
            }
            Some(spill)
        };
        debug!(records = count, "built delta offset index");
        Ok(Self {
            store,
            spill,
            count,
        })
    }

    /// Convenience constructor opening the delta stream and FASTA corpus by
    /// path
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(delta: P, fasta: Q) -> Result<Self> {
        Self::new(DeltaStore::from_paths(delta, fasta)?)
    }

    /// Total number of records in the indexed stream
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The record store this index delegates retrieval to
    #[must_use]
    pub fn store(&self) -> &DeltaStore {
        &self.store
    }

    /// Builds the sequence-corpus cache so per-record query resolution stops
    /// seeking the FASTA file
    pub fn cache_sequences(&mut self) -> Result<()> {
        self.store.sequences_mut().build_cache()
    }

    /// The byte offset stored for record `index`
    pub fn position_at(&self, index: usize) -> Result<u64> {
        if index >= self.count {
            return Err(RangeError::OutOfRange {
                index,
                count: self.count,
            }
            .into());
        }
        // the bounds check above makes the spill present by construction
        let spill = self.spill.as_ref().ok_or(CorruptionError::ShortIndexRead {
            index,
            len: 0,
        })?;
        let lbound = index * ENTRY_SIZE;
        let rbound = lbound + ENTRY_SIZE;
        if rbound > spill.len() {
            return Err(CorruptionError::ShortIndexRead {
                index,
                len: spill.len(),
            }
            .into());
        }
        Ok(LittleEndian::read_u64(&spill[lbound..rbound]))
    }

    /// Retrieves record `index`, delegating to
    /// [`DeltaStore::record_at`] on a fresh cursor
    pub fn get(&self, index: usize) -> Result<DeltaRecord> {
        let offset = self.position_at(index)?;
        self.store.record_at(offset)
    }

    /// Iterates every record in index order
    pub fn iter(&self) -> impl Iterator<Item = Result<DeltaRecord>> + '_ {
        (0..self.count).map(|index| self.get(index))
    }

    /// Groups records by query in one forward pass.
    ///
    /// Records sharing a query are contiguous by construction upstream, so
    /// each group is a contiguous run, not a hash-based group-by: a query id
    /// that reappears later starts a new group.
    pub fn query_groups(&self) -> Result<QueryGroupIter<'_>> {
        Ok(QueryGroupIter {
            records: self.store.records()?,
            lookahead: None,
            done: false,
        })
    }

    /// Collects the contiguous run of records belonging to `sequence_id`.
    ///
    /// The match is found by scanning query ids with their offset suffix and
    /// any paired-read suffix stripped; the returned run then shares the
    /// first match's exact full query id. Returns an empty vector when no
    /// record matches.
    pub fn records_for_query(&self, sequence_id: &str) -> Result<Vec<DeltaRecord>> {
        let mut matched = None;
        for entry in self.store.query_ids()? {
            let (offset, query_id) = entry?;
            let base = strip_paired_suffix(stripped_query_base(&query_id));
            if base == sequence_id {
                matched = Some((offset, query_id));
                break;
            }
        }
        let Some((offset, query_id)) = matched else {
            return Ok(Vec::new());
        };

        let mut run = Vec::new();
        for record in self.store.records_from(offset)? {
            let record = record?;
            if record.query().id() == query_id {
                run.push(record);
            } else {
                break;
            }
        }
        Ok(run)
    }
}

/// The query id without its offset suffix, tolerating ids that never carried
/// one
fn stripped_query_base(query_id: &str) -> &str {
    split_offset_suffix(query_id).map_or(query_id, |(base, _)| base)
}

/// Lazy contiguous grouping of records by query id; see
/// [`OffsetIndex::query_groups`]
pub struct QueryGroupIter<'a> {
    records: RecordIter<'a>,
    lookahead: Option<DeltaRecord>,
    done: bool,
}

impl Iterator for QueryGroupIter<'_> {
    type Item = Result<(String, Vec<DeltaRecord>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let first = match self.lookahead.take() {
            Some(record) => record,
            None => match self.records.next() {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            },
        };
        let query_id = first.query().id().to_string();
        let mut group = vec![first];
        loop {
            match self.records.next() {
                Some(Ok(record)) => {
                    if record.query().id() == query_id {
                        group.push(record);
                    } else {
                        self.lookahead = Some(record);
                        break;
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        Some(Ok((query_id, group)))
    }
}
