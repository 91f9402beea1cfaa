use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CorruptionError, Result};

use super::paired::{Orientation, PairedReadId};
use super::parser::{self, RawRecord};
use super::record::{reverse_complement, SequenceRecord};

/// Scale applied to the first-seen sequence length when sizing cache buckets
const BUCKET_SCALE: u64 = 1000;

/// Offset-aware reader over a FASTA corpus.
///
/// Every record a `PositionIndex` hands out knows the byte offset it began
/// at, and can be retrieved again through [`sequence_at`](Self::sequence_at)
/// without rescanning from the start. Random access works in two regimes:
/// a seek-and-parse per call against the backing file, or, after
/// [`build_cache`](Self::build_cache), a bucket lookup over an in-memory
/// table of every record.
///
/// Each streaming pass opens its own read cursor, so concurrent iterations
/// over one index do not disturb each other.
pub struct PositionIndex {
    path: PathBuf,
    normalize_reverse: bool,
    cache: Option<SequenceCache>,
}

impl PositionIndex {
    /// Opens an index over the FASTA file at `path`.
    ///
    /// The file is probed immediately so a missing corpus fails at
    /// construction rather than on first use.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        drop(File::open(&path)?);
        Ok(Self {
            path,
            normalize_reverse: false,
            cache: None,
        })
    }

    /// When enabled, any record whose original identifier decodes as the
    /// reverse mate of a paired read is replaced by its reverse complement
    /// before being returned, so callers always see a consistent orientation.
    #[must_use]
    pub fn normalize_reverse_reads(mut self, normalize: bool) -> Self {
        self.normalize_reverse = normalize;
        self
    }

    /// Streams every record in file order.
    ///
    /// The iterator owns a private read cursor; restarting means calling
    /// `records()` again.
    pub fn records(&self) -> Result<SequenceIter> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(SequenceIter {
            reader,
            pos: 0,
            normalize_reverse: self.normalize_reverse,
            done: false,
        })
    }

    /// Consumes one full streaming pass into an in-memory table keyed by
    /// offset, after which [`sequence_at`](Self::sequence_at) is a bucket
    /// lookup instead of a file seek. Idempotent: once built, later calls
    /// are no-ops.
    pub fn build_cache(&mut self) -> Result<()> {
        if self.cache.is_some() {
            return Ok(());
        }
        let mut width = 0;
        let mut first_len = 0;
        let mut mixed_lengths = false;
        let mut buckets: Vec<Vec<Arc<SequenceRecord>>> = Vec::new();
        let mut count = 0usize;
        for record in self.records()? {
            let record = record?;
            if count == 0 {
                first_len = record.len();
                width = (record.len() as u64).max(1) * BUCKET_SCALE;
            } else if !mixed_lengths && record.len() != first_len {
                // bucket width is derived from the first record; a mixed
                // corpus still looks up correctly but packs unevenly
                mixed_lengths = true;
                warn!(
                    first_len,
                    other_len = record.len(),
                    "sequence lengths differ; cache buckets sized from the first record"
                );
            }
            let slot = (record.offset() / width) as usize;
            if slot >= buckets.len() {
                buckets.resize_with(slot + 1, Vec::new);
            }
            let bucket = &mut buckets[slot];
            let at = bucket.partition_point(|r| r.offset() < record.offset());
            bucket.insert(at, Arc::new(record));
            count += 1;
        }
        debug!(
            records = count,
            buckets = buckets.len(),
            "cached sequence corpus for random access"
        );
        self.cache = Some(SequenceCache { width, buckets });
        Ok(())
    }

    /// Whether [`build_cache`](Self::build_cache) has run
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Retrieves the record beginning at the given byte offset.
    ///
    /// Cached: a bucket lookup, where an unknown offset is a corruption
    /// error. Uncached: a fresh cursor is seeked to the absolute offset and
    /// exactly one record is parsed from there, with the same identifier
    /// rewrite as a streaming pass.
    pub fn sequence_at(&self, offset: u64) -> Result<Arc<SequenceRecord>> {
        if let Some(cache) = &self.cache {
            return cache
                .lookup(offset)
                .ok_or_else(|| CorruptionError::UnknownSequenceOffset(offset).into());
        }
        let mut reader = BufReader::new(File::open(&self.path)?);
        reader.seek(SeekFrom::Start(offset))?;
        let mut pos = offset;
        let raw = parser::read_record(&mut reader, &mut pos)?
            .ok_or(CorruptionError::UnknownSequenceOffset(offset))?;
        Ok(Arc::new(finish_record(self.normalize_reverse, raw)))
    }
}

/// Cache of every record, bucketed by `offset / width` with each bucket kept
/// sorted by ascending offset
struct SequenceCache {
    width: u64,
    buckets: Vec<Vec<Arc<SequenceRecord>>>,
}

impl SequenceCache {
    fn lookup(&self, offset: u64) -> Option<Arc<SequenceRecord>> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = self.buckets.get((offset / self.width) as usize)?;
        let at = bucket
            .binary_search_by_key(&offset, |record| record.offset())
            .ok()?;
        Some(Arc::clone(&bucket[at]))
    }
}

/// Applies reverse-mate normalization and the identifier rewrite to a raw
/// parsed record
fn finish_record(normalize_reverse: bool, raw: RawRecord) -> SequenceRecord {
    let RawRecord {
        header,
        mut symbols,
        offset,
    } = raw;
    if normalize_reverse {
        if let Some(paired) = PairedReadId::parse(&header) {
            if paired.orientation() == Orientation::Reverse {
                symbols = reverse_complement(&symbols);
            }
        }
    }
    SequenceRecord::new(&header, symbols, offset)
}

/// Lazy streaming pass over a FASTA corpus; see [`PositionIndex::records`]
pub struct SequenceIter {
    reader: BufReader<File>,
    pos: u64,
    normalize_reverse: bool,
    done: bool,
}

impl Iterator for SequenceIter {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match parser::read_record(&mut self.reader, &mut self.pos) {
            Ok(Some(raw)) => Some(Ok(finish_record(self.normalize_reverse, raw))),
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

#[cfg(test)]
mod testing {
    use std::io::Write;

    use anyhow::Result;
    use tempfile::NamedTempFile;

    use super::*;

    fn fixture(contents: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    const CORPUS: &str = ">q1\nACGTACGTACGTACG\n>q2\nTTTTGGGGCCCCAAA\n";

    #[test]
    fn streaming_offsets_round_trip() -> Result<()> {
        let file = fixture(CORPUS)?;
        let index = PositionIndex::from_path(file.path())?;

        let records: Vec<_> = index.records()?.collect::<crate::Result<_>>()?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), "q1@0");
        assert_eq!(records[1].id(), "q2@20");

        for record in &records {
            let retrieved = index.sequence_at(record.offset())?;
            assert_eq!(retrieved.id(), record.id());
            assert_eq!(retrieved.symbols(), record.symbols());
        }
        Ok(())
    }

    #[test]
    fn cached_lookup_matches_streaming() -> Result<()> {
        // the cache must agree with seek-and-parse byte for byte
        let file = fixture(CORPUS)?;
        let mut index = PositionIndex::from_path(file.path())?;
        let direct = index.sequence_at(20)?;

        index.build_cache()?;
        assert!(index.is_cached());
        let cached = index.sequence_at(20)?;
        assert_eq!(cached.id(), direct.id());
        assert_eq!(cached.symbols(), direct.symbols());

        // idempotent
        index.build_cache()?;
        assert!(index.is_cached());
        Ok(())
    }

    #[test]
    fn cached_lookup_rejects_unknown_offsets() -> Result<()> {
        let file = fixture(CORPUS)?;
        let mut index = PositionIndex::from_path(file.path())?;
        index.build_cache()?;
        assert!(index.sequence_at(7).is_err());
        Ok(())
    }

    #[test]
    fn reverse_mates_are_normalized() -> Result<()> {
        let corpus = ">r1/1\nAACC\n>r1/2\nAACC\n";
        let file = fixture(corpus)?;

        let plain = PositionIndex::from_path(file.path())?;
        let verbatim: Vec<_> = plain.records()?.collect::<crate::Result<_>>()?;
        assert_eq!(verbatim[1].symbols(), b"AACC");

        let normalized = PositionIndex::from_path(file.path())?.normalize_reverse_reads(true);
        let records: Vec<_> = normalized.records()?.collect::<crate::Result<_>>()?;
        assert_eq!(records[0].symbols(), b"AACC");
        assert_eq!(records[1].symbols(), b"GGTT");
        assert_eq!(records[1].id(), "r1/2!@11");
        Ok(())
    }

    #[test]
    fn missing_corpus_fails_at_construction() {
        assert!(PositionIndex::from_path("/nonexistent/corpus.fa").is_err());
    }
}
