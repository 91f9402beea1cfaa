//! # deltaseq
//!
//! Out-of-core indexing and persistence for a whole-genome
//! pairwise-alignment pipeline.
//!
//! An aligner emits a line-oriented *delta* stream of alignment records
//! alongside a FASTA query corpus; both can exceed available memory by
//! orders of magnitude. This crate lets them be treated as dense, randomly
//! addressable collections anyway:
//!
//! - [`fasta::PositionIndex`] reads a FASTA corpus and retrieves any record
//!   by the byte offset at which it began, streaming or cached.
//! - [`delta::DeltaStore`] parses the delta stream, resolving each record's
//!   query sequence through the corpus index.
//! - [`delta::OffsetIndex`] harvests every record offset into a spilled
//!   binary table in one pass, then serves `index -> record` random access
//!   without holding records in memory.
//! - [`BucketSorter`] orders huge `(id, value)` pair sets by bounded integer
//!   values in memory proportional to the value range.
//! - [`SerialRegistry`] compresses arbitrary ordered items into dense
//!   integer ids, in both directions.
//!
//! The alignment, scoring, and clustering stages of the pipeline are
//! collaborators, not part of this crate: everything here stores, indexes,
//! retrieves, and orders what those stages produce.

pub mod delta;
mod error;
pub mod fasta;
mod registry;
mod sorter;

pub use delta::{DeltaRecord, DeltaStore, Direction, OffsetIndex};
pub use error::{
    CorruptionError, Error, FormatError, RangeError, RegistryError, Result,
};
pub use fasta::{Alphabet, PositionIndex, SequenceRecord};
pub use registry::SerialRegistry;
pub use sorter::BucketSorter;

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

    #[test]
    fn end_to_end_index_over_delta_and_corpus() -> Result<()> {
        let fasta = fixture(">q1\nACGTACGTACGTACG\n>q2\nTTTTGGGGCCCCAAA\n")?;
        let mut delta_text = String::from("@0\n>ref1\nq1@0\n1 10 1 10 0 0 0\n*\n");
        while delta_text.len() < 50 {
            delta_text.push('\n');
        }
        delta_text.push_str("@50\n>ref2\nq2@20\n5 15 5 15 1 0 0\n*\n");
        let delta = fixture(&delta_text)?;

        let index = OffsetIndex::from_paths(delta.path(), fasta.path())?;
        assert_eq!(index.len(), 2);

        let first = index.get(0)?;
        assert_eq!(first.identity(), 0);
        assert_eq!(first.reference_id(), "ref1");
        assert_eq!(first.query().symbols(), b"ACGTACGTACGTACG");

        let second = index.get(1)?;
        assert_eq!(second.second_start(), 5);
        assert_eq!(second.query().id(), "q2@20");
        Ok(())
    }

    #[test]
    fn corpus_offsets_round_trip_through_random_access() -> Result<()> {
        let fasta = fixture(">a\nACGT\nGGCC\n>b\nTTAA\n>c/1\nCCCC\n")?;
        let corpus = PositionIndex::from_path(fasta.path())?;

        let records: Vec<SequenceRecord> = corpus.records()?.collect::<crate::Result<_>>()?;
        assert_eq!(records.len(), 3);
        for record in &records {
            let retrieved = corpus.sequence_at(record.offset())?;
            assert_eq!(retrieved.id(), record.id());
            assert_eq!(retrieved.symbols(), record.symbols());
        }
        // the paired id keeps its suffix split unambiguous
        assert_eq!(records[2].id(), "c/1!@21");
        Ok(())
    }

    #[test]
    fn sorter_and_registry_compose_for_coordinate_ordering() {
        // downstream stages sort alignment ids by coordinate after
        // compacting their keys through the registry
        let mut registry = SerialRegistry::new();
        let mut sorter = BucketSorter::new();
        for (key, coordinate) in [("aln-x", 300), ("aln-y", 12), ("aln-z", 300)] {
            let id = registry.intern(key);
            sorter.add(id as u64, coordinate);
        }
        let ordered: Vec<u64> = sorter.sorted_ids().collect();
        assert_eq!(ordered, vec![1, 0, 2]);
        assert_eq!(registry.get(1), Some(&"aln-y"));
    }
}
