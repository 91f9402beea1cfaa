use std::sync::Arc;

use crate::fasta::SequenceRecord;

/// Orientation of the second sequence relative to the first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// One pairwise alignment from a delta stream.
///
/// Coordinates and error counters are carried verbatim from the stream,
/// except that a reversed second-sequence interval is normalized at
/// construction: `second_start <= second_end` always holds, with
/// [`direction`](Self::direction) flipped to [`Direction::Reverse`] when the
/// raw input had the pair the other way around.
///
/// The record's [`identity`](Self::identity) is its own byte offset in the
/// delta stream, which makes it a stable handle for random access. The query
/// sequence is shared with the cursor that resolved it, not owned.
#[derive(Debug, Clone)]
pub struct DeltaRecord {
    identity: u64,
    reference_id: String,
    query: Arc<SequenceRecord>,
    first_start: u64,
    first_end: u64,
    second_start: u64,
    second_end: u64,
    direction: Direction,
    errors: u64,
    similarity_errors: u64,
    non_alphas: u64,
    deltas: Vec<i64>,
}

/// Coordinate and counter fields exactly as they appear on the seven-integer
/// line, before interval normalization
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawCoordinates {
    pub first_start: u64,
    pub first_end: u64,
    pub second_start: u64,
    pub second_end: u64,
    pub errors: u64,
    pub similarity_errors: u64,
    pub non_alphas: u64,
}

impl DeltaRecord {
    pub(crate) fn assemble(
        identity: u64,
        reference_id: String,
        query: Arc<SequenceRecord>,
        coords: RawCoordinates,
        deltas: Vec<i64>,
    ) -> Self {
        let (second_start, second_end, direction) = if coords.second_end < coords.second_start {
            (coords.second_end, coords.second_start, Direction::Reverse)
        } else {
            (coords.second_start, coords.second_end, Direction::Forward)
        };
        Self {
            identity,
            reference_id,
            query,
            first_start: coords.first_start,
            first_end: coords.first_end,
            second_start,
            second_end,
            direction,
            errors: coords.errors,
            similarity_errors: coords.similarity_errors,
            non_alphas: coords.non_alphas,
            deltas,
        }
    }

    /// Byte offset of this record in its delta stream
    #[must_use]
    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Identifier of the reference sequence
    #[must_use]
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    /// The resolved query sequence
    #[must_use]
    pub fn query(&self) -> &Arc<SequenceRecord> {
        &self.query
    }

    #[must_use]
    pub fn first_start(&self) -> u64 {
        self.first_start
    }

    #[must_use]
    pub fn first_end(&self) -> u64 {
        self.first_end
    }

    #[must_use]
    pub fn second_start(&self) -> u64 {
        self.second_start
    }

    #[must_use]
    pub fn second_end(&self) -> u64 {
        self.second_end
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Alignment error count
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Similarity error count
    #[must_use]
    pub fn similarity_errors(&self) -> u64 {
        self.similarity_errors
    }

    /// Count of non-alphabet positions
    #[must_use]
    pub fn non_alphas(&self) -> u64 {
        self.non_alphas
    }

    /// Gap-insertion offsets, signed per the delta convention
    #[must_use]
    pub fn deltas(&self) -> &[i64] {
        &self.deltas
    }
}
