//! # delta
//!
//! Streaming and random access over a delta-alignment text stream.
//!
//! A delta stream is a line-oriented sequence of self-describing alignment
//! records: each opens with an `@<offset>` marker equal to its own byte
//! position, names a reference and a query sequence, and carries alignment
//! coordinates plus signed gap offsets. [`DeltaStore`] parses the stream
//! (resolving query sequences through a companion
//! [`PositionIndex`](crate::fasta::PositionIndex)); [`OffsetIndex`] turns
//! the whole stream into a dense, array-like collection backed by a spilled
//! offset table rather than in-memory records.

mod cursor;
mod index;
mod record;
mod store;

pub use index::{OffsetIndex, QueryGroupIter};
pub use record::{DeltaRecord, Direction};
pub use store::{DeltaStore, PositionIter, QueryIdIter, RecordIter};
