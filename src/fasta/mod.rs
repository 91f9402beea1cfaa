//! # fasta
//!
//! Offset-aware access to a FASTA sequence corpus.
//!
//! [`PositionIndex`] wraps a FASTA file and makes every record retrievable
//! by the byte offset at which it began, either by seeking the backing file
//! or through an in-memory cache built in one streaming pass. Identifiers
//! are rewritten on read to carry that offset (see
//! [`tag_with_offset`]), which is how the delta-alignment side of the crate
//! names its query sequences.

mod index;
mod paired;
mod parser;
mod record;

pub use index::{PositionIndex, SequenceIter};
pub use paired::{strip_paired_suffix, Orientation, PairedReadId, PAIRED_SEPARATOR};
pub use parser::{read_record, RawRecord};
pub use record::{
    reverse_complement, split_offset_suffix, strip_offset_suffix, tag_with_offset, Alphabet,
    SequenceRecord,
};
