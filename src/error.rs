/// Custom Result type for deltaseq operations, wrapping the crate [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the deltaseq library, encompassing all possible error
/// cases that can occur while indexing or retrieving alignment and sequence data.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Structural errors in the delta or FASTA text grammar
    FormatError(#[from] FormatError),
    /// Disagreements between self-reported and actual stream state
    CorruptionError(#[from] CorruptionError),
    /// Indexed access outside the record range
    RangeError(#[from] RangeError),
    /// Misuse of the serial number registry
    RegistryError(#[from] RegistryError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors
    Utf8Error(#[from] std::str::Utf8Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Structural errors in the line-oriented delta grammar or the FASTA grammar.
///
/// Any of these aborts the current parse immediately: no partial records are
/// ever produced.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// The line opening a delta record does not start with the `@` sentinel
    #[error("expected '@' record marker at byte {offset}, found {found:?}")]
    MissingRecordMarker { offset: u64, found: String },

    /// The reference line of a delta record does not start with the `>` sentinel
    #[error("expected '>' reference line at byte {offset}, found {found:?}")]
    MissingReferenceLine { offset: u64, found: String },

    /// A FASTA record does not open with a `>` header line
    #[error("expected '>' sequence header at byte {0}")]
    MissingSequenceHeader(u64),

    /// An identifier that should carry an `@<offset>` suffix does not
    #[error("identifier {0:?} does not carry a numeric offset suffix")]
    InvalidOffsetSuffix(String),

    /// The coordinate line of a delta record does not hold exactly seven fields
    #[error("expected 7 alignment fields at byte {offset}, found {found}")]
    InvalidCoordinates { offset: u64, found: usize },

    /// A field that should be an integer is not
    #[error("invalid integer field {0:?}")]
    InvalidInteger(String),

    /// The stream ended in the middle of the record starting at the given byte
    #[error("record at byte {0} is truncated")]
    TruncatedRecord(u64),
}

/// Disagreements between what a stream reports about itself and what is
/// actually there. These are data corruption, never a transient condition.
#[derive(thiserror::Error, Debug)]
pub enum CorruptionError {
    /// A record's self-reported offset is not the position it was read from
    #[error("record at byte {actual} reports offset {reported}")]
    OffsetMismatch { reported: u64, actual: u64 },

    /// The offset spill store length is not a whole number of entries
    #[error("offset index length {0} is not a multiple of the entry width")]
    TruncatedIndex(usize),

    /// An offset entry extends past the end of the spill store
    #[error("offset index entry {index} extends past the end of the spill store ({len} bytes)")]
    ShortIndexRead { index: usize, len: usize },

    /// A resolved offset does not name any sequence record in the corpus
    #[error("no sequence record begins at byte offset {0}")]
    UnknownSequenceOffset(u64),
}

/// Indexed access outside the valid record range
#[derive(thiserror::Error, Debug)]
pub enum RangeError {
    /// Attempted to access a record index at or beyond the record count
    #[error("requested record index ({index}) is out of record range ({count})")]
    OutOfRange { index: usize, count: usize },
}

/// Misuse of the hard-failure lookup surface of the serial number registry
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    /// `insert_new` was called for an item that already holds an id
    #[error("item already has an assigned serial number")]
    AlreadyAssigned,

    /// `id_of` was called for an item that holds no id
    #[error("item has no assigned serial number")]
    NotAssigned,
}
