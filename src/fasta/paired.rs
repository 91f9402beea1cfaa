//! Paired-read identifier grammar.
//!
//! Mates of a paired read share a base identifier and are told apart by a
//! `/1` (forward) or `/2` (reverse) suffix, optionally followed by a
//! `:<library>` tag: `frag_17/2:lib-A`. Identifiers that do not match the
//! grammar are ordinary unpaired reads, not errors.

/// Separator between a read identifier and its mate number
pub const PAIRED_SEPARATOR: char = '/';

/// Separator between the mate number and an optional library tag
const LIBRARY_SEPARATOR: char = ':';

/// Orientation of one mate of a paired read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    Reverse,
}

/// A decoded paired-read identifier, borrowing from the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedReadId<'a> {
    base: &'a str,
    orientation: Orientation,
    library: Option<&'a str>,
}

impl<'a> PairedReadId<'a> {
    /// Decodes an identifier against the paired-read grammar.
    ///
    /// Returns `None` when the identifier is not paired.
    #[must_use]
    pub fn parse(id: &'a str) -> Option<Self> {
        let at = id.rfind(PAIRED_SEPARATOR)?;
        let (base, tail) = (&id[..at], &id[at + 1..]);
        if base.is_empty() {
            return None;
        }
        let (mate, library) = match tail.split_once(LIBRARY_SEPARATOR) {
            Some((mate, lib)) if !lib.is_empty() => (mate, Some(lib)),
            Some((mate, _)) => (mate, None),
            None => (tail, None),
        };
        let orientation = match mate {
            "1" => Orientation::Forward,
            "2" => Orientation::Reverse,
            _ => return None,
        };
        Some(Self {
            base,
            orientation,
            library,
        })
    }

    /// The shared identifier of the pair, without mate or library suffix
    #[must_use]
    pub fn base(&self) -> &'a str {
        self.base
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Library tag, when the identifier carried one
    #[must_use]
    pub fn library(&self) -> Option<&'a str> {
        self.library
    }
}

/// Removes a paired-read suffix, returning the identifier unchanged when it
/// is not paired.
#[must_use]
pub fn strip_paired_suffix(id: &str) -> &str {
    PairedReadId::parse(id).map_or(id, |paired| paired.base)
}
