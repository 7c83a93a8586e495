//! Error types for OxiDat operations.
//!
//! Two layers of errors exist:
//!
//! - [`FormatError`]: malformed bytes inside an archive or a CM payload. These
//!   are local to one archive or one entry; batch callers report them and
//!   carry on with the next unit of work.
//! - [`DatError`]: everything an operation can fail with, including I/O and
//!   packing-time validation of the input directory.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed archive or CM payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Payload does not start with the "CM" magic.
    #[error("Invalid magic number: expected \"CM\", found {found:02x?}")]
    BadMagic {
        /// The two bytes found at offset 0.
        found: [u8; 2],
    },

    /// A fixed-size region extends past the end of the buffer.
    #[error("Truncated data: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to read the region.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// The flags region ran out before the target length was produced.
    #[error("Flag bits exhausted after producing {produced} of {target} bytes")]
    FlagsExhausted {
        /// Bytes produced so far.
        produced: usize,
        /// Bytes that were expected.
        target: usize,
    },

    /// A literal or match record needs more token bytes than remain.
    #[error("Token region exhausted: need {needed} bytes, {available} left")]
    TokensExhausted {
        /// Bytes the next item needs.
        needed: usize,
        /// Bytes left in the token region.
        available: usize,
    },

    /// A match points before the start of the output.
    #[error("Invalid back-reference distance: {distance} exceeds {produced} bytes produced")]
    BadDistance {
        /// Decoded match distance.
        distance: usize,
        /// Output length at the time of the match.
        produced: usize,
    },

    /// Archive header is implausible.
    #[error("Corrupt archive header: {message}")]
    CorruptHeader {
        /// Description of the problem.
        message: String,
    },

    /// Entry ends past the archive end (strict bounds policy only).
    #[error("Entry {index} ends at {end:#x}, past archive end {archive_len:#x}")]
    OutOfBounds {
        /// Entry index.
        index: usize,
        /// Computed end offset of the entry.
        end: usize,
        /// Archive length in bytes.
        archive_len: usize,
    },
}

impl FormatError {
    /// Create a truncated-data error.
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::Truncated { needed, available }
    }

    /// Create a corrupt header error.
    pub fn corrupt_header(message: impl Into<String>) -> Self {
        Self::CorruptHeader {
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn bad_distance(distance: usize, produced: usize) -> Self {
        Self::BadDistance { distance, produced }
    }
}

/// The main error type for OxiDat operations.
#[derive(Debug, Error)]
pub enum DatError {
    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// I/O error tied to a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    FileIo {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Malformed archive or payload bytes.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Input file indexes are not exactly 0..N-1.
    #[error("Entry indexes are not contiguous: expected {expected}, found {found}")]
    IndexGap {
        /// Index that should have come next.
        expected: u32,
        /// Index actually found.
        found: u32,
    },

    /// Input directory has no numbered files.
    #[error("No numbered entries found in {}", directory.display())]
    NoEntries {
        /// The directory that was scanned.
        directory: PathBuf,
    },

    /// Archive would hold an entry count the reader rejects.
    #[error("Invalid entry count {count}: must be 1..={max}")]
    InvalidEntryCount {
        /// Requested count.
        count: usize,
        /// Largest accepted count.
        max: usize,
    },

    /// Writer finished with a different number of entries than declared.
    #[error("Archive declared {declared} entries but {written} were written")]
    EntryCountMismatch {
        /// Count reserved in the header.
        declared: usize,
        /// Entries actually appended.
        written: usize,
    },

    /// Entry index past the end of the archive index.
    #[error("Entry {index} out of range (archive has {count} entries)")]
    EntryOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of entries.
        count: usize,
    },

    /// A size or offset does not fit the 32-bit on-disk field.
    #[error("{what} too large for a 32-bit field: {size}")]
    TooLarge {
        /// Which field overflowed.
        what: &'static str,
        /// The offending value.
        size: usize,
    },
}

/// Result type alias for OxiDat operations.
pub type Result<T> = std::result::Result<T, DatError>;

impl DatError {
    /// Attach a path to an I/O error.
    pub fn file_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Create an index gap error.
    pub fn index_gap(expected: u32, found: u32) -> Self {
        Self::IndexGap { expected, found }
    }

    /// Create a value-too-large error.
    pub fn too_large(what: &'static str, size: usize) -> Self {
        Self::TooLarge { what, size }
    }

    /// The format error inside, if this is one.
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            Self::Format(e) => Some(e),
            _ => None,
        }
    }
}
