//! DAT archive reader.
//!
//! The reader borrows the whole archive and never copies it. Each entry is
//! located from the index, checked against the archive length, and decoded
//! on demand. Problems local to one entry surface as that entry's
//! [`Outcome`], so callers can keep going with the rest.

use crate::layout::{DatHeader, EntrySpan, SpanCheck};
use oxidat_cm::CmHeader;
use oxidat_core::error::{DatError, FormatError, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What to do with an entry whose recorded end lies past the archive end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Cut the entry at the archive end and keep going.
    #[default]
    Clamp,
    /// Fail the entry with [`FormatError::OutOfBounds`].
    Strict,
}

/// Reader configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Policy for entries that overrun the archive.
    pub bounds: BoundsPolicy,
}

impl ReadOptions {
    /// Default options (clamping).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bounds policy.
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    /// Shorthand for [`BoundsPolicy::Strict`].
    pub fn strict() -> Self {
        Self::new().with_bounds(BoundsPolicy::Strict)
    }
}

/// Where an entry's bytes live after bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLocation {
    /// Readable byte range `[start, end)`.
    Data {
        /// Start offset.
        start: usize,
        /// End offset, possibly cut to the archive length.
        end: usize,
        /// The recorded end was past the archive and got cut.
        clamped: bool,
    },
    /// Empty span, or one starting at or past the archive end.
    Invalid,
}

/// Result of extracting one entry.
#[derive(Debug)]
pub enum Outcome {
    /// Decoded bytes.
    Extracted(Vec<u8>),
    /// Invalid span, nothing to decode.
    Skipped,
    /// Out of bounds (strict policy) or a decode failure.
    Failed(DatError),
}

/// One entry's extraction, as produced by [`DatReader::extract_all`].
#[derive(Debug)]
pub struct Extraction {
    /// Recorded span from the index.
    pub span: EntrySpan,
    /// Location after bounds checks; `None` if locating failed.
    pub location: Option<EntryLocation>,
    /// What happened.
    pub outcome: Outcome,
}

impl Extraction {
    /// Entry index.
    pub fn index(&self) -> usize {
        self.span.index
    }

    /// Whether the entry was cut at the archive end.
    pub fn clamped(&self) -> bool {
        matches!(
            self.location,
            Some(EntryLocation::Data { clamped: true, .. })
        )
    }
}

/// Per-entry facts available without decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// Recorded span.
    pub span: EntrySpan,
    /// Location after bounds checks, `None` if the strict policy rejected it.
    pub location: Option<EntryLocation>,
    /// CM header of the stored payload, when it parses.
    pub payload_header: Option<CmHeader>,
}

/// Reader over an in-memory (or memory-mapped) DAT archive.
///
/// # Example
///
/// ```rust
/// use oxidat_archive::{DatReader, build};
///
/// let archive = build(&[b"hello hello hello".as_slice()]).unwrap();
/// let reader = DatReader::open(&archive).unwrap();
/// assert_eq!(reader.entry_count(), 1);
/// assert_eq!(reader.extract(0).unwrap().unwrap(), b"hello hello hello");
/// ```
#[derive(Debug, Clone)]
pub struct DatReader<'a> {
    data: &'a [u8],
    header: DatHeader,
    options: ReadOptions,
}

impl<'a> DatReader<'a> {
    /// Parse an archive with default options.
    pub fn open(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, ReadOptions::default())
    }

    /// Parse an archive with the given options.
    pub fn with_options(data: &'a [u8], options: ReadOptions) -> Result<Self> {
        let header = DatHeader::parse(data)?;
        Ok(Self {
            data,
            header,
            options,
        })
    }

    /// Parsed header.
    pub fn header(&self) -> &DatHeader {
        &self.header
    }

    /// Reader options.
    pub fn options(&self) -> ReadOptions {
        self.options
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.header.entry_count()
    }

    /// Archive length in bytes.
    pub fn archive_len(&self) -> usize {
        self.data.len()
    }

    /// Recorded span of entry `index`.
    pub fn span(&self, index: usize) -> Result<EntrySpan> {
        self.header
            .span(index)
            .ok_or(DatError::EntryOutOfRange {
                index,
                count: self.entry_count(),
            })
    }

    /// Locate entry `index`, applying the bounds policy.
    pub fn locate(&self, index: usize) -> Result<EntryLocation> {
        let span = self.span(index)?;
        self.locate_span(&span)
    }

    fn locate_span(&self, span: &EntrySpan) -> Result<EntryLocation> {
        let archive_len = self.data.len();
        // Inside/Overruns imply start < archive_len, so the casts are lossless.
        match span.check(archive_len) {
            SpanCheck::Invalid => Ok(EntryLocation::Invalid),
            SpanCheck::Inside => Ok(EntryLocation::Data {
                start: span.start as usize,
                end: span.end as usize,
                clamped: false,
            }),
            SpanCheck::Overruns => match self.options.bounds {
                BoundsPolicy::Clamp => Ok(EntryLocation::Data {
                    start: span.start as usize,
                    end: archive_len,
                    clamped: true,
                }),
                BoundsPolicy::Strict => Err(FormatError::OutOfBounds {
                    index: span.index,
                    end: usize::try_from(span.end).unwrap_or(usize::MAX),
                    archive_len,
                }
                .into()),
            },
        }
    }

    /// Stored payload of entry `index`; `None` for a skippable entry.
    pub fn payload(&self, index: usize) -> Result<Option<&'a [u8]>> {
        match self.locate(index)? {
            EntryLocation::Data { start, end, .. } => Ok(Some(&self.data[start..end])),
            EntryLocation::Invalid => Ok(None),
        }
    }

    /// Decode entry `index`; `None` for a skippable entry.
    pub fn extract(&self, index: usize) -> Result<Option<Vec<u8>>> {
        match self.payload(index)? {
            Some(payload) => Ok(Some(oxidat_cm::decode(payload)?)),
            None => Ok(None),
        }
    }

    /// Header facts for entry `index`, without decoding.
    pub fn info(&self, index: usize) -> Result<EntryInfo> {
        let span = self.span(index)?;
        let location = self.locate_span(&span).ok();
        let payload_header = match location {
            Some(EntryLocation::Data { start, end, .. }) => {
                CmHeader::parse(&self.data[start..end]).ok()
            }
            _ => None,
        };
        Ok(EntryInfo {
            span,
            location,
            payload_header,
        })
    }

    /// Header facts for every entry.
    pub fn entries(&self) -> Vec<EntryInfo> {
        (0..self.entry_count())
            .filter_map(|i| self.info(i).ok())
            .collect()
    }

    fn extract_span(&self, span: EntrySpan) -> Extraction {
        let location = match self.locate_span(&span) {
            Ok(location) => location,
            Err(e) => {
                return Extraction {
                    span,
                    location: None,
                    outcome: Outcome::Failed(e),
                };
            }
        };

        let outcome = match location {
            EntryLocation::Invalid => Outcome::Skipped,
            EntryLocation::Data { start, end, .. } => {
                match oxidat_cm::decode(&self.data[start..end]) {
                    Ok(bytes) => Outcome::Extracted(bytes),
                    Err(e) => Outcome::Failed(e.into()),
                }
            }
        };
        Extraction {
            span,
            location: Some(location),
            outcome,
        }
    }

    /// Extract every entry in index order; failures stay per entry.
    pub fn extract_all(&self) -> Vec<Extraction> {
        self.header
            .spans()
            .map(|span| self.extract_span(span))
            .collect()
    }

    /// [`extract_all`](Self::extract_all) with entries decoded on the rayon
    /// pool. Results are in index order.
    #[cfg(feature = "parallel")]
    pub fn extract_all_parallel(&self) -> Vec<Extraction> {
        let spans: Vec<EntrySpan> = self.header.spans().collect();
        spans
            .into_par_iter()
            .map(|span| self.extract_span(span))
            .collect()
    }

    /// Extract every entry, in parallel when asked and available.
    pub fn extract_all_with(&self, parallel: bool) -> Vec<Extraction> {
        #[cfg(feature = "parallel")]
        if parallel {
            return self.extract_all_parallel();
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        self.extract_all()
    }
}
