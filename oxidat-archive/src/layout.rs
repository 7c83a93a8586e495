//! DAT archive header and index layout.
//!
//! ```text
//! offset 0:  entry_count      (u32 LE)
//! offset 4:  data_start_unit  (u32 LE, byte offset / 32)
//! offset 8:  index[N]         (u32 LE each, entry end offset / 32)
//! <zero padding to 32>
//! <entry 0><pad to 32><entry 1><pad to 32>...
//! ```

use oxidat_core::bytes::{align_up, put_u32_le, read_u32_le, slice_at};
use oxidat_core::error::FormatError;

/// Granularity of every offset stored in the header.
pub const ALIGNMENT: usize = 32;

/// Largest entry count a reader accepts.
pub const MAX_ENTRY_COUNT: usize = 1000;

/// Size of the fixed `entry_count` + `data_start_unit` prefix.
pub const PREFIX_SIZE: usize = 8;

/// Smallest archive a reader will look at: the prefix plus one index word.
pub const MIN_ARCHIVE_SIZE: usize = PREFIX_SIZE + 4;

/// Size of the header region (prefix plus index) for `entry_count` entries.
pub const fn header_size(entry_count: usize) -> usize {
    PREFIX_SIZE + 4 * entry_count
}

/// Byte offset of the first entry for `entry_count` entries.
pub const fn data_start(entry_count: usize) -> usize {
    align_up(header_size(entry_count), ALIGNMENT)
}

/// Parsed archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatHeader {
    /// Data region start, in 32-byte units.
    pub data_start_unit: u32,
    /// End offset of each entry, in 32-byte units.
    pub end_units: Vec<u32>,
}

impl DatHeader {
    /// Parse the header and index from the start of an archive.
    pub fn parse(archive: &[u8]) -> Result<Self, FormatError> {
        if archive.len() < MIN_ARCHIVE_SIZE {
            return Err(FormatError::truncated(MIN_ARCHIVE_SIZE, archive.len()));
        }

        let entry_count = read_u32_le(archive, 0)? as usize;
        let data_start_unit = read_u32_le(archive, 4)?;
        if entry_count == 0 {
            return Err(FormatError::corrupt_header("entry count is zero"));
        }
        if entry_count > MAX_ENTRY_COUNT {
            return Err(FormatError::corrupt_header(format!(
                "entry count {} exceeds {}",
                entry_count, MAX_ENTRY_COUNT
            )));
        }

        let index = slice_at(archive, PREFIX_SIZE, 4 * entry_count)
            .map_err(|_| FormatError::truncated(header_size(entry_count), archive.len()))?;
        let end_units = index
            .chunks_exact(4)
            .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
            .collect();

        Ok(Self {
            data_start_unit,
            end_units,
        })
    }

    /// Number of entries in the index.
    pub fn entry_count(&self) -> usize {
        self.end_units.len()
    }

    /// Data region start in bytes.
    pub fn data_start(&self) -> u64 {
        u64::from(self.data_start_unit) * ALIGNMENT as u64
    }

    /// Byte span recorded for entry `index`, before any bounds checks.
    pub fn span(&self, index: usize) -> Option<EntrySpan> {
        let end_unit = *self.end_units.get(index)?;
        let start_unit = match index {
            0 => self.data_start_unit,
            _ => self.end_units[index - 1],
        };
        Some(EntrySpan {
            index,
            start: u64::from(start_unit) * ALIGNMENT as u64,
            end: u64::from(end_unit) * ALIGNMENT as u64,
        })
    }

    /// Every recorded span, in index order.
    pub fn spans(&self) -> impl Iterator<Item = EntrySpan> + '_ {
        (0..self.entry_count()).filter_map(|i| self.span(i))
    }

    /// Serialize the header region (prefix plus index, no padding).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(header_size(self.entry_count()));
        // The index length is bounded by the writer, never above MAX_ENTRY_COUNT.
        put_u32_le(&mut out, self.end_units.len() as u32);
        put_u32_le(&mut out, self.data_start_unit);
        for &unit in &self.end_units {
            put_u32_le(&mut out, unit);
        }
        out
    }
}

/// Byte range of one entry as recorded in the index.
///
/// Offsets are `u64` so that `unit * 32` never overflows; whether the range
/// is usable depends on the archive length (see [`EntrySpan::check`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySpan {
    /// Entry index.
    pub index: usize,
    /// Start offset in bytes.
    pub start: u64,
    /// End offset in bytes (exclusive).
    pub end: u64,
}

/// How a recorded span relates to the actual archive length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanCheck {
    /// Fully inside the archive.
    Inside,
    /// Starts inside but ends past the archive end.
    Overruns,
    /// Starts at or past the archive end, or is empty.
    Invalid,
}

impl EntrySpan {
    /// Recorded length in bytes (zero for inverted spans).
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Classify the span against an archive of `archive_len` bytes.
    pub fn check(&self, archive_len: usize) -> SpanCheck {
        let archive_len = archive_len as u64;
        if self.start >= archive_len || self.is_empty() {
            SpanCheck::Invalid
        } else if self.end > archive_len {
            SpanCheck::Overruns
        } else {
            SpanCheck::Inside
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(count: u32, start_unit: u32, ends: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        put_u32_le(&mut out, count);
        put_u32_le(&mut out, start_unit);
        for &e in ends {
            put_u32_le(&mut out, e);
        }
        out
    }

    #[test]
    fn test_data_start() {
        assert_eq!(header_size(1), 12);
        assert_eq!(data_start(1), 32);
        assert_eq!(data_start(6), 32);
        assert_eq!(data_start(7), 64);
        assert_eq!(data_start(1000), 4032);
    }

    #[test]
    fn test_parse_header() {
        let data = raw_header(2, 1, &[2, 4]);
        let header = DatHeader::parse(&data).unwrap();
        assert_eq!(header.entry_count(), 2);
        assert_eq!(header.data_start(), 32);
        assert_eq!(
            header.span(0),
            Some(EntrySpan {
                index: 0,
                start: 32,
                end: 64
            })
        );
        assert_eq!(header.span(1).unwrap().start, 64);
        assert_eq!(header.span(1).unwrap().end, 128);
        assert_eq!(header.span(2), None);
        assert_eq!(header.to_bytes(), data);
    }

    #[test]
    fn test_parse_rejects_short_archive() {
        assert_eq!(
            DatHeader::parse(&[1, 0, 0, 0, 1, 0, 0, 0]),
            Err(FormatError::truncated(12, 8))
        );
    }

    #[test]
    fn test_parse_rejects_bad_counts() {
        let zero = raw_header(0, 1, &[0]);
        assert!(matches!(
            DatHeader::parse(&zero),
            Err(FormatError::CorruptHeader { .. })
        ));

        let huge = raw_header(1001, 1, &[0]);
        assert!(matches!(
            DatHeader::parse(&huge),
            Err(FormatError::CorruptHeader { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_short_index() {
        // Claims 4 entries but only carries one index word.
        let data = raw_header(4, 1, &[2]);
        assert_eq!(
            DatHeader::parse(&data),
            Err(FormatError::truncated(24, 12))
        );
    }

    #[test]
    fn test_span_check() {
        let span = EntrySpan {
            index: 0,
            start: 32,
            end: 96,
        };
        assert_eq!(span.check(96), SpanCheck::Inside);
        assert_eq!(span.check(200), SpanCheck::Inside);
        assert_eq!(span.check(64), SpanCheck::Overruns);
        assert_eq!(span.check(32), SpanCheck::Invalid);

        let inverted = EntrySpan {
            index: 1,
            start: 96,
            end: 64,
        };
        assert!(inverted.is_empty());
        assert_eq!(inverted.len(), 0);
        assert_eq!(inverted.check(1024), SpanCheck::Invalid);
    }
}
