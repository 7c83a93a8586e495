//! DAT archive writer.
//!
//! The header region is reserved as zeros up front, entries are appended
//! with 32-byte padding, and [`DatWriter::finish`] seeks back once to fill
//! in the entry count, data start and index.

use crate::layout::{ALIGNMENT, DatHeader, MAX_ENTRY_COUNT, data_start};
use oxidat_core::bytes::{align_up, to_u32};
use oxidat_core::error::{DatError, Result};
use std::io::{Cursor, Seek, SeekFrom, Write};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const ZEROS: [u8; ALIGNMENT] = [0; ALIGNMENT];

/// Streaming writer for a DAT archive with a fixed entry count.
///
/// # Example
///
/// ```rust
/// use oxidat_archive::DatWriter;
/// use std::io::Cursor;
///
/// let mut writer = DatWriter::new(Cursor::new(Vec::new()), 2).unwrap();
/// writer.add_entry(b"AAAAAAAAAA").unwrap();
/// writer.add_entry(b"AAAABBBB").unwrap();
/// let archive = writer.finish().unwrap().into_inner();
/// assert_eq!(&archive[..4], &2u32.to_le_bytes());
/// ```
#[derive(Debug)]
pub struct DatWriter<W: Write + Seek> {
    writer: W,
    entry_count: usize,
    data_start_unit: u32,
    end_units: Vec<u32>,
    /// Bytes written so far, always a multiple of 32.
    offset: usize,
}

impl<W: Write + Seek> DatWriter<W> {
    /// Start an archive of `entry_count` entries at the current position of
    /// `writer`, which should be the start of an empty sink.
    pub fn new(mut writer: W, entry_count: usize) -> Result<Self> {
        if entry_count == 0 || entry_count > MAX_ENTRY_COUNT {
            return Err(DatError::InvalidEntryCount {
                count: entry_count,
                max: MAX_ENTRY_COUNT,
            });
        }

        let start = data_start(entry_count);
        let mut reserved = start;
        while reserved > 0 {
            let n = reserved.min(ALIGNMENT);
            writer.write_all(&ZEROS[..n])?;
            reserved -= n;
        }

        Ok(Self {
            writer,
            entry_count,
            data_start_unit: to_u32(start / ALIGNMENT, "data start")?,
            end_units: Vec::with_capacity(entry_count),
            offset: start,
        })
    }

    /// Encode `data` with the CM codec and append it as the next entry.
    pub fn add_entry(&mut self, data: &[u8]) -> Result<u32> {
        let payload = oxidat_cm::encode(data)?;
        self.add_payload(&payload)
    }

    /// Append an already-encoded payload as the next entry.
    ///
    /// Returns the entry's end offset in 32-byte units.
    pub fn add_payload(&mut self, payload: &[u8]) -> Result<u32> {
        if self.end_units.len() == self.entry_count {
            return Err(DatError::EntryCountMismatch {
                declared: self.entry_count,
                written: self.entry_count + 1,
            });
        }

        self.writer.write_all(payload)?;
        let end = align_up(self.offset + payload.len(), ALIGNMENT);
        let padding = end - self.offset - payload.len();
        self.writer.write_all(&ZEROS[..padding])?;
        self.offset = end;

        let end_unit = to_u32(end / ALIGNMENT, "entry end offset")?;
        self.end_units.push(end_unit);
        Ok(end_unit)
    }

    /// Number of entries appended so far.
    pub fn entries_written(&self) -> usize {
        self.end_units.len()
    }

    /// Bytes written so far, header region included.
    pub fn bytes_written(&self) -> usize {
        self.offset
    }

    /// Back-patch the header and return the sink, positioned at the end.
    pub fn finish(mut self) -> Result<W> {
        if self.end_units.len() != self.entry_count {
            return Err(DatError::EntryCountMismatch {
                declared: self.entry_count,
                written: self.end_units.len(),
            });
        }

        let header = DatHeader {
            data_start_unit: self.data_start_unit,
            end_units: std::mem::take(&mut self.end_units),
        };
        self.writer.seek(SeekFrom::Start(0))?;
        self.writer.write_all(&header.to_bytes())?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Encode every entry, preserving order.
///
/// With the `parallel` feature and `parallel == true`, entries are encoded on
/// the rayon pool; the result order still matches the input.
pub fn encode_entries<T>(entries: &[T], parallel: bool) -> Result<Vec<Vec<u8>>>
where
    T: AsRef<[u8]> + Sync,
{
    #[cfg(feature = "parallel")]
    if parallel {
        return entries
            .par_iter()
            .map(|data| oxidat_cm::encode(data.as_ref()))
            .collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    entries
        .iter()
        .map(|data| oxidat_cm::encode(data.as_ref()))
        .collect()
}

/// Build a complete archive in memory.
pub fn build<T>(entries: &[T]) -> Result<Vec<u8>>
where
    T: AsRef<[u8]> + Sync,
{
    build_with(entries, false)
}

/// Build a complete archive in memory, optionally encoding in parallel.
pub fn build_with<T>(entries: &[T], parallel: bool) -> Result<Vec<u8>>
where
    T: AsRef<[u8]> + Sync,
{
    let payloads = encode_entries(entries, parallel)?;
    let mut writer = DatWriter::new(Cursor::new(Vec::new()), payloads.len())?;
    for payload in &payloads {
        writer.add_payload(payload)?;
    }
    Ok(writer.finish()?.into_inner())
}
