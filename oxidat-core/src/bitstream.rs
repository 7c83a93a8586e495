//! Flag bitstream for the CM token format.
//!
//! Every decoded item (literal or match) has one flag bit: `1` for a match,
//! `0` for a literal. Bits are packed LSB-first, eight per byte, and the last
//! partial byte is zero-padded in its unused high bits.
//!
//! # Example
//!
//! ```
//! use oxidat_core::bitstream::{FlagReader, FlagWriter};
//!
//! let mut writer = FlagWriter::new();
//! for bit in [false, true, true, false, false, false, false, false, true] {
//!     writer.push(bit);
//! }
//! assert_eq!(writer.len(), 9);
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b0000_0110, 0b0000_0001]);
//!
//! let mut reader = FlagReader::new(&bytes);
//! assert_eq!(reader.next_flag(), Some(false));
//! assert_eq!(reader.next_flag(), Some(true));
//! ```

/// Packs flag bits LSB-first.
#[derive(Debug, Default, Clone)]
pub struct FlagWriter {
    /// Completed bytes.
    bytes: Vec<u8>,
    /// Byte under construction.
    current: u8,
    /// Next bit position in `current` (0-7).
    bit_pos: u8,
    /// Total bits pushed.
    count: usize,
}

impl FlagWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `items` flags.
    pub fn with_capacity(items: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(items.div_ceil(8)),
            ..Self::default()
        }
    }

    /// Append one flag.
    #[inline]
    pub fn push(&mut self, bit: bool) {
        if bit {
            self.current |= 1 << self.bit_pos;
        }
        self.bit_pos += 1;
        self.count += 1;
        if self.bit_pos == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.bit_pos = 0;
        }
    }

    /// Number of flags pushed so far.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no flags have been pushed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Flush the partial byte and return the packed flags.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_pos != 0 {
            self.bytes.push(self.current);
        }
        self.bytes
    }
}

/// Reads flag bits LSB-first from a byte slice.
#[derive(Debug, Clone)]
pub struct FlagReader<'a> {
    data: &'a [u8],
    /// Bits consumed so far.
    bit_index: usize,
}

impl<'a> FlagReader<'a> {
    /// Create a reader over packed flags.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_index: 0 }
    }

    /// Read the next flag, or `None` once the region is exhausted.
    #[inline]
    pub fn next_flag(&mut self) -> Option<bool> {
        let byte = *self.data.get(self.bit_index >> 3)?;
        let bit = (byte >> (self.bit_index & 7)) & 1 == 1;
        self.bit_index += 1;
        Some(bit)
    }
}
