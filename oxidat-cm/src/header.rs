//! CM payload header.
//!
//! ```text
//! offset 0:  magic "CM"      (2 bytes)
//! offset 2:  reserved        (2 bytes, 0)
//! offset 4:  raw_length      (u32 LE)
//! offset 8:  token_length    (u32 LE)
//! offset 12: tokens, then flags
//! ```

use crate::{CM_MAGIC, HEADER_SIZE};
use oxidat_core::bytes::{put_u32_le, read_u32_le};
use oxidat_core::error::FormatError;

/// Fixed 12-byte header of a CM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmHeader {
    /// Length of the original data.
    pub raw_length: u32,
    /// Length of the token region.
    pub token_length: u32,
}

impl CmHeader {
    /// Parse and validate the header at the start of `payload`.
    ///
    /// The reserved bytes are not checked.
    pub fn parse(payload: &[u8]) -> Result<Self, FormatError> {
        if payload.len() < HEADER_SIZE {
            return Err(FormatError::truncated(HEADER_SIZE, payload.len()));
        }
        if payload[0..2] != CM_MAGIC {
            return Err(FormatError::BadMagic {
                found: [payload[0], payload[1]],
            });
        }

        Ok(Self {
            raw_length: read_u32_le(payload, 4)?,
            token_length: read_u32_le(payload, 8)?,
        })
    }

    /// Offset where the flags region starts.
    pub fn flags_offset(&self) -> usize {
        HEADER_SIZE + self.token_length as usize
    }

    /// Append the serialized header.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&CM_MAGIC);
        out.extend_from_slice(&[0, 0]);
        put_u32_le(out, self.raw_length);
        put_u32_le(out, self.token_length);
    }
}
