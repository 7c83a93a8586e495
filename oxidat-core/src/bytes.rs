//! Little-endian field access over byte slices.
//!
//! All reads are bounds-checked and fail with [`FormatError::Truncated`]
//! instead of reading past the buffer.

use crate::error::{DatError, FormatError};

/// Round `value` up to the next multiple of `alignment`.
///
/// `alignment` must be non-zero.
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// Borrow `len` bytes at `offset`.
#[inline]
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8], FormatError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| FormatError::truncated(offset.saturating_add(len), data.len()))
}

/// Read a little-endian `u16` at `offset`.
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16, FormatError> {
    let b = slice_at(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Read a little-endian `u32` at `offset`.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32, FormatError> {
    let b = slice_at(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Append a little-endian `u32` to a buffer.
#[inline]
pub fn put_u32_le(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Convert a length or offset to its on-disk `u32` form.
pub fn to_u32(value: usize, what: &'static str) -> Result<u32, DatError> {
    u32::try_from(value).map_err(|_| DatError::too_large(what, value))
}
