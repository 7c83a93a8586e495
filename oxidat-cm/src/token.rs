//! CM token model.
//!
//! A decoded item is either a literal byte or a back-reference. Matches are
//! stored as a 16-bit little-endian record: the high 4 bits hold
//! `length - 3`, the low 12 bits hold `distance - 1`.

use crate::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

/// One decoded item of a CM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmToken {
    /// A literal byte.
    Literal(u8),
    /// A match reference to previously decoded data.
    Match {
        /// Number of bytes to copy (3..=18).
        length: u16,
        /// Distance back into the output (1..=4096).
        distance: u16,
    },
}

impl CmToken {
    /// Build a match token, or `None` if length or distance is out of range.
    pub fn new_match(length: usize, distance: usize) -> Option<Self> {
        if !(MIN_MATCH..=MAX_MATCH).contains(&length) || !(1..=WINDOW_SIZE).contains(&distance) {
            return None;
        }
        Some(Self::Match {
            length: length as u16,
            distance: distance as u16,
        })
    }

    /// Decode a 2-byte match record.
    ///
    /// Every 16-bit value maps to a valid length and distance.
    #[inline]
    pub fn from_record(record: u16) -> Self {
        Self::Match {
            length: (record >> 12) + MIN_MATCH as u16,
            distance: (record & 0x0FFF) + 1,
        }
    }

    /// Pack a match into its 2-byte record; `None` for literals.
    #[inline]
    pub fn record(&self) -> Option<u16> {
        match *self {
            Self::Literal(_) => None,
            Self::Match { length, distance } => Some(pack_record(length, distance)),
        }
    }

    /// Append this item's token-region bytes.
    #[inline]
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Literal(byte) => out.push(byte),
            Self::Match { length, distance } => {
                out.extend_from_slice(&pack_record(length, distance).to_le_bytes());
            }
        }
    }

    /// Whether this item is a match (flag bit 1).
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    /// Bytes this item expands to.
    #[inline]
    pub fn output_len(&self) -> usize {
        match *self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => length as usize,
        }
    }

    /// Bytes this item occupies in the token region.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { .. } => 2,
        }
    }
}

#[inline]
fn pack_record(length: u16, distance: u16) -> u16 {
    ((length - MIN_MATCH as u16) << 12) | ((distance - 1) & 0x0FFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let token = CmToken::new_match(18, 4096).unwrap();
        assert_eq!(token.record(), Some(0xFFFF));

        let token = CmToken::new_match(3, 1).unwrap();
        assert_eq!(token.record(), Some(0x0000));

        let token = CmToken::new_match(10, 1).unwrap();
        assert_eq!(token.record(), Some(0x7000));
    }

    #[test]
    fn test_from_record_bounds() {
        for record in [0x0000u16, 0x0FFF, 0xF000, 0xFFFF, 0x1234] {
            let token = CmToken::from_record(record);
            match token {
                CmToken::Match { length, distance } => {
                    assert!((3..=18).contains(&length));
                    assert!((1..=4096).contains(&distance));
                }
                CmToken::Literal(_) => panic!("record decoded as literal"),
            }
            assert_eq!(token.record(), Some(record));
        }
    }

    #[test]
    fn test_new_match_rejects_out_of_range() {
        assert!(CmToken::new_match(2, 1).is_none());
        assert!(CmToken::new_match(19, 1).is_none());
        assert!(CmToken::new_match(3, 0).is_none());
        assert!(CmToken::new_match(3, 4097).is_none());
    }

    #[test]
    fn test_literal_sizes() {
        let token = CmToken::Literal(b'x');
        assert!(!token.is_match());
        assert_eq!(token.record(), None);
        assert_eq!(token.output_len(), 1);
        assert_eq!(token.encoded_len(), 1);
    }
}
