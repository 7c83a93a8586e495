//! CM decoder.
//!
//! Reads one flag per item; a clear flag takes one literal byte from the
//! token region, a set flag takes a 2-byte match record and copies from
//! already-produced output. Copies run byte by byte so a match may overlap
//! the bytes it is producing (distance 1 repeats the last byte).
//!
//! Every failure is a [`FormatError`]; nothing here indexes past a buffer.

use crate::HEADER_SIZE;
use crate::header::CmHeader;
use crate::token::CmToken;
use oxidat_core::bitstream::FlagReader;
use oxidat_core::bytes::read_u16_le;
use oxidat_core::error::FormatError;

/// Item-by-item reader over the token and flags regions of a payload.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    tokens: &'a [u8],
    pos: usize,
    flags: FlagReader<'a>,
}

impl<'a> TokenStream<'a> {
    /// Validate the header and split the payload into its regions.
    pub fn new(payload: &'a [u8]) -> Result<(CmHeader, Self), FormatError> {
        let header = CmHeader::parse(payload)?;
        let flags_base = header.flags_offset();
        if flags_base > payload.len() {
            return Err(FormatError::truncated(flags_base, payload.len()));
        }

        let stream = Self {
            tokens: &payload[HEADER_SIZE..flags_base],
            pos: 0,
            flags: FlagReader::new(&payload[flags_base..]),
        };
        Ok((header, stream))
    }

    /// Read the next item; `Ok(None)` once the flag bits run out.
    pub fn next_token(&mut self) -> Result<Option<CmToken>, FormatError> {
        let Some(is_match) = self.flags.next_flag() else {
            return Ok(None);
        };

        let needed = if is_match { 2 } else { 1 };
        let available = self.tokens.len() - self.pos;
        if available < needed {
            return Err(FormatError::TokensExhausted { needed, available });
        }

        let token = if is_match {
            CmToken::from_record(read_u16_le(self.tokens, self.pos)?)
        } else {
            CmToken::Literal(self.tokens[self.pos])
        };
        self.pos += needed;
        Ok(Some(token))
    }
}

/// CM decoder with an optional output cap.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmDecoder {
    max_output: Option<usize>,
}

impl CmDecoder {
    /// Decoder producing the full original length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop once `max_output` bytes are produced, if that is less than the
    /// original length.
    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = Some(max_output);
        self
    }

    /// Decode a payload.
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<u8>, FormatError> {
        self.run(payload, |_| {})
    }

    fn run<F>(&self, payload: &[u8], mut visit: F) -> Result<Vec<u8>, FormatError>
    where
        F: FnMut(&CmToken),
    {
        let (header, mut stream) = TokenStream::new(payload)?;
        let raw_length = header.raw_length as usize;
        let target = match self.max_output {
            Some(cap) if cap < raw_length => cap,
            _ => raw_length,
        };

        // A 2-byte record expands to at most 18 bytes; don't trust raw_length
        // for the allocation.
        let mut out = Vec::with_capacity(target.min(stream.tokens.len().saturating_mul(9)));
        while out.len() < target {
            let token = stream
                .next_token()?
                .ok_or(FormatError::FlagsExhausted {
                    produced: out.len(),
                    target,
                })?;
            visit(&token);

            match token {
                CmToken::Literal(byte) => out.push(byte),
                CmToken::Match { length, distance } => {
                    let distance = distance as usize;
                    if distance > out.len() {
                        return Err(FormatError::bad_distance(distance, out.len()));
                    }
                    let count = (length as usize).min(target - out.len());
                    let start = out.len() - distance;
                    for i in start..start + count {
                        let byte = out[i];
                        out.push(byte);
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Decode a CM payload to its full original length.
pub fn decode(payload: &[u8]) -> Result<Vec<u8>, FormatError> {
    CmDecoder::new().decode(payload)
}

/// Decode a CM payload, producing at most `max_output` bytes when given.
pub fn decode_with_limit(payload: &[u8], max_output: Option<usize>) -> Result<Vec<u8>, FormatError> {
    let decoder = match max_output {
        Some(cap) => CmDecoder::new().with_max_output(cap),
        None => CmDecoder::new(),
    };
    decoder.decode(payload)
}

/// The items a payload decodes through, validated by a full decode.
pub fn tokens(payload: &[u8]) -> Result<Vec<CmToken>, FormatError> {
    let mut items = Vec::new();
    CmDecoder::new().run(payload, |token| items.push(*token))?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a payload by hand: header, tokens, flags.
    fn payload(raw_length: u32, token_bytes: &[u8], flags: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        CmHeader {
            raw_length,
            token_length: token_bytes.len() as u32,
        }
        .write_to(&mut out);
        out.extend_from_slice(token_bytes);
        out.extend_from_slice(flags);
        out
    }

    #[test]
    fn test_decode_literals() {
        let data = payload(3, b"abc", &[0b000]);
        assert_eq!(decode(&data).unwrap(), b"abc");
    }

    #[test]
    fn test_decode_overlapping_match() {
        // 'A' then match(len 18, dist 1)
        let data = payload(19, &[b'A', 0x00, 0xF0], &[0b10]);
        assert_eq!(decode(&data).unwrap(), vec![b'A'; 19]);
    }

    #[test]
    fn test_decode_pattern_overlap() {
        // "AB" then match(len 6, dist 2) -> "ABABABAB"
        let record: u16 = (3 << 12) | 1;
        let mut tokens = b"AB".to_vec();
        tokens.extend_from_slice(&record.to_le_bytes());
        let data = payload(8, &tokens, &[0b100]);
        assert_eq!(decode(&data).unwrap(), b"ABABABAB");
    }

    #[test]
    fn test_decode_bad_distance() {
        // 'A' then match(len 3, dist 2): only 1 byte produced
        let data = payload(4, &[b'A', 0x01, 0x00], &[0b10]);
        assert_eq!(
            decode(&data),
            Err(FormatError::BadDistance {
                distance: 2,
                produced: 1
            })
        );
    }

    #[test]
    fn test_decode_match_first_is_bad_distance() {
        let data = payload(3, &[0x00, 0x00], &[0b1]);
        assert_eq!(
            decode(&data),
            Err(FormatError::BadDistance {
                distance: 1,
                produced: 0
            })
        );
    }

    #[test]
    fn test_decode_flags_exhausted() {
        // 9 literals declared, but only one flag byte present
        let data = payload(9, b"abcdefghi", &[0x00]);
        assert_eq!(
            decode(&data),
            Err(FormatError::FlagsExhausted {
                produced: 8,
                target: 9
            })
        );
    }

    #[test]
    fn test_decode_tokens_exhausted() {
        // Flag says literal, but the token region is empty.
        let data = payload(1, b"", &[0x00]);
        assert_eq!(
            decode(&data),
            Err(FormatError::TokensExhausted {
                needed: 1,
                available: 0
            })
        );

        // Match needs two bytes, one left.
        let data = payload(4, b"AB", &[0b10]);
        assert_eq!(
            decode(&data),
            Err(FormatError::TokensExhausted {
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_decode_token_length_past_end() {
        let mut data = payload(1, b"A", &[0]);
        data[8] = 200; // token_length
        assert_eq!(
            decode(&data),
            Err(FormatError::Truncated {
                needed: 212,
                available: data.len()
            })
        );
    }

    #[test]
    fn test_decode_with_limit() {
        let data = payload(19, &[b'A', 0x00, 0xF0], &[0b10]);
        assert_eq!(decode_with_limit(&data, Some(5)).unwrap(), vec![b'A'; 5]);
        assert_eq!(decode_with_limit(&data, Some(100)).unwrap(), vec![b'A'; 19]);
        assert_eq!(decode_with_limit(&data, None).unwrap(), vec![b'A'; 19]);
        assert!(decode_with_limit(&data, Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_limit_skips_unneeded_items() {
        // Cap is reached before the broken match is read.
        let data = payload(10, &[b'x', b'y', 0x05, 0x00], &[0b100]);
        assert_eq!(decode_with_limit(&data, Some(2)).unwrap(), b"xy");
        assert!(decode(&data).is_err());
    }

    #[test]
    fn test_tokens_listing() {
        let data = payload(19, &[b'A', 0x00, 0xF0], &[0b10]);
        assert_eq!(
            tokens(&data).unwrap(),
            vec![
                CmToken::Literal(b'A'),
                CmToken::Match {
                    length: 18,
                    distance: 1
                }
            ]
        );
    }

    #[test]
    fn test_stream_runs_out() {
        let data = payload(3, b"abc", &[0]);
        let (header, mut stream) = TokenStream::new(&data).unwrap();
        assert_eq!(header.raw_length, 3);
        for _ in 0..3 {
            assert!(stream.next_token().unwrap().is_some());
        }

        // Padding bits past the last item still read as literals.
        assert!(matches!(
            stream.next_token(),
            Err(FormatError::TokensExhausted { .. })
        ));
    }
}
