//! CM encoder.
//!
//! Greedy LZ parse over a 4096-byte window. At each position the match
//! finder walks candidates from nearest to farthest, keeps only strictly
//! longer matches (so ties go to the nearest distance) and stops early at
//! the 18-byte maximum. Matches shorter than 3 bytes become literals.

use crate::header::CmHeader;
use crate::token::CmToken;
use crate::{HEADER_SIZE, MAX_MATCH, MIN_MATCH, WINDOW_SIZE};
use oxidat_core::bitstream::FlagWriter;
use oxidat_core::bytes::to_u32;
use oxidat_core::error::Result;

/// Longest-match search over one input buffer.
#[derive(Debug, Clone, Copy)]
pub struct MatchFinder<'a> {
    data: &'a [u8],
}

impl<'a> MatchFinder<'a> {
    /// Create a match finder over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Find the best match at `pos` as `(length, distance)`.
    pub fn find(&self, pos: usize) -> Option<(usize, usize)> {
        let data = self.data;
        let max_len = MAX_MATCH.min(data.len().saturating_sub(pos));
        if max_len < MIN_MATCH {
            return None;
        }

        let window_start = pos.saturating_sub(WINDOW_SIZE);
        let first = data[pos];
        let mut best_len = 0;
        let mut best_dist = 0;

        for cand in (window_start..pos).rev() {
            if data[cand] != first {
                continue;
            }

            // Source may run into the lookahead (overlapping match).
            let mut len = 1;
            while len < max_len && data[cand + len] == data[pos + len] {
                len += 1;
            }

            if len >= MIN_MATCH && len > best_len {
                best_len = len;
                best_dist = pos - cand;
                if best_len == MAX_MATCH {
                    break;
                }
            }
        }

        (best_len >= MIN_MATCH).then_some((best_len, best_dist))
    }
}

/// Stateless CM encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmEncoder;

impl CmEncoder {
    /// Create an encoder.
    pub fn new() -> Self {
        Self
    }

    /// Parse `data` into literal and match tokens.
    pub fn tokenize(&self, data: &[u8]) -> Vec<CmToken> {
        let finder = MatchFinder::new(data);
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            match finder.find(pos) {
                Some((length, distance)) => {
                    tokens.push(CmToken::Match {
                        length: length as u16,
                        distance: distance as u16,
                    });
                    pos += length;
                }
                None => {
                    tokens.push(CmToken::Literal(data[pos]));
                    pos += 1;
                }
            }
        }

        tokens
    }

    /// Encode `data` into a complete CM payload.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tokens = self.tokenize(data);
        serialize(data.len(), &tokens)
    }
}

/// Serialize tokens into header + token region + flags region.
pub(crate) fn serialize(raw_length: usize, tokens: &[CmToken]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(raw_length);
    let mut flags = FlagWriter::with_capacity(tokens.len());

    for token in tokens {
        flags.push(token.is_match());
        token.write_to(&mut body);
    }

    let header = CmHeader {
        raw_length: to_u32(raw_length, "raw length")?,
        token_length: to_u32(body.len(), "token length")?,
    };
    let flags = flags.finish();

    let mut out = Vec::with_capacity(HEADER_SIZE + body.len() + flags.len());
    header.write_to(&mut out);
    out.extend_from_slice(&body);
    out.extend_from_slice(&flags);
    Ok(out)
}

/// Encode `data` into a CM payload.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    CmEncoder::new().encode(data)
}
