//! # OxiDat CM
//!
//! Pure Rust implementation of the "CM" LZ codec used inside DAT archive
//! entries.
//!
//! The format is an LZSS variant with fixed parameters:
//!
//! - **Window**: matches reach back at most 4096 bytes
//! - **Match length**: 3 to 18 bytes (4 bits, stored as `length - 3`)
//! - **Distance**: 1 to 4096 (12 bits, stored as `distance - 1`)
//! - **Flags**: one bit per item after the token region, LSB-first
//!
//! ```text
//! offset 0:  "CM" + 2 reserved bytes
//! offset 4:  raw_length   (u32 LE)
//! offset 8:  token_length (u32 LE)
//! offset 12: tokens       (literal = 1 byte, match = 2 bytes LE)
//! then:      flags        (ceil(items / 8) bytes)
//! ```
//!
//! The encoder is deterministic: the same input always yields the same
//! payload.
//!
//! ## Example
//!
//! ```rust
//! use oxidat_cm::{decode, encode};
//!
//! let original = b"TOBEORNOTTOBEORTOBEORNOT";
//! let payload = encode(original).unwrap();
//! assert_eq!(&payload[..2], b"CM");
//!
//! let decoded = decode(&payload).unwrap();
//! assert_eq!(decoded, original);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod decode;
pub mod encode;
pub mod header;
pub mod token;

pub use decode::{CmDecoder, TokenStream, decode, decode_with_limit, tokens};
pub use encode::{CmEncoder, MatchFinder, encode};
pub use header::CmHeader;
pub use token::CmToken;

/// Payload magic bytes.
pub const CM_MAGIC: [u8; 2] = *b"CM";

/// Size of the fixed payload header.
pub const HEADER_SIZE: usize = 12;

/// Maximum backward distance of a match.
pub const WINDOW_SIZE: usize = 4096;

/// Shortest match worth encoding.
pub const MIN_MATCH: usize = 3;

/// Longest match a record can hold.
pub const MAX_MATCH: usize = 18;
