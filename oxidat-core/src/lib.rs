//! # OxiDat Core
//!
//! Core components shared by the OxiDat crates.
//!
//! - [`error`]: Error types for the DAT container and the CM codec
//! - [`bytes`]: Bounds-checked little-endian field access and alignment helpers
//! - [`bitstream`]: LSB-first flag bit packing used by the CM token stream
//! - [`source`]: Archive bytes, loaded into memory or memory-mapped
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI (oxidat pack / unpack / list / test)            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container (oxidat-archive)                          │
//! │     header + end-offset index, 32-byte aligned entries  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec (oxidat-cm)                                   │
//! │     "CM" LZ tokens + flag bitstream                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     LE fields, flag bits, errors, archive source        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxidat_core::bitstream::{FlagReader, FlagWriter};
//! use oxidat_core::bytes::{align_up, read_u32_le};
//!
//! let mut flags = FlagWriter::new();
//! flags.push(true);
//! flags.push(false);
//! flags.push(true);
//! let packed = flags.finish();
//! assert_eq!(packed, vec![0b0000_0101]);
//!
//! let mut reader = FlagReader::new(&packed);
//! assert_eq!(reader.next_flag(), Some(true));
//!
//! assert_eq!(read_u32_le(&[0x01, 0, 0, 0], 0).unwrap(), 1);
//! assert_eq!(align_up(33, 32), 64);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod bytes;
pub mod error;
pub mod source;

// Re-exports for convenience
pub use bitstream::{FlagReader, FlagWriter};
pub use error::{DatError, FormatError, Result};
pub use source::ArchiveSource;
