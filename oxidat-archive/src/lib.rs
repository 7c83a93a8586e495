//! # OxiDat Archive
//!
//! DAT archive container support for OxiDat.
//!
//! A DAT archive is a flat list of CM-encoded entries addressed by an index
//! of 32-byte unit offsets:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  batch   (directories <-> archives, naming) │
//! ├──────────────────────┬──────────────────────┤
//! │  writer              │  reader              │
//! ├──────────────────────┴──────────────────────┤
//! │  layout  (header, index, 32-byte spans)     │
//! ├─────────────────────────────────────────────┤
//! │  oxidat-cm  (per-entry codec)               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! - [`DatWriter`] streams entries to any `Write + Seek` sink and back-patches
//!   the header once all offsets are known.
//! - [`DatReader`] parses the header and extracts entries from a byte slice,
//!   tolerating invalid spans and (by default) clamping entries that run past
//!   the archive end.
//! - [`batch`] packs and unpacks whole directories, reporting through a
//!   [`Reporter`].
//!
//! ## Example
//!
//! ```rust
//! use oxidat_archive::{DatReader, build};
//!
//! let archive = build(&[b"AAAAAAAAAA".as_slice(), b"AAAABBBB".as_slice()]).unwrap();
//! let reader = DatReader::open(&archive).unwrap();
//! assert_eq!(reader.entry_count(), 2);
//! assert_eq!(reader.extract(1).unwrap().unwrap(), b"AAAABBBB");
//! ```
//!
//! ## Features
//!
//! - `parallel`: encode and decode entries on the rayon thread pool. Entry
//!   order in the archive and in results never depends on completion order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod layout;
pub mod names;
pub mod reader;
pub mod report;
pub mod writer;

pub use batch::{PackOptions, UnpackOptions, pack_all, pack_directory, unpack_all, unpack_archive};
pub use layout::{ALIGNMENT, DatHeader, EntrySpan, MAX_ENTRY_COUNT};
pub use names::NameMap;
pub use reader::{BoundsPolicy, DatReader, EntryInfo, EntryLocation, Extraction, Outcome, ReadOptions};
pub use report::{BatchSummary, CollectingReporter, EntrySummary, Event, NullReporter, Reporter};
pub use writer::{DatWriter, build, build_with};
