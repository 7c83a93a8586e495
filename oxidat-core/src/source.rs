//! Read-only archive bytes.
//!
//! An [`ArchiveSource`] holds a whole archive for the duration of one unpack.
//! With the `mmap` feature enabled, files are memory-mapped instead of read
//! into a buffer; either way the contents are exposed as `&[u8]`.
//!
//! # Example
//!
//! ```no_run
//! use oxidat_core::source::ArchiveSource;
//!
//! let source = ArchiveSource::open("data.dat")?;
//! println!("{} bytes", source.len());
//! # Ok::<(), oxidat_core::error::DatError>(())
//! ```
//!
//! # Safety
//!
//! Memory-mapped files must not be modified by another process while mapped.
//! Mappings are read-only.

use crate::error::{DatError, Result};
#[cfg(feature = "mmap")]
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

/// Archive contents, owned or mapped.
#[derive(Debug)]
pub enum ArchiveSource {
    /// Contents read into memory.
    Loaded(Vec<u8>),
    /// Read-only memory mapping of the file.
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
}

impl ArchiveSource {
    /// Open an archive file.
    ///
    /// Maps the file when the `mmap` feature is enabled and the file is
    /// non-empty; otherwise reads it fully.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DatError::file_io(path, e))?;
        Self::from_file(&file).map_err(|e| match e {
            DatError::Io(source) => DatError::file_io(path, source),
            other => other,
        })
    }

    /// Create a source from an open file.
    #[cfg(feature = "mmap")]
    pub fn from_file(file: &File) -> Result<Self> {
        if file.metadata()?.len() == 0 {
            return Ok(Self::Loaded(Vec::new()));
        }
        // SAFETY: the mapping is read-only; callers must not modify the file
        // while the source is alive.
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self::Mapped(mmap))
    }

    /// Create a source from an open file.
    #[cfg(not(feature = "mmap"))]
    pub fn from_file(file: &File) -> Result<Self> {
        use std::io::Read;

        let mut data = Vec::new();
        let mut reader = file;
        reader.read_to_end(&mut data)?;
        Ok(Self::Loaded(data))
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::Loaded(data)
    }

    /// Whether the source is memory-mapped.
    pub fn is_mapped(&self) -> bool {
        match self {
            Self::Loaded(_) => false,
            #[cfg(feature = "mmap")]
            Self::Mapped(_) => true,
        }
    }

    /// The archive bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Loaded(data) => data.as_slice(),
            #[cfg(feature = "mmap")]
            Self::Mapped(mmap) => &mmap[..],
        }
    }
}

impl Deref for ArchiveSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for ArchiveSource {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
