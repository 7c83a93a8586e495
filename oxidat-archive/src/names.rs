//! Entry naming.
//!
//! Input files are named `<index>` or `<index>.<name>`. When any entry has a
//! name, packing writes a companion `<archive-stem>.h` file of
//! `#define <name> <index>` lines next to the archive; unpacking reads it
//! back to restore the names.

use oxidat_core::error::{DatError, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// First line of a generated name map.
pub const NAME_MAP_BANNER: &str = "// Auto-generated header file";

/// Extension of the companion name-map file.
pub const NAME_MAP_EXTENSION: &str = "h";

/// Index and optional name parsed from an input file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFileName {
    /// Decimal prefix.
    pub index: u32,
    /// Text after the `.` that follows the digits, if any.
    pub name: Option<String>,
}

/// Parse `<digits>[.<name>]`; anything not starting with a digit is `None`.
///
/// ```rust
/// use oxidat_archive::names::parse_entry_file_name;
///
/// let parsed = parse_entry_file_name("12.TITLE_SCREEN").unwrap();
/// assert_eq!(parsed.index, 12);
/// assert_eq!(parsed.name.as_deref(), Some("TITLE_SCREEN"));
/// assert!(parse_entry_file_name("readme.txt").is_none());
/// ```
pub fn parse_entry_file_name(file_name: &str) -> Option<EntryFileName> {
    let digits = file_name
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let index = file_name[..digits].parse::<u32>().ok()?;
    let name = file_name[digits..]
        .strip_prefix('.')
        .filter(|rest| !rest.is_empty())
        .map(str::to_owned);
    Some(EntryFileName { index, name })
}

/// Parse one `#define NAME ID` line. Text after the id's digits is ignored.
pub fn parse_define_line(line: &str) -> Option<(String, u32)> {
    let (_, rest) = line.split_once("#define")?;
    let mut fields = rest.split_whitespace();
    let name = fields.next()?;
    let id_field = fields.next()?;
    let digits = id_field.bytes().take_while(|b| b.is_ascii_digit()).count();
    let id = id_field[..digits].parse::<u32>().ok()?;
    Some((name.to_owned(), id))
}

/// Path of the name-map file that belongs to `archive_path`.
pub fn name_map_path(archive_path: &Path) -> PathBuf {
    archive_path.with_extension(NAME_MAP_EXTENSION)
}

/// Mapping from entry index to symbolic name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    names: BTreeMap<u32, String>,
}

impl NameMap {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse name-map text. Lines that are not defines are ignored; a later
    /// define for the same id replaces an earlier one.
    pub fn parse(text: &str) -> Self {
        let mut map = Self::new();
        for (name, id) in text.lines().filter_map(parse_define_line) {
            map.insert(id, name);
        }
        map
    }

    /// Load the map at `path`; `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(Self::parse(&String::from_utf8_lossy(&bytes)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DatError::file_io(path, e)),
        }
    }

    /// Set the name for `id`.
    pub fn insert(&mut self, id: u32, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// Name for `id`.
    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of named ids.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no id has a name.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Output file name for entry `index`: `<index>` or `<index>.<name>`.
    pub fn file_name(&self, index: usize) -> String {
        match u32::try_from(index).ok().and_then(|id| self.get(id)) {
            Some(name) => format!("{}.{}", index, name),
            None => index.to_string(),
        }
    }

    /// Render the map as header text, sorted by id.
    pub fn to_header_text(&self) -> String {
        let mut out = String::new();
        out.push_str(NAME_MAP_BANNER);
        out.push_str("\n\n");
        for (id, name) in &self.names {
            let _ = writeln!(out, "#define {} {}", name, id);
        }
        out
    }

    /// Write the header text to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_header_text()).map_err(|e| DatError::file_io(path, e))
    }
}

impl FromIterator<(u32, String)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
