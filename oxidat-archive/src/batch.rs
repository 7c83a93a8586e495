//! Directory-level pack and unpack.
//!
//! Packing turns a directory of numbered files into one archive, or a
//! directory of such directories into one archive each. Unpacking turns
//! every archive in a directory into a directory of numbered files. A
//! failure stays with the directory, archive or entry it belongs to; the
//! rest of the batch carries on and the outcome lands in a
//! [`BatchSummary`].

use crate::names::{NameMap, name_map_path, parse_entry_file_name};
use crate::reader::{DatReader, EntryLocation, Extraction, Outcome, ReadOptions};
use crate::report::{BatchSummary, EntrySummary, Event, Reporter};
use crate::writer::{DatWriter, encode_entries};
use oxidat_core::error::{DatError, Result};
use oxidat_core::source::ArchiveSource;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Default archive file extension.
pub const DEFAULT_EXTENSION: &str = "dat";

/// Packing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Extension of produced archives, without the dot.
    pub extension: String,
    /// Write a `<stem>.h` name map when entries carry names.
    pub write_name_map: bool,
    /// Encode entries in parallel (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            write_name_map: true,
            parallel: false,
        }
    }
}

impl PackOptions {
    /// Set the archive extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enable or disable name-map output.
    pub fn with_name_map(mut self, enabled: bool) -> Self {
        self.write_name_map = enabled;
        self
    }

    /// Enable or disable parallel encoding.
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

/// Unpacking configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Extension of archives to pick up, without the dot.
    pub extension: String,
    /// Reader options.
    pub read: ReadOptions,
    /// Name output files from a `<stem>.h` name map when present.
    pub use_name_map: bool,
    /// Decode entries in parallel (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            read: ReadOptions::default(),
            use_name_map: true,
            parallel: false,
        }
    }
}

impl UnpackOptions {
    /// Set the archive extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the reader options.
    pub fn with_read_options(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }

    /// Enable or disable name-map lookup.
    pub fn with_name_map(mut self, enabled: bool) -> Self {
        self.use_name_map = enabled;
        self
    }

    /// Enable or disable parallel decoding.
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

/// One numbered input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Entry index from the numeric prefix.
    pub index: u32,
    /// Name from the `.<name>` suffix.
    pub name: Option<String>,
    /// Path of the file.
    pub path: PathBuf,
}

/// Directory contents sorted by file name.
fn sorted_dir(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| DatError::file_io(dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| DatError::file_io(dir, e))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Numbered files of `dir`, sorted by index and checked to be exactly
/// `0..N-1`. Files without a numeric prefix are reported and left out.
pub fn collect_entries<R: Reporter>(dir: &Path, reporter: &mut R) -> Result<Vec<SourceEntry>> {
    let mut entries = Vec::new();
    for item in sorted_dir(dir)? {
        let path = item.path();
        if !path.is_file() {
            continue;
        }
        let parsed = item.file_name().to_str().and_then(parse_entry_file_name);
        match parsed {
            Some(parsed) => entries.push(SourceEntry {
                index: parsed.index,
                name: parsed.name,
                path,
            }),
            None => reporter.report(Event::FileIgnored { path }),
        }
    }

    if entries.is_empty() {
        return Err(DatError::NoEntries {
            directory: dir.to_path_buf(),
        });
    }

    entries.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));
    for (expected, entry) in (0u32..).zip(&entries) {
        if entry.index != expected {
            return Err(DatError::index_gap(expected, entry.index));
        }
    }
    Ok(entries)
}

/// Create `path` and fill it with `write`; a failed write leaves no file.
fn write_or_remove<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    let file = File::create(path).map_err(|e| DatError::file_io(path, e))?;
    write(file).inspect_err(|_| {
        let _ = fs::remove_file(path);
    })
}

/// Remove a leftover file from an earlier run.
fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(DatError::file_io(path, e)),
        _ => Ok(()),
    }
}

/// Pack the numbered files of `dir` into `archive_path`.
///
/// Every input is read and validated before the archive file is created.
pub fn pack_directory<R: Reporter>(
    dir: &Path,
    archive_path: &Path,
    options: &PackOptions,
    reporter: &mut R,
) -> Result<EntrySummary> {
    let entries = collect_entries(dir, reporter)?;
    let raw = entries
        .iter()
        .map(|e| fs::read(&e.path).map_err(|err| DatError::file_io(&e.path, err)))
        .collect::<Result<Vec<_>>>()?;
    let payloads = encode_entries(&raw, options.parallel)?;

    reporter.report(Event::ArchiveStarted {
        archive: archive_path.to_path_buf(),
        entries: entries.len(),
    });

    write_or_remove(archive_path, |file| {
        let mut writer = DatWriter::new(BufWriter::new(file), entries.len())?;
        for ((entry, data), payload) in entries.iter().zip(&raw).zip(&payloads) {
            writer.add_payload(payload)?;
            reporter.report(Event::EntryPacked {
                index: entry.index as usize,
                source: entry.path.clone(),
                raw_len: data.len(),
                stored_len: payload.len(),
            });
        }
        writer.finish()?;
        Ok(())
    })?;

    if options.write_name_map {
        let names: NameMap = entries
            .iter()
            .filter_map(|e| e.name.clone().map(|name| (e.index, name)))
            .collect();
        let path = name_map_path(archive_path);
        if names.is_empty() {
            remove_if_exists(&path)?;
        } else {
            names.write(&path)?;
            reporter.report(Event::NameMapWritten {
                path,
                names: names.len(),
            });
        }
    }

    let summary = EntrySummary {
        ok: entries.len(),
        ..EntrySummary::default()
    };
    reporter.report(Event::ArchiveFinished {
        archive: archive_path.to_path_buf(),
        summary,
    });
    Ok(summary)
}

/// Archive path for an input directory: `<output_dir>/<dir-name>.<ext>`.
fn archive_path_for(dir: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    let mut name = dir
        .file_name()
        .unwrap_or_else(|| OsStr::new("archive"))
        .to_os_string();
    name.push(".");
    name.push(extension);
    output_dir.join(name)
}

/// Pack `input_root` into `output_dir`.
///
/// If `input_root` has subdirectories, each becomes one archive named after
/// it; otherwise `input_root` itself becomes one archive.
pub fn pack_all<R: Reporter>(
    input_root: &Path,
    output_dir: &Path,
    options: &PackOptions,
    reporter: &mut R,
) -> Result<BatchSummary> {
    fs::create_dir_all(output_dir).map_err(|e| DatError::file_io(output_dir, e))?;

    let mut dirs: Vec<PathBuf> = sorted_dir(input_root)?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    if dirs.is_empty() {
        dirs.push(input_root.to_path_buf());
    }

    let mut summary = BatchSummary::default();
    for dir in &dirs {
        let archive_path = archive_path_for(dir, output_dir, &options.extension);
        match pack_directory(dir, &archive_path, options, reporter) {
            Ok(entries) => {
                summary.archives_ok += 1;
                summary.entries.merge(&entries);
            }
            Err(e) => {
                summary.archives_failed += 1;
                reporter.report(Event::ArchiveFailed {
                    path: dir.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(summary)
}

fn data_range(extraction: &Extraction) -> (usize, usize) {
    match extraction.location {
        Some(EntryLocation::Data { start, end, .. }) => (start, end),
        _ => (0, 0),
    }
}

/// Extract every entry of `archive_path` into `<output_dir>/<archive-stem>/`.
///
/// Fails only if the archive cannot be opened or its header is unusable;
/// entry problems are reported and counted.
pub fn unpack_archive<R: Reporter>(
    archive_path: &Path,
    output_dir: &Path,
    options: &UnpackOptions,
    reporter: &mut R,
) -> Result<EntrySummary> {
    let source = ArchiveSource::open(archive_path)?;
    let reader = DatReader::with_options(&source, options.read)?;
    reporter.report(Event::ArchiveStarted {
        archive: archive_path.to_path_buf(),
        entries: reader.entry_count(),
    });

    let names = if options.use_name_map {
        let path = name_map_path(archive_path);
        match NameMap::load(&path) {
            Ok(Some(names)) => names,
            Ok(None) => {
                reporter.report(Event::NameMapMissing { path });
                NameMap::new()
            }
            Err(e) => {
                reporter.report(Event::NameMapUnreadable {
                    path,
                    error: e.to_string(),
                });
                NameMap::new()
            }
        }
    } else {
        NameMap::new()
    };

    let stem = archive_path
        .file_stem()
        .unwrap_or_else(|| OsStr::new("archive"));
    let target_dir = output_dir.join(stem);
    fs::create_dir_all(&target_dir).map_err(|e| DatError::file_io(&target_dir, e))?;

    let mut summary = EntrySummary::default();
    for extraction in reader.extract_all_with(options.parallel) {
        let index = extraction.index();
        if extraction.clamped() {
            reporter.report(Event::EntryClamped {
                index,
                recorded_end: extraction.span.end,
                archive_len: reader.archive_len(),
            });
        }

        let (start, end) = data_range(&extraction);
        match extraction.outcome {
            Outcome::Skipped => {
                summary.skipped += 1;
                reporter.report(Event::EntrySkipped {
                    index,
                    start: extraction.span.start,
                    end: extraction.span.end,
                });
            }
            Outcome::Failed(e) => {
                summary.failed += 1;
                reporter.report(Event::EntryFailed {
                    index,
                    error: e.to_string(),
                });
            }
            Outcome::Extracted(data) => {
                let file_name = names.file_name(index);
                let path = target_dir.join(&file_name);
                match fs::write(&path, &data) {
                    Ok(()) => {
                        summary.ok += 1;
                        reporter.report(Event::EntryExtracted {
                            index,
                            file_name,
                            start,
                            end,
                            raw_len: data.len(),
                        });
                    }
                    Err(e) => {
                        summary.failed += 1;
                        reporter.report(Event::EntryFailed {
                            index,
                            error: DatError::file_io(&path, e).to_string(),
                        });
                    }
                }
            }
        }
    }

    reporter.report(Event::ArchiveFinished {
        archive: archive_path.to_path_buf(),
        summary,
    });
    Ok(summary)
}

/// Archives in `dir` with the given extension (ASCII case-insensitive).
pub fn find_archives(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    Ok(sorted_dir(dir)?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(OsStr::to_str)
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect())
}

/// Unpack every archive in `input_dir` into `output_dir`.
pub fn unpack_all<R: Reporter>(
    input_dir: &Path,
    output_dir: &Path,
    options: &UnpackOptions,
    reporter: &mut R,
) -> Result<BatchSummary> {
    let archives = find_archives(input_dir, &options.extension)?;
    fs::create_dir_all(output_dir).map_err(|e| DatError::file_io(output_dir, e))?;

    let mut summary = BatchSummary::default();
    for archive_path in &archives {
        match unpack_archive(archive_path, output_dir, options, reporter) {
            Ok(entries) => {
                summary.archives_ok += 1;
                summary.entries.merge(&entries);
            }
            Err(e) => {
                summary.archives_failed += 1;
                reporter.report(Event::ArchiveFailed {
                    path: archive_path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(summary)
}
