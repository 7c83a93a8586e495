//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use oxidat_archive::{Event, Reporter};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Format a byte count for humans.
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", size, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Stored size as a percentage of raw size.
pub fn ratio_percent(stored: u64, raw: u64) -> f64 {
    if raw == 0 {
        0.0
    } else {
        stored as f64 * 100.0 / raw as f64
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reporter that drives one progress bar per archive and logs through
/// `tracing`, keeping log lines from tearing the bar.
pub struct ConsoleReporter {
    progress: bool,
    bar: ProgressBar,
}

impl ConsoleReporter {
    /// Reporter with progress bars on or off.
    pub fn new(progress: bool) -> Self {
        Self {
            progress,
            bar: ProgressBar::hidden(),
        }
    }

    fn log<F: FnOnce()>(&self, emit: F) {
        self.bar.suspend(emit);
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: Event) {
        match event {
            Event::ArchiveStarted { archive, entries } => {
                self.bar = create_progress_bar(entries as u64, self.progress);
                self.bar.set_message(display_name(&archive));
                self.log(|| info!("{}: {} entries", archive.display(), entries));
            }
            Event::EntryPacked {
                index,
                source,
                raw_len,
                stored_len,
            } => {
                self.log(|| {
                    debug!(
                        "  [{}] {} {} -> {}",
                        index,
                        display_name(&source),
                        raw_len,
                        stored_len
                    )
                });
                self.bar.inc(1);
            }
            Event::EntryExtracted {
                index,
                file_name,
                start,
                end,
                raw_len,
            } => {
                self.log(|| {
                    debug!(
                        "  [{}] {} {:#x}..{:#x} -> {} bytes",
                        index, file_name, start, end, raw_len
                    )
                });
                self.bar.inc(1);
            }
            Event::EntrySkipped { index, start, end } => {
                self.log(|| warn!("  [{}] skipped: invalid span {:#x}..{:#x}", index, start, end));
                self.bar.inc(1);
            }
            Event::EntryClamped {
                index,
                recorded_end,
                archive_len,
            } => {
                self.log(|| {
                    warn!(
                        "  [{}] ends at {:#x}, past archive end {:#x}; truncated",
                        index, recorded_end, archive_len
                    )
                });
            }
            Event::EntryFailed { index, error } => {
                self.log(|| error!("  [{}] failed: {}", index, error));
                self.bar.inc(1);
            }
            Event::FileIgnored { path } => {
                self.log(|| warn!("Ignoring {} (no numeric prefix)", path.display()));
            }
            Event::NameMapWritten { path, names } => {
                self.log(|| info!("Wrote {} names to {}", names, path.display()));
            }
            Event::NameMapMissing { path } => {
                self.log(|| warn!("No name map at {}; using plain indexes", path.display()));
            }
            Event::NameMapUnreadable { path, error } => {
                self.log(|| {
                    warn!(
                        "Cannot read name map {}: {}; using plain indexes",
                        path.display(),
                        error
                    )
                });
            }
            Event::ArchiveFinished { archive, summary } => {
                self.bar.finish_and_clear();
                info!(
                    "{}: {} ok, {} skipped, {} failed",
                    display_name(&archive),
                    summary.ok,
                    summary.skipped,
                    summary.failed
                );
            }
            Event::ArchiveFailed { path, error } => {
                self.bar.finish_and_clear();
                error!("{}: {}", path.display(), error);
            }
        }
    }
}
