//! Progress and diagnostics for batch operations.
//!
//! Library code never prints. Batch functions describe what happens through
//! a [`Reporter`]; the CLI turns events into progress bars and log lines,
//! tests collect them.

use std::path::PathBuf;

/// Something worth telling the user about during a batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An archive is about to be written or read.
    ArchiveStarted {
        /// Archive path.
        archive: PathBuf,
        /// Number of entries.
        entries: usize,
    },
    /// An entry was encoded and appended.
    EntryPacked {
        /// Entry index.
        index: usize,
        /// Source file.
        source: PathBuf,
        /// Raw size in bytes.
        raw_len: usize,
        /// Encoded payload size in bytes.
        stored_len: usize,
    },
    /// An entry was decoded and written out.
    EntryExtracted {
        /// Entry index.
        index: usize,
        /// Output file name.
        file_name: String,
        /// Start offset in the archive.
        start: usize,
        /// End offset in the archive.
        end: usize,
        /// Decoded size in bytes.
        raw_len: usize,
    },
    /// An entry span was empty or outside the archive.
    EntrySkipped {
        /// Entry index.
        index: usize,
        /// Recorded start offset.
        start: u64,
        /// Recorded end offset.
        end: u64,
    },
    /// An entry ran past the archive end and was cut.
    EntryClamped {
        /// Entry index.
        index: usize,
        /// Recorded end offset.
        recorded_end: u64,
        /// Archive length.
        archive_len: usize,
    },
    /// An entry could not be decoded or written.
    EntryFailed {
        /// Entry index.
        index: usize,
        /// Error message.
        error: String,
    },
    /// A file in an input directory has no numeric prefix.
    FileIgnored {
        /// The ignored file.
        path: PathBuf,
    },
    /// A name map was written next to an archive.
    NameMapWritten {
        /// Name-map path.
        path: PathBuf,
        /// Number of names.
        names: usize,
    },
    /// No name map was found next to an archive.
    NameMapMissing {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// A name map exists but could not be read; plain indexes are used.
    NameMapUnreadable {
        /// Name-map path.
        path: PathBuf,
        /// Error message.
        error: String,
    },
    /// An archive finished.
    ArchiveFinished {
        /// Archive path.
        archive: PathBuf,
        /// Entry counts.
        summary: EntrySummary,
    },
    /// A whole directory or archive failed.
    ArchiveFailed {
        /// Directory or archive path.
        path: PathBuf,
        /// Error message.
        error: String,
    },
}

/// Per-entry counts for one archive or a whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntrySummary {
    /// Entries packed or extracted.
    pub ok: usize,
    /// Entries with an invalid span.
    pub skipped: usize,
    /// Entries that failed.
    pub failed: usize,
}

impl EntrySummary {
    /// Add another summary's counts.
    pub fn merge(&mut self, other: &EntrySummary) {
        self.ok += other.ok;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Total entries seen.
    pub fn total(&self) -> usize {
        self.ok + self.skipped + self.failed
    }
}

/// Counts for a batch of archives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Archives processed without an archive-level error.
    pub archives_ok: usize,
    /// Archives (or input directories) that failed as a whole.
    pub archives_failed: usize,
    /// Entry counts across all archives.
    pub entries: EntrySummary,
}

impl BatchSummary {
    /// Whether anything failed, at either level.
    pub fn has_failures(&self) -> bool {
        self.archives_failed > 0 || self.entries.failed > 0
    }
}

/// Receiver of batch events.
pub trait Reporter {
    /// Handle one event.
    fn report(&mut self, event: Event);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: Event) {
        (**self).report(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: Event) {}
}

/// Keeps every event in order.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    /// Events received so far.
    pub events: Vec<Event>,
}

impl CollectingReporter {
    /// Empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events matching `predicate`.
    pub fn filter<F>(&self, predicate: F) -> Vec<&Event>
    where
        F: Fn(&Event) -> bool,
    {
        self.events.iter().filter(|e| predicate(e)).collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, event: Event) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter() {
        fn fail<R: Reporter>(mut reporter: R) {
            reporter.report(Event::EntryFailed {
                index: 3,
                error: "bad".to_string(),
            });
        }

        let mut reporter = CollectingReporter::new();
        fail(&mut reporter);
        reporter.report(Event::FileIgnored {
            path: PathBuf::from("notes.txt"),
        });
        assert_eq!(reporter.events.len(), 2);
        assert_eq!(
            reporter
                .filter(|e| matches!(e, Event::EntryFailed { .. }))
                .len(),
            1
        );
    }

    #[test]
    fn test_summary_merge() {
        let mut total = EntrySummary::default();
        total.merge(&EntrySummary {
            ok: 2,
            skipped: 1,
            failed: 0,
        });
        total.merge(&EntrySummary {
            ok: 1,
            skipped: 0,
            failed: 1,
        });
        assert_eq!(total.total(), 5);

        let batch = BatchSummary {
            archives_ok: 2,
            archives_failed: 0,
            entries: total,
        };
        assert!(batch.has_failures());
        assert!(!BatchSummary::default().has_failures());
    }
}
