//! Test command implementation.

use oxidat_archive::{DatReader, Outcome, ReadOptions};
use oxidat_core::ArchiveSource;
use std::path::Path;

/// Counts from decoding every entry.
#[derive(Debug, Default, PartialEq)]
struct TestReport {
    ok: usize,
    skipped: usize,
    errors: Vec<(usize, String)>,
}

fn test_entries(reader: &DatReader<'_>, verbose: bool) -> TestReport {
    let mut report = TestReport::default();
    for extraction in reader.extract_all_with(true) {
        let index = extraction.index();
        match extraction.outcome {
            Outcome::Extracted(data) => {
                report.ok += 1;
                if verbose {
                    println!("  OK: {} ({} bytes)", index, data.len());
                }
            }
            Outcome::Skipped => {
                report.skipped += 1;
                if verbose {
                    println!("  SKIPPED: {} (invalid span)", index);
                }
            }
            Outcome::Failed(e) => {
                if verbose {
                    println!("  FAILED: {} - {}", index, e);
                }
                report.errors.push((index, e.to_string()));
            }
        }
    }
    report
}

pub fn cmd_test(
    archive: &Path,
    strict: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = ArchiveSource::open(archive)?;
    let options = if strict {
        ReadOptions::strict()
    } else {
        ReadOptions::default()
    };
    let reader = DatReader::with_options(&source, options)?;

    println!("Testing {} ({} entries)", archive.display(), reader.entry_count());
    let report = test_entries(&reader, verbose);

    println!();
    println!("Test results:");
    println!("  Total entries: {}", reader.entry_count());
    println!("  OK: {}", report.ok);
    println!("  Skipped: {}", report.skipped);
    println!("  Failed: {}", report.errors.len());

    if !report.errors.is_empty() && !verbose {
        println!();
        println!("Errors:");
        for (index, err) in &report.errors {
            println!("  {}: {}", index, err);
        }
    }

    if !report.errors.is_empty() {
        std::process::exit(2);
    }

    println!();
    println!("All entries OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxidat_archive::build;

    #[test]
    fn test_all_ok() {
        let archive = build(&[b"one".as_slice(), b"two two two two".as_slice()]).unwrap();
        let reader = DatReader::open(&archive).unwrap();
        let report = test_entries(&reader, false);
        assert_eq!(report.ok, 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_reports_corrupt_entry() {
        let mut archive = build(&[b"one".as_slice(), b"two".as_slice()]).unwrap();
        archive[32] = 0; // entry 0 magic
        let reader = DatReader::open(&archive).unwrap();
        let report = test_entries(&reader, true);
        assert_eq!(report.ok, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, 0);
        assert!(report.errors[0].1.contains("magic"));
    }
}
