//! Unpack command implementation.

use crate::utils::ConsoleReporter;
use oxidat_archive::{ReadOptions, UnpackOptions, unpack_all, unpack_archive};
use std::path::Path;

/// Options for the unpack command.
pub struct UnpackArgs {
    pub extension: String,
    pub strict: bool,
    pub names: bool,
    pub parallel: bool,
    pub progress: bool,
}

impl UnpackArgs {
    fn to_options(&self) -> UnpackOptions {
        let read = if self.strict {
            ReadOptions::strict()
        } else {
            ReadOptions::default()
        };
        UnpackOptions::default()
            .with_extension(self.extension.clone())
            .with_read_options(read)
            .with_name_map(self.names)
            .with_parallel(self.parallel)
    }
}

/// Unpack every archive in `input` (or `input` itself when it is a file).
pub fn cmd_unpack(
    input: &Path,
    output: &Path,
    args: &UnpackArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options();
    let mut reporter = ConsoleReporter::new(args.progress);

    if input.is_file() {
        let summary = unpack_archive(input, output, &options, &mut reporter)?;
        println!(
            "Extracted {} entries ({} skipped, {} failed)",
            summary.ok, summary.skipped, summary.failed
        );
        if summary.failed > 0 {
            return Err(format!("{} entries failed", summary.failed).into());
        }
        return Ok(());
    }

    let summary = unpack_all(input, output, &options, &mut reporter)?;
    println!(
        "Unpacked {} archive(s): {} entries extracted, {} skipped, {} failed",
        summary.archives_ok, summary.entries.ok, summary.entries.skipped, summary.entries.failed
    );
    if summary.has_failures() {
        return Err(format!(
            "{} archive(s) and {} entries failed",
            summary.archives_failed, summary.entries.failed
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxidat_archive::build;
    use std::fs;

    fn args() -> UnpackArgs {
        UnpackArgs {
            extension: "dat".to_string(),
            strict: false,
            names: true,
            parallel: true,
            progress: false,
        }
    }

    #[test]
    fn test_unpack_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let archives = tmp.path().join("archives");
        fs::create_dir(&archives).unwrap();
        let archive = build(&[b"hello".as_slice(), b"world".as_slice()]).unwrap();
        fs::write(archives.join("greet.dat"), &archive).unwrap();

        let out = tmp.path().join("out");
        cmd_unpack(&archives, &out, &args()).unwrap();
        assert_eq!(fs::read(out.join("greet/1")).unwrap(), b"world");

        let single = tmp.path().join("single");
        cmd_unpack(&archives.join("greet.dat"), &single, &args()).unwrap();
        assert_eq!(fs::read(single.join("greet/0")).unwrap(), b"hello");
    }

    #[test]
    fn test_unpack_strict_rejects_overrun() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = build(&[b"abcdefgh".as_slice()]).unwrap();
        // 21-byte payload at 32; drop the padding.
        let path = tmp.path().join("cut.dat");
        fs::write(&path, &archive[..53]).unwrap();

        let out = tmp.path().join("out");
        cmd_unpack(&path, &out, &args()).unwrap();

        let strict = UnpackArgs {
            strict: true,
            ..args()
        };
        assert!(cmd_unpack(&path, &tmp.path().join("strict"), &strict).is_err());
    }
}
