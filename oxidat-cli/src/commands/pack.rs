//! Pack command implementation.

use crate::utils::ConsoleReporter;
use oxidat_archive::{PackOptions, pack_all};
use std::path::Path;

/// Options for the pack command.
pub struct PackArgs {
    pub extension: String,
    pub names: bool,
    pub parallel: bool,
    pub progress: bool,
}

impl PackArgs {
    fn to_options(&self) -> PackOptions {
        PackOptions::default()
            .with_extension(self.extension.clone())
            .with_name_map(self.names)
            .with_parallel(self.parallel)
    }
}

pub fn cmd_pack(
    input: &Path,
    output: &Path,
    args: &PackArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_dir() {
        return Err(format!("{} is not a directory", input.display()).into());
    }

    let mut reporter = ConsoleReporter::new(args.progress);
    let summary = pack_all(input, output, &args.to_options(), &mut reporter)?;

    println!(
        "Packed {} archive(s), {} entries into {}",
        summary.archives_ok,
        summary.entries.ok,
        output.display()
    );
    if summary.archives_failed > 0 {
        return Err(format!("{} directory(ies) failed to pack", summary.archives_failed).into());
    }
    Ok(())
}
