//! OxiDat CLI - DAT archive packer
//!
//! Packs directories of numbered files into 32-byte aligned DAT archives of
//! CM-compressed entries, and unpacks them again.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{PackArgs, UnpackArgs, cmd_list, cmd_pack, cmd_test, cmd_unpack};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oxidat")]
#[command(author, version, about = "DAT archive packer - Pure Rust CM codec")]
#[command(long_about = "
OxiDat packs directories of numbered files (0, 1, 2.NAME, ...) into DAT
archives and unpacks them again. Entries are compressed with the CM codec.

Examples:
  oxidat pack assets/ out/
  oxidat unpack out/ extracted/
  oxidat unpack out/sound.dat extracted/
  oxidat list out/sound.dat --json
  oxidat test out/sound.dat
")]
struct Cli {
    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a directory (or each of its subdirectories) into archives
    #[command(alias = "p")]
    Pack {
        /// Directory of numbered files, or of such directories
        input: PathBuf,

        /// Output directory for archives
        output: PathBuf,

        /// Archive file extension
        #[arg(short, long, default_value = "dat")]
        extension: String,

        /// Do not write a name map for named entries
        #[arg(long)]
        no_names: bool,

        /// Encode entries on a single thread
        #[arg(long)]
        single_thread: bool,

        /// Hide progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// Unpack every archive in a directory (or a single archive)
    #[command(alias = "x")]
    Unpack {
        /// Directory of archives, or one archive file
        input: PathBuf,

        /// Output directory; each archive gets a subdirectory
        output: PathBuf,

        /// Archive file extension
        #[arg(short, long, default_value = "dat")]
        extension: String,

        /// Fail entries that run past the archive end instead of truncating
        #[arg(long)]
        strict: bool,

        /// Ignore name maps and use plain indexes
        #[arg(long)]
        no_names: bool,

        /// Decode entries on a single thread
        #[arg(long)]
        single_thread: bool,

        /// Hide progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// List the entries of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Report entries that run past the archive end as out of bounds
        #[arg(long)]
        strict: bool,
    },

    /// Decode every entry without writing anything
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,

        /// Fail entries that run past the archive end
        #[arg(long)]
        strict: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Pack {
            input,
            output,
            extension,
            no_names,
            single_thread,
            no_progress,
        } => cmd_pack(
            &input,
            &output,
            &PackArgs {
                extension,
                names: !no_names,
                parallel: !single_thread,
                progress: !no_progress,
            },
        ),
        Commands::Unpack {
            input,
            output,
            extension,
            strict,
            no_names,
            single_thread,
            no_progress,
        } => cmd_unpack(
            &input,
            &output,
            &UnpackArgs {
                extension,
                strict,
                names: !no_names,
                parallel: !single_thread,
                progress: !no_progress,
            },
        ),
        Commands::List {
            archive,
            json,
            strict,
        } => cmd_list(&archive, json, strict),
        Commands::Test { archive, strict } => cmd_test(&archive, strict, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_unpack() {
        let cli = Cli::parse_from(["oxidat", "-v", "unpack", "in", "out", "--strict", "-e", "bin"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Unpack {
                strict, extension, ..
            } => {
                assert!(strict);
                assert_eq!(extension, "bin");
            }
            _ => panic!("expected unpack"),
        }
    }
}
