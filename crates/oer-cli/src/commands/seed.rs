//! Seed import command
//!
//! Usage: oer seed import <PATH>

use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{is_seed_file, CliResult, Globals};

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file, or every seed file of a directory
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to seed YAML file or directory
    pub path: PathBuf,
}

pub fn execute(globals: &Globals, args: SeedArgs) -> CliResult {
    match args.command {
        SeedCommand::Import(import_args) => execute_import(globals, import_args),
    }
}

fn execute_import(globals: &Globals, args: ImportArgs) -> CliResult {
    let config = globals.load_config()?;
    let mut conn = globals.open_db()?;

    let seed_files = if args.path.is_dir() {
        // Sorted for a deterministic import order
        let mut files: Vec<PathBuf> = std::fs::read_dir(&args.path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_seed_file(p))
            .collect();
        files.sort();
        files
    } else {
        vec![args.path]
    };

    for seed_file in seed_files {
        let report = oer_store::seed::import_seed(&seed_file, &mut conn, &config)?;
        if report.unchanged {
            println!("{}: unchanged (digest: {})", seed_file.display(), report.seed_digest);
        } else {
            println!(
                "{}: {} courses, {} files, {} externals, {} overrides (digest: {})",
                seed_file.display(),
                report.courses,
                report.files,
                report.externals,
                report.overrides,
                report.seed_digest
            );
        }
    }
    Ok(())
}
