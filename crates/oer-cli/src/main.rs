//! OER CLI
//!
//! Command-line interface for the OER element release engine

use clap::{Parser, Subcommand};
use oer_core::logging_facility::{init, Profile};

mod commands;

use commands::Globals;

#[derive(Debug, Parser)]
#[command(name = "oer")]
#[command(about = "OER - open educational resource release engine", long_about = None)]
struct Cli {
    #[command(flatten)]
    globals: Globals,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
    /// Compose and check element identifiers
    Identifier(commands::identifier::IdentifierArgs),
    /// Course metadata operations
    Courseinfo(commands::courseinfo::CourseinfoArgs),
    /// Release runs and published releases
    Release(commands::release::ReleaseArgs),
    /// Release requirement checks
    Requirements(commands::requirements::RequirementsArgs),
}

fn main() {
    let cli = Cli::parse();
    init(if cli.globals.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Seed(args) => commands::seed::execute(&cli.globals, args),
        Commands::Identifier(args) => commands::identifier::execute(&cli.globals, args),
        Commands::Courseinfo(args) => commands::courseinfo::execute(&cli.globals, args),
        Commands::Release(args) => commands::release::execute(&cli.globals, args),
        Commands::Requirements(args) => commands::requirements::execute(&cli.globals, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
