//! Identifier commands

use clap::{Args, Subcommand};
use oer_core::identifier;

use super::{CliResult, Globals};

#[derive(Debug, Args)]
pub struct IdentifierArgs {
    #[command(subcommand)]
    pub command: IdentifierCommand,
}

#[derive(Debug, Subcommand)]
pub enum IdentifierCommand {
    /// Build an identifier; platform and host default to the configuration
    Compose(ComposeArgs),
    /// Validate an identifier and print its parts
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Element type, e.g. `file` or `external`
    #[arg(long = "type")]
    pub element_type: String,
    /// Value type, e.g. `contenthash`
    #[arg(long)]
    pub value_type: String,
    #[arg(long)]
    pub value: String,
    #[arg(long)]
    pub platform: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub identifier: String,
}

pub fn execute(globals: &Globals, args: IdentifierArgs) -> CliResult {
    match args.command {
        IdentifierCommand::Compose(a) => {
            let config = globals.load_config()?;
            let platform = a.platform.unwrap_or(config.platform);
            let host = a.host.unwrap_or(config.instance_host);
            let id = identifier::compose(&platform, &host, &a.element_type, &a.value_type, &a.value)?;
            println!("{}", id);
            Ok(())
        }
        IdentifierCommand::Check(a) => {
            let parts = identifier::decompose(&a.identifier)?;
            println!("platform: {}", parts.platform);
            println!("instance: {}", parts.instance);
            println!("type: {}", parts.element_type);
            println!("valuetype: {}", parts.value_type);
            println!("value: {}", parts.value);
            Ok(())
        }
    }
}
