//! Release requirement commands

use clap::{Args, Subcommand};
use oer_engine::commands::{check_requirements, reconcile_release_flags};

use super::{CliResult, Globals, Session};

#[derive(Debug, Args)]
pub struct RequirementsArgs {
    #[command(subcommand)]
    pub command: RequirementsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RequirementsCommand {
    /// Clear release flags of records that no longer meet the requirements
    Reconcile,
    /// Show which requirements one element meets
    Check { identifier: String },
}

pub fn execute(globals: &Globals, args: RequirementsArgs) -> CliResult {
    let session = Session::open(globals)?;
    match args.command {
        RequirementsCommand::Reconcile => {
            let report = reconcile_release_flags(&session.conn, &session.registry, &session.ctx)?;
            for identifier in &report.demoted {
                println!("release flag cleared: {}", identifier);
            }
            for err in &report.notify_failures {
                println!("notification failed: {}", err);
            }
            println!("{} records demoted", report.demoted.len());
        }
        RequirementsCommand::Check { identifier } => {
            let result = check_requirements(&session.conn, &session.ctx, &identifier)?;
            for (field, ok) in &result.fields {
                println!("{}: {}", field, if *ok { "ok" } else { "missing" });
            }
            println!("releasable: {}", result.releasable);
        }
    }
    Ok(())
}
