//! Course metadata commands

use clap::{Args, Subcommand};
use oer_engine::commands::{sync_all_courses, sync_course, SyncReport};

use super::{CliResult, Globals, Session};

#[derive(Debug, Args)]
pub struct CourseinfoArgs {
    #[command(subcommand)]
    pub command: CourseinfoCommand,
}

#[derive(Debug, Subcommand)]
pub enum CourseinfoCommand {
    /// Synchronise stored course metadata with the course records
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Only this course; all courses otherwise
    #[arg(long)]
    pub course: Option<i64>,
}

pub fn execute(globals: &Globals, args: CourseinfoArgs) -> CliResult {
    let CourseinfoCommand::Sync(sync) = args.command;
    let mut session = Session::open(globals)?;
    let reports = match sync.course {
        Some(course_id) => vec![sync_course(
            &mut session.conn,
            &session.registry,
            &session.ctx,
            course_id,
        )?],
        None => sync_all_courses(&mut session.conn, &session.registry, &session.ctx)?,
    };
    for report in &reports {
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!(
        "course {}: {} created, {} updated, {} deleted, {} kept as deleted",
        report.course_id,
        report.created,
        report.updated,
        report.hard_deleted,
        report.soft_deleted
    );
}
