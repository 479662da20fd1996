//! Release commands
//!
//! `run` performs a release; the other subcommands print pull API responses.

use clap::{Args, Subcommand};
use oer_engine::commands::{pull, run_release, run_scheduled_release, PullQuery};
use oer_engine::{ReleaseOptions, ReleaseReport};

use super::{print_json, CliResult, Globals, Session};

#[derive(Debug, Args)]
pub struct ReleaseArgs {
    #[command(subcommand)]
    pub command: ReleaseCommand,

    /// Application profile of printed documents, e.g. `v1.0.0`
    #[arg(long, global = true)]
    pub profile: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ReleaseCommand {
    /// Snapshot every releasable element
    Run(RunArgs),
    /// Newest release of every element
    Latest {
        /// Only elements released by this course
        #[arg(long)]
        course: Option<i64>,
    },
    /// Every release of one element
    History { identifier: String },
    /// Everything one release run published
    Show { release_number: i64 },
    /// Release runs and their dates
    Dates,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Only run when the configured schedule says a release is due
    #[arg(long)]
    pub scheduled: bool,

    /// Limit the run to these courses
    #[arg(long = "course")]
    pub courses: Vec<i64>,

    /// Stop starting new courses after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

pub fn execute(globals: &Globals, args: ReleaseArgs) -> CliResult {
    let mut session = Session::open(globals)?;
    let query = match args.command {
        ReleaseCommand::Run(run) => return execute_run(&mut session, run),
        ReleaseCommand::Latest { course: None } => PullQuery::Latest,
        ReleaseCommand::Latest {
            course: Some(course_id),
        } => PullQuery::Course(course_id),
        ReleaseCommand::History { identifier } => PullQuery::Identifier(identifier),
        ReleaseCommand::Show { release_number } => PullQuery::Release(release_number),
        ReleaseCommand::Dates => PullQuery::Dates,
    };
    let response = pull(&session.conn, &session.ctx, &query, args.profile.as_deref())?;
    print_json(&response)
}

fn execute_run(session: &mut Session, args: RunArgs) -> CliResult {
    let options = ReleaseOptions {
        deadline: args
            .timeout_secs
            .map(|secs| std::time::Instant::now() + std::time::Duration::from_secs(secs)),
        courses: (!args.courses.is_empty()).then_some(args.courses),
        ..ReleaseOptions::default()
    };

    let report = if args.scheduled {
        match run_scheduled_release(&mut session.conn, &session.registry, &session.ctx, &options)? {
            Some(report) => report,
            None => {
                println!("release not due");
                return Ok(());
            }
        }
    } else {
        run_release(&mut session.conn, &session.registry, &session.ctx, &options)?
    };
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &ReleaseReport) {
    println!("release {}: {} snapshots", report.release_number, report.inserted());
    for course in &report.courses {
        match &course.skipped {
            Some(err) => println!("  course {}: skipped ({})", course.course_id, err),
            None => println!(
                "  course {}: {} released, {} unchanged, {} not releasable, {} errors",
                course.course_id,
                course.inserted.len(),
                course.unchanged.len(),
                course.not_releasable.len(),
                course.errors.len()
            ),
        }
    }
    if let Some(err) = &report.timed_out {
        println!("  stopped early: {}", err);
    }
}
