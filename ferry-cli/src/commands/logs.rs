//! Job log command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use ferry_core::domain::job::JobInfo;
use ferry_core::dto::job::JobRef;
use ferry_core::events::Event;

use crate::session::Session;

/// Log subcommands
#[derive(Subcommand)]
pub enum LogsCommands {
    /// List the jobs of a service
    List {
        /// Service name
        service: String,
        /// Continuation token printed by a previous listing
        #[arg(long)]
        page: Option<String>,
    },
    /// Print the logs of one job
    Get {
        /// Service name
        service: String,
        /// Job name
        job: String,
    },
    /// Delete one job
    Delete {
        /// Service name
        service: String,
        /// Job name
        job: String,
    },
    /// Delete the finished jobs of a service
    Clear {
        /// Service name
        service: String,
        /// Also delete jobs that are still pending or running
        #[arg(long)]
        all: bool,
    },
}

impl LogsCommands {
    fn service(&self) -> &str {
        match self {
            LogsCommands::List { service, .. }
            | LogsCommands::Get { service, .. }
            | LogsCommands::Delete { service, .. }
            | LogsCommands::Clear { service, .. } => service,
        }
    }
}

/// Handle log commands
pub async fn handle_logs_command(command: LogsCommands, session: &mut Session) -> Result<()> {
    session.require_view(&format!("/logs/{}", command.service()))?;
    let client = session.client()?;

    match command {
        LogsCommands::List { service, page } => {
            let list = session.check(client.list_jobs_page(&service, page.as_deref()).await)?;
            if list.jobs.is_empty() {
                println!("{}", format!("No jobs found for {}.", service).yellow());
            } else {
                println!("{}", format!("Jobs of {}:", service).bold());
                for (name, job) in &list.jobs {
                    print_job(name, job);
                }
            }
            if list.has_more() {
                println!();
                println!(
                    "{} {}",
                    "More jobs available, continue with --page".dimmed(),
                    list.next_page
                );
            }
        }
        LogsCommands::Get { service, job } => {
            let logs = session.check(client.job_logs(&JobRef::new(service, job)).await)?;
            print!("{}", logs);
        }
        LogsCommands::Delete { service, job } => {
            session.check(client.delete_job(&JobRef::new(&service, &job)).await)?;
            session.publish(Event::ResourceDeleted(format!("Job {} deleted", job)));
        }
        LogsCommands::Clear { service, all } => {
            session.check(client.delete_all_jobs(&service, all).await)?;
            let which = if all { "All jobs" } else { "Finished jobs" };
            session.publish(Event::ResourceDeleted(format!("{} of {} deleted", which, service)));
        }
    }

    Ok(())
}

fn colorize_status(status: &str) -> ColoredString {
    match status {
        "Succeeded" => status.green(),
        "Failed" => status.red(),
        "Running" => status.cyan(),
        "Pending" => status.yellow(),
        _ => status.normal(),
    }
}

fn print_job(name: &str, job: &JobInfo) {
    let started = job
        .start_time
        .or(job.creation_time)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("  {} {} [{}] {}", "●".cyan(), name, colorize_status(&job.status), started.dimmed());
}
