//! Bucket command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use ferry_core::events::{Event, Notification};

use crate::session::Session;

/// Bucket subcommands
#[derive(Subcommand)]
pub enum BucketCommands {
    /// List all buckets
    List,
    /// Create a bucket
    Create {
        /// Bucket name
        name: String,
    },
    /// Check whether a bucket exists
    Exists {
        /// Bucket name
        name: String,
    },
    /// Delete a bucket and everything in it
    Delete {
        /// Bucket name
        name: String,
    },
}

/// Handle bucket commands
pub async fn handle_bucket_command(command: BucketCommands, session: &mut Session) -> Result<()> {
    let view = match &command {
        BucketCommands::List | BucketCommands::Create { .. } => "/".to_string(),
        BucketCommands::Exists { name } | BucketCommands::Delete { name } => {
            format!("/buckets/{}", name)
        }
    };
    session.require_view(&view)?;
    let client = session.client()?;

    match command {
        BucketCommands::List => {
            let buckets = session.check(client.list_buckets().await)?;
            session.publish(Event::StorageBucketsCount(buckets.len()));
            if buckets.is_empty() {
                println!("{}", "No buckets found.".yellow());
                return Ok(());
            }
            println!("{}", format!("Found {} bucket(s):", buckets.len()).bold());
            for bucket in &buckets {
                let created = bucket
                    .creation_date
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("  {} {} {}", "●".cyan(), bucket.name.bold(), created.dimmed());
            }
        }
        BucketCommands::Create { name } => {
            session.check(client.create_bucket(&name).await)?;
            session.publish(Event::ResourceUpdated(format!("Bucket {} created", name)));
            session.publish(Event::RefreshBucketsList);
        }
        BucketCommands::Exists { name } => {
            let exists = session.check(client.bucket_exists(&name).await)?;
            if exists {
                println!("{}", format!("Bucket {} exists", name).green());
            } else {
                session.publish(Event::ShowSnackbar(Notification::error(format!(
                    "Bucket {} does not exist",
                    name
                ))));
            }
        }
        BucketCommands::Delete { name } => {
            session.check(client.remove_bucket(&name).await)?;
            session.publish(Event::ResourceDeleted(format!("Bucket {} deleted", name)));
            session.publish(Event::RefreshBucketsList);
        }
    }

    Ok(())
}
