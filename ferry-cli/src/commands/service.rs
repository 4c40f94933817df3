//! Service command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use ferry_core::domain::service::Service;
use ferry_core::events::Event;

use crate::session::Session;

/// Service subcommands
#[derive(Subcommand)]
pub enum ServiceCommands {
    /// List all services
    List,
    /// Show a service definition
    Get {
        /// Service name
        name: String,
    },
    /// Create a service from a JSON definition
    Create {
        /// Path to the JSON definition
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Replace a service definition
    Edit {
        /// Path to the JSON definition
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a service
    Delete {
        /// Service name
        name: String,
    },
}

/// Handle service commands
pub async fn handle_service_command(command: ServiceCommands, session: &mut Session) -> Result<()> {
    session.require_view("/services")?;
    let client = session.client()?;

    match command {
        ServiceCommands::List => {
            let services = session.check(client.list_services().await)?;
            if services.is_empty() {
                println!("{}", "No services found.".yellow());
                return Ok(());
            }
            println!("{}", format!("Found {} service(s):", services.len()).bold());
            println!();
            for service in &services {
                print_service_summary(service);
            }
        }
        ServiceCommands::Get { name } => {
            let service = session.check(client.get_service(&name).await)?;
            println!("{}", serde_json::to_string_pretty(&service)?);
        }
        ServiceCommands::Create { file } => {
            let service = read_definition(&file)?;
            session.check(client.create_service(&service).await)?;
            session.publish(Event::ResourceUpdated(format!(
                "Service {} created",
                service.name
            )));
        }
        ServiceCommands::Edit { file } => {
            let service = read_definition(&file)?;
            session.check(client.edit_service(&service).await)?;
            session.publish(Event::ResourceUpdated(format!(
                "Service {} updated",
                service.name
            )));
        }
        ServiceCommands::Delete { name } => {
            session.check(client.delete_service(&name).await)?;
            session.publish(Event::ResourceDeleted(format!("Service {} deleted", name)));
            session.publish(Event::FunctionsList);
        }
    }

    Ok(())
}

fn read_definition(path: &Path) -> Result<Service> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let service: Service = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid service definition", path.display()))?;
    Ok(service)
}

fn print_service_summary(service: &Service) {
    println!("  {} {}", "●".cyan(), service.name.bold());
    println!("    {}: {}", "Image".dimmed(), service.image);
    if !service.memory.is_empty() || !service.cpu.is_empty() {
        println!(
            "    {}: {} memory, {} cpu",
            "Resources".dimmed(),
            service.memory,
            service.cpu
        );
    }
}
