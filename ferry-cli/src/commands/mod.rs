//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod bucket;
mod login;
mod logs;
mod navigate;
mod object;
mod service;

pub use bucket::BucketCommands;
pub use login::LoginArgs;
pub use logs::LogsCommands;
pub use object::ObjectCommands;
pub use service::ServiceCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::session::Session;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check credentials and start a session
    Login(LoginArgs),
    /// End the session
    Logout,
    /// Show deployment information
    Info,
    /// Service management
    Service {
        #[command(subcommand)]
        command: ServiceCommands,
    },
    /// Job logs
    Logs {
        #[command(subcommand)]
        command: LogsCommands,
    },
    /// Bucket management
    Bucket {
        #[command(subcommand)]
        command: BucketCommands,
    },
    /// Objects inside a bucket
    Object {
        #[command(subcommand)]
        command: ObjectCommands,
    },
    /// Show where navigating to a console path lands
    Navigate {
        /// Console path, e.g. /buckets/images
        path: String,
    },
    /// Show the navigation menu
    Menu,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `session` - The console session
pub async fn handle_command(command: Commands, session: &mut Session) -> Result<()> {
    match command {
        Commands::Login(args) => login::login(args, session).await,
        Commands::Logout => login::logout(session),
        Commands::Info => login::info(session).await,
        Commands::Service { command } => service::handle_service_command(command, session).await,
        Commands::Logs { command } => logs::handle_logs_command(command, session).await,
        Commands::Bucket { command } => bucket::handle_bucket_command(command, session).await,
        Commands::Object { command } => object::handle_object_command(command, session).await,
        Commands::Navigate { path } => navigate::navigate(&path, session),
        Commands::Menu => navigate::menu(session).await,
    }
}
