//! Ferry CLI
//!
//! Command-line console for a serverless deployment: services, job logs,
//! buckets and objects.

mod commands;
mod config;
mod session;
mod shell;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use ferry_client::ClientConfig;
use session::Session;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Serverless service and object-storage console", long_about = None)]
struct Cli {
    /// Control-plane URL
    #[arg(long, env = "FERRY_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Path of the persisted console state
    #[arg(long, env = "FERRY_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Accept invalid TLS certificates on the control plane and transfers
    #[arg(long, env = "FERRY_INSECURE_TLS")]
    insecure: bool,

    /// Region storage requests are signed for
    #[arg(long, env = "FERRY_S3_REGION", default_value = ferry_client::config::DEFAULT_REGION)]
    region: String,

    /// HTTP timeout in seconds
    #[arg(long, env = "FERRY_HTTP_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry_cli=info,ferry_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let client = ClientConfig::new(cli.api_url)
        .with_insecure_tls(cli.insecure)
        .with_region(cli.region)
        .with_timeout(Duration::from_secs(cli.timeout));
    let config = Config::new(client, cli.state_file)?;

    let mut session = Session::open(config)?;
    handle_command(cli.command, &mut session).await
}
