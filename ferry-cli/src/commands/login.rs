//! Session command handlers
//!
//! Login, logout and deployment information.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use ferry_core::dto::login::LoginParams;
use ferry_core::events::Event;
use ferry_core::state::{AUTHENTICATED_FLAG, Credentials, StorageCredentials, keys};
use tracing::info;

use crate::session::Session;

/// Login arguments
#[derive(Args)]
pub struct LoginArgs {
    /// Control-plane user
    #[arg(long, env = "FERRY_USER")]
    pub user: String,

    /// Control-plane password
    #[arg(long, env = "FERRY_PASSWORD")]
    pub password: String,

    /// Object-store host name
    #[arg(long)]
    pub endpoint: String,

    /// Object-store port
    #[arg(long, default_value_t = 9000)]
    pub port: u16,

    /// Object-store access key
    #[arg(long)]
    pub access_key: String,

    /// Object-store secret key
    #[arg(long, env = "FERRY_SECRET_KEY")]
    pub secret_key: String,

    /// Talk to the object store over plain HTTP
    #[arg(long)]
    pub no_ssl: bool,
}

impl LoginArgs {
    fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
            storage: StorageCredentials {
                endpoint: self.endpoint.clone(),
                port: self.port,
                use_ssl: !self.no_ssl,
                access_key: self.access_key.clone(),
                secret_key: self.secret_key.clone(),
            },
        }
    }
}

/// Check the credentials and persist them on success
pub async fn login(args: LoginArgs, session: &mut Session) -> Result<()> {
    let credentials = args.credentials();
    let client = session.connect(&credentials)?;

    let status = session.check(
        client
            .check_login(&LoginParams::new(&args.user, &args.password))
            .await,
    )?;

    if status != 200 {
        session.store.remove(keys::AUTHENTICATED)?;
        session.publish(Event::AuthFailed);
        bail!("Login rejected by {} (status {})", session.config.client.api_url, status);
    }

    credentials
        .save(session.store.as_ref())
        .context("Failed to persist credentials")?;
    session.store.set(keys::AUTHENTICATED, AUTHENTICATED_FLAG)?;
    info!("Logged in as {}", args.user);

    session.publish(Event::LoginSuccess);
    println!("{}", format!("Logged in as {}", args.user).green());
    Ok(())
}

/// Forget the session
pub fn logout(session: &mut Session) -> Result<()> {
    for key in [keys::AUTHENTICATED, keys::USER, keys::PASSWORD] {
        session.store.remove(key)?;
    }
    session.publish(Event::Logout);
    Ok(())
}

/// Show deployment information
pub async fn info(session: &mut Session) -> Result<()> {
    session.require_view("/settings")?;
    let client = session.client()?;
    let info = session.check(client.system_info().await)?;

    println!("{}", "Deployment".bold());
    println!("  {}: {}", "Version".bold(), info.version);
    println!("  {}: {}", "Architecture".bold(), info.arch);
    println!("  {}: {}", "Kubernetes".bold(), info.kube_version);
    if let Some(backend) = info.serverless_backend {
        println!("  {}: {} {}", "Serverless backend".bold(), backend.name, backend.version);
    }

    if let Ok(credentials) = Credentials::load(session.store.as_ref()) {
        println!("  {}: {}", "Object store".bold(), credentials.storage.endpoint_url());
        println!("  {}: {}", "User".bold(), credentials.user);
    }

    Ok(())
}
