//! Console session
//!
//! Ties together the persisted state, the router guard, the event bus and
//! the terminal the default handlers act on.

use anyhow::{Context, Result, bail};
use ferry_client::{ClientConfig, ClientError, ConsoleClient};
use ferry_core::events::{Event, EventBus, Notification, PublishReport};
use ferry_core::routes::guard::{Navigation, Router};
use ferry_core::state::{Credentials, FileStore, StateStore};
use tracing::{debug, info};

use crate::config::Config;
use crate::shell::Terminal;

/// Builds the facade commands talk to
pub type ClientFactory =
    Box<dyn Fn(&ClientConfig, &Credentials) -> ferry_client::Result<ConsoleClient> + Send + Sync>;

pub struct Session {
    pub config: Config,
    pub store: Box<dyn StateStore>,
    pub router: Router,
    pub bus: EventBus<Terminal>,
    pub terminal: Terminal,
    connect: ClientFactory,
}

impl Session {
    /// Opens the state file named in `config`
    pub fn open(config: Config) -> Result<Self> {
        let store = FileStore::open(&config.state_file).with_context(|| {
            format!("Failed to open state file {}", config.state_file.display())
        })?;
        debug!("Using state file {}", store.path().display());
        Ok(Self::with_store(config, Box::new(store), Terminal::stdout()))
    }

    pub fn with_store(config: Config, store: Box<dyn StateStore>, terminal: Terminal) -> Self {
        Self {
            config,
            store,
            router: Router::default(),
            bus: EventBus::with_default_handlers(),
            terminal,
            connect: Box::new(ConsoleClient::new),
        }
    }

    /// Replaces how facades are built, e.g. to point them at a stub
    pub fn with_client_factory<F>(mut self, connect: F) -> Self
    where
        F: Fn(&ClientConfig, &Credentials) -> ferry_client::Result<ConsoleClient> + Send + Sync + 'static,
    {
        self.connect = Box::new(connect);
        self
    }

    /// Publishes `event` to the bus with the terminal as context
    pub fn publish(&mut self, event: Event) -> PublishReport {
        self.bus.publish(&mut self.terminal, &event)
    }

    /// Runs the router guard for `path` against the persisted state
    pub fn navigate(&self, path: &str) -> Result<Navigation> {
        self.router
            .navigate(path, self.store.as_ref())
            .with_context(|| format!("Cannot navigate to '{}'", path))
    }

    /// Refuses to continue unless the view at `path` may be entered
    pub fn require_view(&self, path: &str) -> Result<()> {
        let navigation = self.navigate(path)?;
        if !navigation.is_allowed() {
            bail!(
                "Not logged in (redirected to {}); run `ferry login` first",
                navigation.destination().path
            );
        }
        Ok(())
    }

    /// Builds a facade for `credentials`
    pub fn connect(&self, credentials: &Credentials) -> Result<ConsoleClient> {
        (self.connect)(&self.config.client, credentials)
            .context("Failed to set up the console client")
    }

    /// Builds a facade from the persisted credentials
    pub fn client(&self) -> Result<ConsoleClient> {
        let credentials = Credentials::load(self.store.as_ref())
            .context("No stored credentials; run `ferry login` first")?;
        self.connect(&credentials)
    }

    /// Passes a successful facade result through; publishes the matching
    /// event for a failure and returns it as an error
    pub fn check<T>(&mut self, result: ferry_client::Result<T>) -> Result<T> {
        result.map_err(|err| self.fail(err))
    }

    pub fn fail(&mut self, err: ClientError) -> anyhow::Error {
        let event = event_for(&err);
        info!("Publishing {} for failed call", event.name());
        self.publish(event);
        anyhow::Error::new(err)
    }
}

/// Maps a facade failure to the event the console reacts with
pub fn event_for(err: &ClientError) -> Event {
    let message = err.to_string();
    if err.is_bad_request() {
        Event::BadRequest(message)
    } else if err.is_unauthorized() {
        Event::AuthFailed
    } else if err.is_forbidden() {
        Event::AccessDenied(message)
    } else {
        Event::ShowSnackbar(Notification::error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_client::ClientConfig;
    use ferry_core::events::EventName;
    use ferry_core::state::{MemoryStore, keys};
    use std::path::PathBuf;

    fn session(store: MemoryStore) -> Session {
        let config = Config::new(
            ClientConfig::new("http://127.0.0.1:1"),
            Some(PathBuf::from("unused.json")),
        )
        .unwrap();
        Session::with_store(config, Box::new(store), Terminal::default())
    }

    #[test]
    fn test_event_for_status() {
        let cases = [
            (400, EventName::BadRequest),
            (401, EventName::AuthFailed),
            (403, EventName::AccessDenied),
            (404, EventName::ShowSnackbar),
            (500, EventName::ShowSnackbar),
        ];
        for (status, expected) in cases {
            let event = event_for(&ClientError::api_error(status, "nope"));
            assert_eq!(event.name(), expected, "status {}", status);
        }
        let event = event_for(&ClientError::InvalidRequest("empty".to_string()));
        assert_eq!(event.name(), EventName::ShowSnackbar);
    }

    #[test]
    fn test_fail_publishes_and_navigates() {
        let mut session = session(MemoryStore::new());

        let result: Result<()> = session.check(Err(ClientError::api_error(403, "denied")));

        assert!(result.is_err());
        assert_eq!(session.terminal.location(), Some("/403"));
    }

    #[test]
    fn test_auth_failure_lands_on_login() {
        let mut session = session(MemoryStore::new());
        let _ = session.check::<()>(Err(ClientError::api_error(401, "")));
        assert_eq!(session.terminal.location(), Some("/login"));
    }

    #[test]
    fn test_require_view_without_login() {
        let session = session(MemoryStore::new());
        let err = session.require_view("/services").unwrap_err();
        assert!(err.to_string().contains("/login"));
    }

    #[test]
    fn test_require_view_with_login() {
        let session = session(MemoryStore::from_iter([(keys::AUTHENTICATED, "true")]));
        assert!(session.require_view("/buckets/images").is_ok());
        assert!(session.require_view("/login").is_ok());
    }

    #[test]
    fn test_client_needs_credentials() {
        let session = session(MemoryStore::from_iter([(keys::AUTHENTICATED, "true")]));
        assert!(session.client().is_err());
    }
}
