//! Terminal application shell
//!
//! Receives what the default event handlers do: location changes and
//! notifications. Both are recorded; when echo is on they are also printed.

use colored::*;
use ferry_core::events::{AppShell, Notification, NotificationLevel};

#[derive(Debug, Default)]
pub struct Terminal {
    echo: bool,
    history: Vec<String>,
    notifications: Vec<Notification>,
}

impl Terminal {
    /// A terminal that prints what it receives
    pub fn stdout() -> Self {
        Self {
            echo: true,
            ..Default::default()
        }
    }

    /// Current location, if any navigation happened
    pub fn location(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }
}

impl AppShell for Terminal {
    fn navigate(&mut self, path: &str) {
        if self.echo {
            println!("{} {}", "→".dimmed(), path.dimmed());
        }
        self.history.push(path.to_string());
    }

    fn replace(&mut self, path: &str) {
        self.history.pop();
        self.navigate(path);
    }

    fn notify(&mut self, notification: Notification) {
        if self.echo {
            let line = match notification.level {
                NotificationLevel::Success => format!("✓ {}", notification.text).green(),
                NotificationLevel::Info => notification.text.normal(),
                NotificationLevel::Warning => format!("⚠ {}", notification.text).yellow(),
                NotificationLevel::Error => format!("✗ {}", notification.text).red(),
            };
            eprintln!("{}", line);
        }
        self.notifications.push(notification);
    }
}
