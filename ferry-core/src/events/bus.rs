//! Publish/subscribe registry
//!
//! Handlers receive the context they act on as an explicit argument at
//! publish time instead of being bound to a "current view". Delivery is
//! synchronous and follows subscription order. A handler that fails or
//! panics is reported and skipped; the remaining handlers still run.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Event, EventName};

/// Error returned by an event handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// A subscribed callback
pub type Handler<C> = Box<dyn Fn(&mut C, &Event) -> Result<(), HandlerError> + Send + Sync>;

/// Identifies one subscription so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A handler that did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub subscription: SubscriptionId,
    pub error: HandlerError,
}

/// What happened during one publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub event: EventName,
    /// Number of handlers invoked, failed ones included
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl PublishReport {
    /// True when every invoked handler succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Subscription<C> {
    id: SubscriptionId,
    handler: Handler<C>,
}

/// Registry of event handlers acting on a context of type `C`
pub struct EventBus<C> {
    subscriptions: BTreeMap<EventName, Vec<Subscription<C>>>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
        }
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self
            .subscriptions
            .iter()
            .map(|(name, subs)| (name.as_str(), subs.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscriptions", &counts)
            .finish()
    }
}

impl<C: 'static> EventBus<C> {
    /// Creates a bus without subscriptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `name`, after any existing handlers
    pub fn subscribe<F>(&mut self, name: EventName, handler: F) -> SubscriptionId
    where
        F: Fn(&mut C, &Event) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe_boxed(name, Box::new(handler))
    }

    pub fn subscribe_boxed(&mut self, name: EventName, handler: Handler<C>) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscriptions
            .entry(name)
            .or_default()
            .push(Subscription { id, handler });
        debug!("Subscribed {} to {}", id, name);
        id
    }

    /// Removes a subscription; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subs in self.subscriptions.values_mut() {
            if let Some(pos) = subs.iter().position(|sub| sub.id == id) {
                subs.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.subscriptions.get(&name).map_or(0, Vec::len)
    }

    /// Delivers `event` to every handler subscribed to its name
    pub fn publish(&self, ctx: &mut C, event: &Event) -> PublishReport {
        let name = event.name();
        let mut report = PublishReport {
            event: name,
            delivered: 0,
            failures: Vec::new(),
        };

        let Some(subs) = self.subscriptions.get(&name) else {
            debug!("No subscribers for {}", name);
            return report;
        };

        for sub in subs {
            report.delivered += 1;
            let outcome = catch_unwind(AssertUnwindSafe(|| (sub.handler)(ctx, event)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(panic) => HandlerError::new(panic_message(panic.as_ref())),
            };
            warn!("Handler {} for {} failed: {}", sub.id, name, error);
            report.failures.push(HandlerFailure {
                subscription: sub.id,
                error,
            });
        }

        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("handler panicked: {}", msg)
    } else {
        "handler panicked".to_string()
    }
}
