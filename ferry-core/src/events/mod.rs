//! Event bus
//!
//! Views talk to each other through named events: a view finishes an
//! operation, publishes an event, and whatever is subscribed reacts by
//! navigating, notifying the operator or refreshing a list.

mod bus;
mod defaults;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use bus::{EventBus, Handler, HandlerError, HandlerFailure, PublishReport, SubscriptionId};
pub use defaults::{AppShell, default_handlers};

/// Names of the events views can publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "APP_LOGIN_SUCCESS")]
    LoginSuccess,
    #[serde(rename = "APP_LOGOUT")]
    Logout,
    #[serde(rename = "APP_PAGE_LOADED")]
    PageLoaded,
    #[serde(rename = "APP_AUTH_FAILED")]
    AuthFailed,
    #[serde(rename = "APP_BAD_REQUEST")]
    BadRequest,
    #[serde(rename = "APP_ACCESS_DENIED")]
    AccessDenied,
    #[serde(rename = "APP_RESOURCE_DELETED")]
    ResourceDeleted,
    #[serde(rename = "APP_RESOURCE_UPDATED")]
    ResourceUpdated,
    #[serde(rename = "APP_SHOW_SNACKBAR")]
    ShowSnackbar,
    #[serde(rename = "FUNC_GET_FUNCTIONS_LIST")]
    FunctionsList,
    #[serde(rename = "FILE_UPLOADED")]
    FileUploaded,
    #[serde(rename = "REFRESH_BUCKETS_LIST")]
    RefreshBucketsList,
    #[serde(rename = "STORAGE_BUCKETS_COUNT")]
    StorageBucketsCount,
}

impl EventName {
    pub const ALL: [EventName; 13] = [
        EventName::LoginSuccess,
        EventName::Logout,
        EventName::PageLoaded,
        EventName::AuthFailed,
        EventName::BadRequest,
        EventName::AccessDenied,
        EventName::ResourceDeleted,
        EventName::ResourceUpdated,
        EventName::ShowSnackbar,
        EventName::FunctionsList,
        EventName::FileUploaded,
        EventName::RefreshBucketsList,
        EventName::StorageBucketsCount,
    ];

    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::LoginSuccess => "APP_LOGIN_SUCCESS",
            EventName::Logout => "APP_LOGOUT",
            EventName::PageLoaded => "APP_PAGE_LOADED",
            EventName::AuthFailed => "APP_AUTH_FAILED",
            EventName::BadRequest => "APP_BAD_REQUEST",
            EventName::AccessDenied => "APP_ACCESS_DENIED",
            EventName::ResourceDeleted => "APP_RESOURCE_DELETED",
            EventName::ResourceUpdated => "APP_RESOURCE_UPDATED",
            EventName::ShowSnackbar => "APP_SHOW_SNACKBAR",
            EventName::FunctionsList => "FUNC_GET_FUNCTIONS_LIST",
            EventName::FileUploaded => "FILE_UPLOADED",
            EventName::RefreshBucketsList => "REFRESH_BUCKETS_LIST",
            EventName::StorageBucketsCount => "STORAGE_BUCKETS_COUNT",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown event name: {}", s))
    }
}

/// Severity of an operator notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn new(level: NotificationLevel, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, text)
    }
}

/// An event together with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    LoginSuccess,
    Logout,
    PageLoaded,
    AuthFailed,
    BadRequest(String),
    AccessDenied(String),
    ResourceDeleted(String),
    ResourceUpdated(String),
    ShowSnackbar(Notification),
    FunctionsList,
    FileUploaded { bucket: String, key: String },
    RefreshBucketsList,
    StorageBucketsCount(usize),
}

impl Event {
    pub fn name(&self) -> EventName {
        match self {
            Event::LoginSuccess => EventName::LoginSuccess,
            Event::Logout => EventName::Logout,
            Event::PageLoaded => EventName::PageLoaded,
            Event::AuthFailed => EventName::AuthFailed,
            Event::BadRequest(_) => EventName::BadRequest,
            Event::AccessDenied(_) => EventName::AccessDenied,
            Event::ResourceDeleted(_) => EventName::ResourceDeleted,
            Event::ResourceUpdated(_) => EventName::ResourceUpdated,
            Event::ShowSnackbar(_) => EventName::ShowSnackbar,
            Event::FunctionsList => EventName::FunctionsList,
            Event::FileUploaded { .. } => EventName::FileUploaded,
            Event::RefreshBucketsList => EventName::RefreshBucketsList,
            Event::StorageBucketsCount(_) => EventName::StorageBucketsCount,
        }
    }
}
