//! Default handlers registered at startup

use super::bus::{EventBus, Handler, HandlerError};
use super::{Event, EventName, Notification};
use crate::routes::LOGIN_PATH;

/// What the default handlers act on: the application shell
pub trait AppShell {
    /// Moves to `path`, keeping the current location in history
    fn navigate(&mut self, path: &str);

    /// Moves to `path`, replacing the current location
    fn replace(&mut self, path: &str);

    /// Shows a transient notification
    fn notify(&mut self, notification: Notification);
}

type DefaultHandler = fn(&mut dyn AppShell, &Event) -> Result<(), HandlerError>;

const DEFAULT_HANDLERS: &[(EventName, DefaultHandler)] = &[
    (EventName::LoginSuccess, on_login_success),
    (EventName::Logout, on_logout),
    (EventName::PageLoaded, ignore),
    (EventName::AuthFailed, on_auth_failed),
    (EventName::BadRequest, on_bad_request),
    (EventName::AccessDenied, on_access_denied),
    (EventName::ResourceDeleted, on_resource_changed),
    (EventName::ResourceUpdated, on_resource_changed),
    (EventName::ShowSnackbar, on_show_snackbar),
    (EventName::FunctionsList, ignore),
    (EventName::FileUploaded, ignore),
    (EventName::RefreshBucketsList, ignore),
    (EventName::StorageBucketsCount, ignore),
];

/// The default handler for every event name, in declaration order
pub fn default_handlers<C: AppShell + 'static>() -> Vec<(EventName, Handler<C>)> {
    DEFAULT_HANDLERS
        .iter()
        .map(|&(name, handler)| {
            let boxed: Handler<C> = Box::new(move |ctx: &mut C, event: &Event| handler(ctx, event));
            (name, boxed)
        })
        .collect()
}

impl<C: AppShell + 'static> EventBus<C> {
    /// Creates a bus with the default handlers already subscribed
    pub fn with_default_handlers() -> Self {
        let mut bus = Self::new();
        for (name, handler) in default_handlers() {
            bus.subscribe_boxed(name, handler);
        }
        bus
    }
}

fn unexpected(event: &Event) -> HandlerError {
    HandlerError::new(format!("unexpected payload for {}", event.name()))
}

fn ignore(_: &mut dyn AppShell, _: &Event) -> Result<(), HandlerError> {
    Ok(())
}

fn on_login_success(shell: &mut dyn AppShell, _: &Event) -> Result<(), HandlerError> {
    shell.navigate("/");
    Ok(())
}

fn on_logout(shell: &mut dyn AppShell, _: &Event) -> Result<(), HandlerError> {
    shell.notify(Notification::success("Logout successfully."));
    shell.replace(LOGIN_PATH);
    Ok(())
}

fn on_auth_failed(shell: &mut dyn AppShell, _: &Event) -> Result<(), HandlerError> {
    shell.navigate(LOGIN_PATH);
    shell.notify(Notification::error("Token has expired"));
    Ok(())
}

fn on_bad_request(shell: &mut dyn AppShell, event: &Event) -> Result<(), HandlerError> {
    let Event::BadRequest(msg) = event else {
        return Err(unexpected(event));
    };
    shell.notify(Notification::error(msg.clone()));
    Ok(())
}

fn on_access_denied(shell: &mut dyn AppShell, event: &Event) -> Result<(), HandlerError> {
    let Event::AccessDenied(msg) = event else {
        return Err(unexpected(event));
    };
    shell.notify(Notification::error(msg.clone()));
    shell.navigate("/403");
    Ok(())
}

fn on_resource_changed(shell: &mut dyn AppShell, event: &Event) -> Result<(), HandlerError> {
    match event {
        Event::ResourceDeleted(msg) | Event::ResourceUpdated(msg) => {
            shell.notify(Notification::success(msg.clone()));
            Ok(())
        }
        _ => Err(unexpected(event)),
    }
}

fn on_show_snackbar(shell: &mut dyn AppShell, event: &Event) -> Result<(), HandlerError> {
    let Event::ShowSnackbar(notification) = event else {
        return Err(unexpected(event));
    };
    shell.notify(notification.clone());
    Ok(())
}
