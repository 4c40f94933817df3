//! Router guard
//!
//! Protected routes can only be entered while the persisted `authenticated`
//! flag is the literal `"true"`; any other value (or none) sends the
//! operator to the login view. Public routes are always reachable.

use tracing::debug;

use super::{ResolvedRoute, RouteError, RouteTable, Visibility};
use crate::state::{StateStore, is_authenticated};

/// Path of the login view
pub const LOGIN_PATH: &str = "/login";

/// Result of a guarded navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The requested route may be entered
    Proceed(ResolvedRoute),
    /// The requested route is protected and the operator is not logged in
    LoginRequired {
        requested: ResolvedRoute,
        login: ResolvedRoute,
    },
}

impl Navigation {
    /// The route navigation actually lands on
    pub fn destination(&self) -> &ResolvedRoute {
        match self {
            Navigation::Proceed(route) => route,
            Navigation::LoginRequired { login, .. } => login,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Navigation::Proceed(_))
    }
}

/// Route table plus the authentication guard
#[derive(Debug, Clone, Default)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolves `path` and applies the guard against the persisted state
    pub fn navigate(&self, path: &str, state: &dyn StateStore) -> Result<Navigation, RouteError> {
        let route = self.table.resolve(path)?;

        if route.visibility == Visibility::Public || is_authenticated(state) {
            debug!("Navigation to {} allowed ({})", path, route.path);
            return Ok(Navigation::Proceed(route));
        }

        debug!("Navigation to {} requires login", path);
        let login = self.table.resolve(LOGIN_PATH)?;
        Ok(Navigation::LoginRequired {
            requested: route,
            login,
        })
    }
}
