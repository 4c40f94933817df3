//! Route table
//!
//! Static mapping from URL paths to views. Each route carries a visibility
//! flag that the router guard (see [`guard`]) checks before a view is
//! entered. Routes may redirect (by path or by route name) and may nest
//! children under a layout route; child paths are absolute.

pub mod guard;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

pub use guard::{LOGIN_PATH, Navigation, Router};

/// Errors raised while resolving a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("path must start with '/': {0}")]
    InvalidPath(String),

    #[error("no route named '{0}'")]
    UnknownRouteName(String),

    #[error("redirect loop while resolving '{0}'")]
    RedirectLoop(String),
}

/// Whether a route can be entered without logging in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Protected,
}

/// Views a route can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    NotFound,
    AccessDenied,
    ServerError,
    Login,
    DashboardLayout,
    Functions,
    Logs,
    Settings,
    BucketContent,
}

/// Where a redirecting route sends navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Path(&'static str),
    Named(&'static str),
}

/// A single route declaration
#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub view: Option<View>,
    pub visibility: Visibility,
    pub redirect: Option<Redirect>,
    /// Path parameters are handed to the view as properties
    pub props: bool,
    pub children: Vec<Route>,
}

impl Route {
    pub fn new(path: &'static str, visibility: Visibility) -> Self {
        Self {
            path,
            name: None,
            view: None,
            visibility,
            redirect: None,
            props: false,
            children: Vec::new(),
        }
    }

    pub fn public(path: &'static str) -> Self {
        Self::new(path, Visibility::Public)
    }

    pub fn protected(path: &'static str) -> Self {
        Self::new(path, Visibility::Protected)
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    pub fn redirect(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn with_props(mut self) -> Self {
        self.props = true;
        self
    }

    pub fn children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }

    fn is_catch_all(&self) -> bool {
        self.path == "*"
    }

    /// Matches `segments` against this route's path pattern
    fn capture(&self, segments: &[&str]) -> Option<BTreeMap<String, String>> {
        if self.is_catch_all() {
            return Some(BTreeMap::new());
        }

        let pattern = split_path(self.path);
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, actual) in pattern.iter().zip(segments) {
            if let Some(param) = expected.strip_prefix(':') {
                params.insert(param.to_string(), actual.to_string());
            } else if expected != actual {
                return None;
            }
        }
        Some(params)
    }
}

/// Outcome of resolving a path against the table, redirects included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    /// Path navigation ends on
    pub path: String,
    pub name: Option<&'static str>,
    pub view: Option<View>,
    pub visibility: Visibility,
    pub params: BTreeMap<String, String>,
    /// Names of the enclosing layout routes, outermost first
    pub layouts: Vec<&'static str>,
    /// The originally requested path when a redirect was followed
    pub redirected_from: Option<String>,
}

/// The console's route table
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(default_routes())
    }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds a route by name anywhere in the tree
    pub fn find_by_name(&self, name: &str) -> Option<&Route> {
        fn walk<'a>(routes: &'a [Route], name: &str) -> Option<&'a Route> {
            routes.iter().find_map(|route| {
                if route.name == Some(name) {
                    Some(route)
                } else {
                    walk(&route.children, name)
                }
            })
        }
        walk(&self.routes, name)
    }

    /// Resolves `path`, following redirects, without applying the guard
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, RouteError> {
        const MAX_REDIRECTS: usize = 8;

        let requested = strip_query(path);
        if !requested.starts_with('/') {
            return Err(RouteError::InvalidPath(path.to_string()));
        }

        let chains = self.match_order();
        let mut current = requested.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let segments = split_path(&current);
            let Some((chain, params)) = chains.iter().find_map(|chain| {
                let leaf = chain.last()?;
                leaf.capture(&segments).map(|params| (chain, params))
            }) else {
                // Without a catch-all an unknown path has nowhere to go.
                return Err(RouteError::InvalidPath(current));
            };

            let leaf = chain[chain.len() - 1];
            match leaf.redirect {
                Some(Redirect::Path(target)) => current = target.to_string(),
                Some(Redirect::Named(name)) => {
                    let target = self
                        .find_by_name(name)
                        .ok_or_else(|| RouteError::UnknownRouteName(name.to_string()))?;
                    current = target.path.to_string();
                }
                None => {
                    let redirected_from = (current != requested).then(|| requested.to_string());
                    return Ok(ResolvedRoute {
                        path: current,
                        name: leaf.name,
                        view: leaf.view,
                        visibility: leaf.visibility,
                        params,
                        layouts: chain[..chain.len() - 1]
                            .iter()
                            .filter_map(|route| route.name)
                            .collect(),
                        redirected_from,
                    });
                }
            }
        }

        Err(RouteError::RedirectLoop(requested.to_string()))
    }

    /// Route chains (layout..leaf) in matching priority
    ///
    /// Children are registered before their parent, the first route to
    /// claim a path keeps it, and catch-all routes are tried last.
    fn match_order(&self) -> Vec<Vec<&Route>> {
        fn flatten<'a>(
            routes: &'a [Route],
            parents: &[&'a Route],
            seen: &mut Vec<&'static str>,
            out: &mut Vec<Vec<&'a Route>>,
        ) {
            for route in routes {
                let mut chain = parents.to_vec();
                chain.push(route);
                flatten(&route.children, &chain, seen, out);
                if !seen.contains(&route.path) {
                    seen.push(route.path);
                    out.push(chain);
                }
            }
        }

        let mut chains = Vec::new();
        flatten(&self.routes, &[], &mut Vec::new(), &mut chains);
        let (catch_all, mut ordered): (Vec<_>, Vec<_>) = chains
            .into_iter()
            .partition(|chain| chain.last().is_some_and(|route| route.is_catch_all()));
        ordered.extend(catch_all);
        ordered
    }
}

/// The console's routes
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::public("*").redirect(Redirect::Path("/404")),
        Route::public("/404").named("NotFound").view(View::NotFound),
        Route::public("/403")
            .named("AccessDenied")
            .view(View::AccessDenied),
        Route::public("/500")
            .named("ServerError")
            .view(View::ServerError),
        Route::public(LOGIN_PATH).named("Login").view(View::Login),
        Route::protected("/")
            .named("Root")
            .redirect(Redirect::Named("Functions")),
        Route::protected("/services")
            .named("Layout")
            .view(View::DashboardLayout)
            .children(vec![
                Route::protected("/services")
                    .named("Functions")
                    .view(View::Functions),
                Route::protected("/logs/:serviceName")
                    .named("Logs")
                    .view(View::Logs),
                Route::protected("/settings")
                    .named("Settings")
                    .view(View::Settings)
                    .with_props(),
                Route::protected("/buckets/:bucketName")
                    .named("BucketContent")
                    .view(View::BucketContent)
                    .with_props(),
            ]),
    ]
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
