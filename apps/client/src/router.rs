//! View routing: maps a location to a view, gating protected views on the
//! session snapshot.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    ResumeBuilder { resume_id: Option<i64> },
    CoverLetter,
    Score,
    Portfolio,
    Skills,
    Profile,
    Admin,
}

impl Route {
    /// Parses a location such as `/resume-builder?id=4`. Unknown paths yield `None`.
    pub fn parse(location: &str) -> Option<Self> {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (location, None),
        };
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let route = match path {
            "/" => Route::Home,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/resume-builder" => Route::ResumeBuilder {
                resume_id: query.and_then(|q| query_param(q, "id")).and_then(|id| id.parse().ok()),
            },
            "/cover-letter" => Route::CoverLetter,
            "/score" => Route::Score,
            "/portfolio" => Route::Portfolio,
            "/skills" => Route::Skills,
            "/profile" => Route::Profile,
            "/admin" => Route::Admin,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::ResumeBuilder { resume_id: Some(id) } => format!("/resume-builder?id={id}"),
            Route::ResumeBuilder { resume_id: None } => "/resume-builder".to_string(),
            Route::CoverLetter => "/cover-letter".to_string(),
            Route::Score => "/score".to_string(),
            Route::Portfolio => "/portfolio".to_string(),
            Route::Skills => "/skills".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Admin => "/admin".to_string(),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home | Route::Login | Route::Register)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Route::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    /// Session restore has not settled and there is no cached profile to show.
    Loading,
    Redirect(Route),
}

/// Decides what to show for `location` given the current session.
///
/// A cached profile is enough to render a protected view while verification
/// is still running; the loader only appears when there is nothing to show.
pub fn resolve(location: &str, session: &SessionSnapshot) -> Resolution {
    let Some(route) = Route::parse(location) else {
        debug!("Unknown location {location}; redirecting home");
        return Resolution::Redirect(Route::Home);
    };

    if !route.is_protected() {
        return Resolution::Render(route);
    }

    match &session.user {
        None if session.loading => Resolution::Loading,
        None => Resolution::Redirect(Route::Login),
        Some(user) if route.requires_admin() && !user.is_admin() => {
            Resolution::Redirect(Route::Dashboard)
        }
        Some(_) => Resolution::Render(route),
    }
}

/// Performs redirects on behalf of the gateway and views.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// In-memory location history.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![initial.into()]),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for History {
    fn current_path(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, path: &str) {
        debug!("Navigating to {path}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
