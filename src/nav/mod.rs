//! Navigation boundary.
//!
//! # Responsibilities
//! - Report the current location (path + query)
//! - Perform the login redirect when a session expires
//!
//! The pipeline only ever navigates to the login route; everything else is
//! the host application's business.

use std::sync::Mutex;

/// A location within the console, path plus optional query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Path component, e.g. `/replicas/abc`.
    pub path: String,
    /// Query string without the leading `?`, when present.
    pub query: Option<String>,
}

impl Location {
    /// Build a location from a `path?query` string.
    pub fn parse(target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: Some(query.to_string()),
            },
            None => Self {
                path: target.to_string(),
                query: None,
            },
        }
    }

    /// Path and query joined back together.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// Host-provided navigation capability.
pub trait Navigator: Send + Sync {
    /// Where the user currently is.
    fn current_location(&self) -> Location;

    /// Imperatively move the user to `target` (a `path?query` string).
    fn navigate(&self, target: &str);
}

/// Build the login redirect target, preserving the current location as a
/// `prev` query value so the user returns where they were.
pub fn login_redirect(login_path: &str, current: &Location) -> String {
    let prev = current.path_and_query();
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("prev", &prev)
        .finish();
    format!("{login_path}?{query}")
}

/// In-memory navigator; `navigate` records where it was sent.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    location: Mutex<Location>,
}

impl MemoryNavigator {
    /// Start at the root path.
    pub fn new() -> Self {
        Self {
            location: Mutex::new(Location::parse("/")),
        }
    }

    /// Start at `target`.
    pub fn at(target: &str) -> Self {
        Self {
            location: Mutex::new(Location::parse(target)),
        }
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> Location {
        self.location
            .lock()
            .expect("navigator mutex poisoned")
            .clone()
    }

    fn navigate(&self, target: &str) {
        tracing::info!(target = %target, "Navigating");
        *self.location.lock().expect("navigator mutex poisoned") = Location::parse(target);
    }
}
