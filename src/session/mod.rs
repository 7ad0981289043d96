//! Session context shared with the backend.
//!
//! The web console scoped every backend URL by a `projectId` cookie; here
//! the same context lives behind a small trait so any host (browser shim,
//! CLI, test) can supply it.

use std::sync::Mutex;

/// Read-only view of the current session context.
pub trait SessionStore: Send + Sync {
    /// The selected project, if any.
    ///
    /// `None` means "no project selected"; callers must not treat it as a
    /// real identifier.
    fn project_id(&self) -> Option<String>;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySession {
    project_id: Mutex<Option<String>>,
}

impl MemorySession {
    /// Create a store with no project selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store scoped to `project_id`.
    pub fn with_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Mutex::new(Some(project_id.into())),
        }
    }

    /// Select or clear the project.
    pub fn set_project_id(&self, project_id: Option<String>) {
        *self.project_id.lock().expect("session mutex poisoned") = project_id;
    }
}

impl SessionStore for MemorySession {
    fn project_id(&self) -> Option<String> {
        self.project_id
            .lock()
            .expect("session mutex poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session() {
        let session = MemorySession::new();
        assert_eq!(session.project_id(), None);
    }

    #[test]
    fn test_select_and_clear_project() {
        let session = MemorySession::new();
        session.set_project_id(Some("prj-1".into()));
        assert_eq!(session.project_id().as_deref(), Some("prj-1"));

        session.set_project_id(None);
        assert_eq!(session.project_id(), None);
    }
}
