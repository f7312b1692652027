//! Shared application state.
//!
//! [`AppState`] holds the active project and the version on-change hook.
//! Observers call [`AppState::subscribe_version`] and are woken whenever
//! [`AppState::update_version`] stores a different version.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;

use crate::error::AppError;
use crate::models::Project;

/// Root application state.
///
/// The project is wrapped in an [`RwLock`] so concurrent read commands do not
/// block each other.
pub struct AppState {
    /// The active project, guarded for concurrent read access.
    pub project: RwLock<Project>,
    version_tx: watch::Sender<u32>,
}

impl Default for AppState {
    fn default() -> Self {
        let project = Project::default();
        let (version_tx, _) = watch::channel(project.version());
        Self {
            project: RwLock::new(project),
            version_tx,
        }
    }
}

impl AppState {
    /// Make `project` the active project and announce its version.
    pub fn replace_project(&self, project: Project) -> Result<(), AppError> {
        let version = project.version();
        *write_project(&self.project)? = project;
        self.version_tx.send_replace(version);
        Ok(())
    }

    /// Store a server-announced version on the active project.
    ///
    /// Returns `true` and notifies subscribers when the version changed.
    pub fn update_version(&self, version: u32) -> Result<bool, AppError> {
        let changed = write_project(&self.project)?.set_version(version);
        if let Some(previous) = changed {
            tracing::info!(previous, version, "project version changed");
            self.version_tx.send_replace(version);
        }
        Ok(changed.is_some())
    }

    pub fn subscribe_version(&self) -> watch::Receiver<u32> {
        self.version_tx.subscribe()
    }
}

pub(crate) fn read_project(
    lock: &RwLock<Project>,
) -> Result<RwLockReadGuard<'_, Project>, AppError> {
    lock.read()
        .map_err(|e| AppError::Io(format!("project lock poisoned: {e}")))
}

pub(crate) fn write_project(
    lock: &RwLock<Project>,
) -> Result<RwLockWriteGuard<'_, Project>, AppError> {
    lock.write()
        .map_err(|e| AppError::Io(format!("project lock poisoned: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_default_constructs_without_panic() {
        let state = AppState::default();
        let project = read_project(&state.project).expect("read project lock");
        assert_eq!(project.id, -1);
        assert_eq!(project.version(), 0);
    }

    #[test]
    fn update_version_notifies_only_on_change() {
        let state = AppState::default();
        let mut rx = state.subscribe_version();
        assert!(!rx.has_changed().expect("sender alive"));

        assert!(!state.update_version(0).expect("update"));
        assert!(!rx.has_changed().expect("sender alive"));

        assert!(state.update_version(3).expect("update"));
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), 3);
        assert_eq!(read_project(&state.project).unwrap().version(), 3);
    }

    #[test]
    fn replace_project_announces_new_version() {
        let state = AppState::default();
        let rx = state.subscribe_version();
        let mut project = Project::default();
        project.id = 11;
        project.set_version(5);

        state.replace_project(project).expect("replace");
        assert_eq!(*rx.borrow(), 5);
        assert_eq!(read_project(&state.project).unwrap().id, 11);
    }

    #[test]
    fn project_lock_allows_write() {
        let state = AppState::default();
        {
            let mut project = write_project(&state.project).expect("write project lock");
            project.title = "Test Project".to_string();
        }
        let project = read_project(&state.project).expect("read project lock");
        assert_eq!(project.title, "Test Project");
    }
}
