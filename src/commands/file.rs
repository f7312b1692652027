//! Project acquisition commands.
//!
//! Both handlers normalize in the background through [`ProjectLoader`],
//! persist the result, make it the active project and return a
//! [`ProjectSnapshot`].
//!
//! # Error contract
//! Every fallible path returns `Result<_, AppError>`. A failed load leaves
//! the store and the active project untouched.

use std::path::Path;

use crate::client::ProjectRequest;
use crate::error::AppError;
use crate::loader::ProjectLoader;
use crate::models::Project;
use crate::project::serialization::ProjectStore;
use crate::project::Schema;
use crate::state::AppState;

use super::project::ProjectSnapshot;

/// Fetch project `request.id` from the remote service.
pub async fn load_remote_inner(
    request: ProjectRequest,
    loader: &ProjectLoader,
    store: &ProjectStore,
    state: &AppState,
) -> Result<ProjectSnapshot, AppError> {
    let project = loader.load(request).await?;
    activate(project, store, state)
}

/// Normalize a project document read from `path`.
pub async fn import_file_inner(
    path: &Path,
    private: bool,
    loader: &ProjectLoader,
    store: &ProjectStore,
    state: &AppState,
) -> Result<ProjectSnapshot, AppError> {
    if !path.exists() {
        return Err(AppError::NotFound(format!("{} not found", path.display())));
    }
    let text = tokio::fs::read_to_string(path).await?;
    let project = loader
        .load_document(text, Schema::from_private(private))
        .await?;
    activate(project, store, state)
}

fn activate(
    project: Project,
    store: &ProjectStore,
    state: &AppState,
) -> Result<ProjectSnapshot, AppError> {
    store.save(&project)?;
    store.set_active(project.id)?;
    let snapshot = ProjectSnapshot::from(&project);
    state.replace_project(project)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::codec;
    use crate::project::forms::tests::StubApi;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ngfield_file_{name}_{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn load_remote_persists_and_activates() {
        let dir = temp_dir("remote");
        let store = ProjectStore::new(&dir);
        let state = AppState::default();
        let hash = codec::encode("pw", 2).expect("encode");
        let mut api = StubApi::with_form(40, 12, "Wells");
        api.project = Some(
            json!({
                "id": 33, "version": 2, "username": "u", "password": hash,
                "items": [ { "resource_cls": "formbuilder_form", "display_name": "Wells", "resource_id": 40 } ]
            })
            .to_string(),
        );
        let loader = ProjectLoader::new(Arc::new(api), "https://demo.nextgis.com");

        let request = ProjectRequest { id: 33, private: true, hash: None };
        let snap = load_remote_inner(request, &loader, &store, &state)
            .await
            .expect("load");
        assert_eq!(snap.id, 33);
        assert_eq!(snap.layers[0].layer_type, "ngfp");
        assert_eq!(store.active().unwrap(), Some(33));
        assert_eq!(store.load(33).expect("stored").layers.len(), 1);
        assert_eq!(*state.subscribe_version().borrow(), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_load_leaves_store_untouched() {
        let dir = temp_dir("failed");
        let store = ProjectStore::new(&dir);
        let state = AppState::default();
        let loader = ProjectLoader::new(Arc::new(StubApi::default()), "https://demo.nextgis.com");

        let request = ProjectRequest { id: 1, private: false, hash: None };
        assert!(load_remote_inner(request, &loader, &store, &state).await.is_err());
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.active().unwrap(), None);
    }

    #[tokio::test]
    async fn import_reads_local_document() {
        let dir = temp_dir("import");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("project.json");
        std::fs::write(
            &file,
            json!({ "id": 4, "title": "Local", "layers": [
                { "type": "tms", "title": "OSM", "url": "x" }
            ] })
            .to_string(),
        )
        .unwrap();
        let store = ProjectStore::new(dir.join("store"));
        let state = AppState::default();
        let loader = ProjectLoader::new(Arc::new(StubApi::default()), "https://demo.nextgis.com");

        let snap = import_file_inner(&file, false, &loader, &store, &state)
            .await
            .expect("import");
        assert_eq!(snap.title, "Local");
        assert_eq!(store.list().unwrap(), vec![4]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn import_of_missing_file_is_not_found() {
        let store = ProjectStore::new(temp_dir("missing"));
        let state = AppState::default();
        let loader = ProjectLoader::new(Arc::new(StubApi::default()), "");
        let result = import_file_inner(
            Path::new("/nonexistent/project.json"),
            false,
            &loader,
            &store,
            &state,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
