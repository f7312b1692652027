//! Atomic save and validated load of normalized projects.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/
//! ├── active        id of the project opened last
//! └── projects/<id>/
//!     ├── project.json  Project::to_json
//!     └── tree.json     resource tree text
//! ```
//!
//! # Save
//! Each file is written to `<name>.tmp` in the same directory, then renamed
//! over the target. On failure the temp file is removed and the previous
//! file is left intact.
//!
//! # Load
//! `project.json` is parsed back through the public schema path, then the
//! tree is restored from `tree.json` (an empty tree when it is missing).

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::{Project, ResourceTree};

const PROJECT_JSON: &str = "project.json";
const TREE_JSON: &str = "tree.json";
const ACTIVE_KEY: &str = "active";

/// File-backed store of normalized projects.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, id: i64) -> PathBuf {
        self.root.join("projects").join(id.to_string())
    }

    /// Write `project` and its tree, replacing any previous copy.
    pub fn save(&self, project: &Project) -> Result<(), AppError> {
        let dir = self.project_dir(project.id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::Io(format!("cannot create {}: {e}", dir.display())))?;

        let json = serde_json::to_string_pretty(&project.to_json())
            .map_err(|e| AppError::Io(format!("cannot serialize project: {e}")))?;
        write_atomic(&dir.join(PROJECT_JSON), json.as_bytes())?;
        write_atomic(&dir.join(TREE_JSON), project.tree.as_bytes())?;

        tracing::info!(project_id = project.id, dir = %dir.display(), "project saved");
        Ok(())
    }

    /// Read project `id` back. Returns [`AppError::NotFound`] if it was never
    /// saved and [`AppError::ProjectLoad`] if its files are unreadable.
    pub fn load(&self, id: i64) -> Result<Project, AppError> {
        let dir = self.project_dir(id);
        let project_path = dir.join(PROJECT_JSON);
        if !project_path.exists() {
            return Err(AppError::NotFound(format!("project {id} not found")));
        }

        let text = std::fs::read_to_string(&project_path)
            .map_err(|e| AppError::ProjectLoad(format!("cannot read {PROJECT_JSON}: {e}")))?;
        let mut project = Project::from_json(&text)?;

        let tree_path = dir.join(TREE_JSON);
        let tree = if tree_path.exists() {
            std::fs::read_to_string(&tree_path)
                .map_err(|e| AppError::ProjectLoad(format!("cannot read {TREE_JSON}: {e}")))?
        } else {
            tracing::warn!(project_id = id, "tree.json missing, using an empty tree");
            "[]".to_string()
        };
        // Validate before accepting; the picker would fail later otherwise.
        ResourceTree::from_json(&tree)?;
        project.tree = tree;

        Ok(project)
    }

    /// Delete project `id`, clearing the active key if it pointed at it.
    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        let dir = self.project_dir(id);
        if !dir.exists() {
            return Err(AppError::NotFound(format!("project {id} not found")));
        }
        std::fs::remove_dir_all(&dir)?;
        if self.active()? == Some(id) {
            std::fs::remove_file(self.root.join(ACTIVE_KEY))?;
        }
        tracing::info!(project_id = id, "project deleted");
        Ok(())
    }

    /// Ids of all saved projects, ascending.
    pub fn list(&self) -> Result<Vec<i64>, AppError> {
        let dir = self.root.join("projects");
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(|n| n.parse().ok()) {
                if entry.path().join(PROJECT_JSON).exists() {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn set_active(&self, id: i64) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.root)?;
        write_atomic(&self.root.join(ACTIVE_KEY), id.to_string().as_bytes())
    }

    pub fn active(&self) -> Result<Option<i64>, AppError> {
        let path = self.root.join(ACTIVE_KEY);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(text.trim().parse().ok())
    }
}

/// Write `bytes` to `<path>.tmp` then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    if let Err(e) = std::fs::write(&tmp_path, bytes) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(AppError::Io(format!("cannot write {file_name}: {e}")));
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        AppError::Io(format!("rename to {file_name} failed: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Normalizer, Schema};

    fn temp_store(name: &str) -> ProjectStore {
        let dir = std::env::temp_dir()
            .join(format!("ngfield_store_{name}_{}", uuid::Uuid::new_v4()));
        ProjectStore::new(dir)
    }

    fn sample_project() -> Project {
        let doc = r#"{
            "id": 5,
            "title": "Wells",
            "screen": "list",
            "version": 1,
            "url": "https://demo.nextgis.com",
            "initial_extent": [1, 2, 3, 4],
            "layers": [
                { "type": "tms", "title": "OSM", "url": "https://tile.osm.org/{z}/{x}/{y}.png" },
                { "type": "dir", "title": "Data", "layers": [
                    { "type": "ngw", "title": "Wells", "resource_id": 12, "editable": true }
                ]}
            ]
        }"#;
        Normalizer::new("")
            .normalize_str(doc, Schema::Public)
            .expect("normalize sample")
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store("round_trip");
        let project = sample_project();

        store.save(&project).expect("save should succeed");
        let loaded = store.load(5).expect("load should succeed");
        let _ = std::fs::remove_dir_all(store.root());

        assert_eq!(loaded, project);
        assert_eq!(loaded.level("").expect("level").len(), 2);
    }

    #[test]
    fn load_of_unknown_project_is_not_found() {
        let store = temp_store("missing");
        assert!(matches!(store.load(99), Err(AppError::NotFound(_))));
    }

    #[test]
    fn corrupt_project_json_is_a_load_error() {
        let store = temp_store("corrupt");
        let dir = store.root().join("projects").join("3");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PROJECT_JSON), "{ truncated").unwrap();

        let result = store.load(3);
        let _ = std::fs::remove_dir_all(store.root());
        assert!(matches!(result, Err(AppError::ProjectLoad(_))));
    }

    #[test]
    fn missing_tree_loads_as_empty() {
        let store = temp_store("no_tree");
        let project = sample_project();
        store.save(&project).unwrap();
        std::fs::remove_file(store.root().join("projects/5").join(TREE_JSON)).unwrap();

        let loaded = store.load(5).expect("load");
        let _ = std::fs::remove_dir_all(store.root());
        assert!(loaded.level("").expect("level").is_empty());
        assert_eq!(loaded.layers.len(), 2);
    }

    #[test]
    fn delete_clears_active_key() {
        let store = temp_store("delete");
        let project = sample_project();
        store.save(&project).unwrap();
        store.set_active(5).unwrap();
        assert_eq!(store.active().unwrap(), Some(5));
        assert_eq!(store.list().unwrap(), vec![5]);

        store.delete(5).expect("delete");
        assert_eq!(store.active().unwrap(), None);
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(store.delete(5), Err(AppError::NotFound(_))));
        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let store = temp_store("tmp_files");
        store.save(&sample_project()).unwrap();
        let names: Vec<_> = std::fs::read_dir(store.root().join("projects/5"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        let _ = std::fs::remove_dir_all(store.root());
        assert!(names.iter().all(|n| !n.ends_with(".tmp")), "got {names:?}");
        assert_eq!(names.len(), 2);
    }
}
