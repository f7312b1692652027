//! Stored-project query commands.
//!
//! [`ProjectSnapshot`] is the lightweight view printed for a project: its
//! metadata plus one summary line per layer, without credentials.

use serde::Serialize;

use crate::error::AppError;
use crate::models::{Project, Resource};
use crate::project::serialization::ProjectStore;
use crate::state::{read_project, AppState};

/// One layer as shown to the user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    /// Path key; also the id of the matching resource-tree leaf.
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub url: String,
    pub visible: bool,
}

/// Serializable snapshot of a project.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub id: i64,
    pub title: String,
    pub version: u32,
    pub private: bool,
    /// `true` when the project opens on the map rather than the list.
    pub map_main: bool,
    /// `[minX, minY, maxX, maxY]`, absent when the feed had no extent.
    pub extent: Option<[f64; 4]>,
    pub layers: Vec<LayerSummary>,
}

impl From<&Project> for ProjectSnapshot {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            version: p.version(),
            private: p.private,
            map_main: p.is_map_main(),
            extent: (!p.extent.is_absent())
                .then(|| [p.extent.min_x, p.extent.min_y, p.extent.max_x, p.extent.max_y]),
            layers: p
                .layers
                .iter()
                .map(|l| LayerSummary {
                    key: l.path_key(),
                    title: l.title.clone(),
                    layer_type: l.type_tag().to_string(),
                    url: l.url.clone(),
                    visible: l.visible,
                })
                .collect(),
        }
    }
}

fn resolve_id(id: Option<i64>, store: &ProjectStore) -> Result<i64, AppError> {
    match id {
        Some(id) => Ok(id),
        None => store
            .active()?
            .ok_or_else(|| AppError::NotFound("no active project".to_string())),
    }
}

/// Load project `id` (or the active one) from `store`, make it the active
/// project in `state`, and return its snapshot.
pub fn show_inner(
    id: Option<i64>,
    store: &ProjectStore,
    state: &AppState,
) -> Result<ProjectSnapshot, AppError> {
    let id = resolve_id(id, store)?;
    let project = store.load(id)?;
    let snapshot = ProjectSnapshot::from(&project);
    state.replace_project(project)?;
    store.set_active(id)?;
    Ok(snapshot)
}

/// Children of tree node `node` (top level when blank) of project `id`.
pub fn level_inner(
    id: Option<i64>,
    node: &str,
    store: &ProjectStore,
) -> Result<Vec<Resource>, AppError> {
    let id = resolve_id(id, store)?;
    store.load(id)?.level(node)
}

pub fn list_inner(store: &ProjectStore) -> Result<Vec<i64>, AppError> {
    store.list()
}

/// Delete project `id`; resets `state` when it was the one held there.
pub fn remove_inner(id: i64, store: &ProjectStore, state: &AppState) -> Result<(), AppError> {
    store.delete(id)?;
    let held = read_project(&state.project)?.id;
    if held == id {
        state.replace_project(Project::default())?;
    }
    Ok(())
}
