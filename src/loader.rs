//! Background project loading.
//!
//! Fetching the feed, resolving forms and normalizing all block, so each
//! load runs on tokio's blocking pool. [`ProjectLoader::load`] returns the
//! outcome to an awaiting caller; [`ProjectLoader::load_with_callback`]
//! delivers it through a [`ProjectCallback`] exactly once.
//!
//! Every callback request is tagged with a [`LoadTicket`]. A new request
//! supersedes the previous ones without cancelling them: each still hears
//! its outcome, and the ticket tells the caller whether that outcome is
//! stale.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::client::{NgwApi, ProjectRequest};
use crate::error::AppError;
use crate::models::Project;
use crate::project::{Normalizer, Schema};

/// Identifies one [`ProjectLoader::load_with_callback`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: u64,
    /// `false` when a newer request was started before this one finished.
    pub current: bool,
}

/// Receiver of a load outcome. Exactly one method runs per request.
pub trait ProjectCallback: Send + 'static {
    fn on_project_ready(self: Box<Self>, ticket: LoadTicket, project: Project);
    fn on_project_get_error(self: Box<Self>, ticket: LoadTicket, message: String);
}

/// Loads projects off the caller's task.
#[derive(Clone)]
pub struct ProjectLoader {
    api: Arc<dyn NgwApi>,
    base_url: Arc<str>,
    generation: Arc<AtomicU64>,
}

impl ProjectLoader {
    pub fn new(api: Arc<dyn NgwApi>, base_url: impl Into<Arc<str>>) -> Self {
        Self {
            api,
            base_url: base_url.into(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch and normalize the project described by `request`.
    pub async fn load(&self, request: ProjectRequest) -> Result<Project, AppError> {
        let api = Arc::clone(&self.api);
        let base_url = Arc::clone(&self.base_url);
        run_blocking(move || fetch_and_normalize(api.as_ref(), &base_url, &request)).await
    }

    /// Normalize an already-fetched document. Forms are still resolved
    /// through the remote service.
    pub async fn load_document(&self, text: String, schema: Schema) -> Result<Project, AppError> {
        let api = Arc::clone(&self.api);
        let base_url = Arc::clone(&self.base_url);
        run_blocking(move || {
            Normalizer::new(&base_url)
                .with_api(api.as_ref())
                .normalize_str(&text, schema)
        })
        .await
    }

    /// Start a load and report its outcome through `callback`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load_with_callback(
        &self,
        request: ProjectRequest,
        callback: Box<dyn ProjectCallback>,
    ) -> tokio::task::JoinHandle<()> {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let loader = self.clone();
        tokio::spawn(async move {
            let project_id = request.id;
            let outcome = loader.load(request).await;
            let ticket = LoadTicket {
                id,
                current: loader.is_current(id),
            };
            if !ticket.current {
                tracing::debug!(project_id, ticket = id, "delivering superseded project load");
            }
            match outcome {
                Ok(project) => callback.on_project_ready(ticket, project),
                Err(e) => {
                    tracing::warn!(project_id, error = %e, "project load failed");
                    callback.on_project_get_error(ticket, e.to_string());
                }
            }
        })
    }

    /// `true` while no request newer than ticket `id` has been started.
    pub fn is_current(&self, id: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == id
    }
}

fn fetch_and_normalize(
    api: &dyn NgwApi,
    base_url: &str,
    request: &ProjectRequest,
) -> Result<Project, AppError> {
    tracing::info!(project_id = request.id, private = request.private, "loading project");
    let text = api
        .fetch_project(request)
        .map_err(|e| AppError::ProjectLoad(format!("cannot fetch project {}: {e}", request.id)))?;
    Normalizer::new(base_url)
        .with_api(api)
        .normalize_str(&text, Schema::from_private(request.private))
}

async fn run_blocking<F>(work: F) -> Result<Project, AppError>
where
    F: FnOnce() -> Result<Project, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::ProjectLoad(format!("project load task panicked: {e}")))?
}
