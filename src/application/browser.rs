//! UI-facing facade: one pagination controller plus debounced search input.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::controller::{
    FetchOutcome, PaginationConfig, PaginationController, VisibleState,
};
use crate::application::debounce::SearchDebouncer;
use crate::application::repos::CatalogRepo;
use crate::cache::PageCache;
use crate::domain::error::DomainError;
use crate::domain::filter::FilterModel;

/// A catalog listing as seen by a screen.
///
/// Typed search terms are debounced before they replace the search term of
/// the active filter. Dropping the browser stops the commit task and cancels
/// any pending search.
pub struct CatalogBrowser {
    controller: PaginationController,
    debouncer: SearchDebouncer,
    commit_task: JoinHandle<()>,
}

impl CatalogBrowser {
    /// Must be called from within a Tokio runtime.
    pub fn new(
        catalog: Arc<dyn CatalogRepo>,
        cache: Arc<PageCache>,
        config: PaginationConfig,
        quiet_period: std::time::Duration,
    ) -> Self {
        let controller = PaginationController::new(catalog, cache, config);
        let (debouncer, mut commits) = SearchDebouncer::new(quiet_period);

        let committer = controller.clone();
        let commit_task = tokio::spawn(async move {
            while let Some(term) = commits.recv().await {
                let filter = committer
                    .current_filter()
                    .unwrap_or_default()
                    .with_search_term(term);
                match committer.set_filter(filter).await {
                    Ok(outcome) => debug!(?outcome, "applied debounced search term"),
                    Err(error) => warn!(error = %error, "debounced search term rejected"),
                }
            }
        });

        Self {
            controller,
            debouncer,
            commit_task,
        }
    }

    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    /// Apply a filter immediately; pending search input is dropped because
    /// `filter` carries its own search term.
    pub async fn set_filter(&self, filter: FilterModel) -> Result<FetchOutcome, DomainError> {
        self.debouncer.cancel();
        self.controller.set_filter(filter).await
    }

    pub async fn load_more(&self) -> FetchOutcome {
        self.controller.load_more().await
    }

    pub async fn retry(&self) -> FetchOutcome {
        self.controller.retry().await
    }

    /// Record a keystroke in the search box.
    pub fn on_search_input(&self, term: impl Into<String>) {
        self.debouncer.on_input(term);
    }

    pub fn visible_state(&self) -> VisibleState {
        self.controller.visible_state()
    }

    pub fn subscribe(&self) -> watch::Receiver<VisibleState> {
        self.controller.subscribe()
    }
}

impl Drop for CatalogBrowser {
    fn drop(&mut self) {
        self.commit_task.abort();
    }
}
