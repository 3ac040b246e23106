use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::application::query::QueryComposer;
use crate::application::repos::CatalogRepo;
use crate::cache::PageCache;
use crate::domain::filter::FilterModel;
use crate::util::lock::mutex_lock;

use super::state::PaginationState;
use super::types::{PaginationConfig, RequestId, Status, VisibleState};

pub(super) const SOURCE: &str = "application::controller";

/// Drives fetch-or-cache pagination for one filter at a time.
///
/// Clones share the same state. Bookkeeping runs under a per-instance lock;
/// the lock is never held across the catalog call, so a newer `reset` can
/// overtake a fetch still in flight and the older result is then discarded
/// by request id.
#[derive(Clone)]
pub struct PaginationController {
    pub(super) inner: Arc<ControllerInner>,
}

pub(super) struct ControllerInner {
    pub(super) catalog: Arc<dyn CatalogRepo>,
    pub(super) cache: Arc<PageCache>,
    pub(super) composer: QueryComposer,
    pub(super) fetch_timeout: Duration,
    pub(super) state: Mutex<PaginationState>,
    next_request: AtomicU64,
    snapshots: watch::Sender<VisibleState>,
}

impl PaginationController {
    pub fn new(
        catalog: Arc<dyn CatalogRepo>,
        cache: Arc<PageCache>,
        config: PaginationConfig,
    ) -> Self {
        let (snapshots, _) = watch::channel(VisibleState::idle());
        Self {
            inner: Arc::new(ControllerInner {
                catalog,
                cache,
                composer: QueryComposer::new(config.collection, config.page_size),
                fetch_timeout: config.fetch_timeout,
                state: Mutex::new(PaginationState::new()),
                next_request: AtomicU64::new(1),
                snapshots,
            }),
        }
    }

    /// Latest published snapshot.
    pub fn visible_state(&self) -> VisibleState {
        self.inner.snapshots.borrow().clone()
    }

    /// Receive every snapshot published after a state change.
    pub fn subscribe(&self) -> watch::Receiver<VisibleState> {
        self.inner.snapshots.subscribe()
    }

    pub fn current_filter(&self) -> Option<FilterModel> {
        mutex_lock(&self.inner.state, SOURCE, "current_filter")
            .filter
            .clone()
    }

    pub fn status(&self) -> Status {
        mutex_lock(&self.inner.state, SOURCE, "status")
            .status
            .clone()
    }

    pub fn page_size(&self) -> u32 {
        self.inner.composer.page_size()
    }

    pub(super) fn next_request_id(&self) -> RequestId {
        self.inner.next_request.fetch_add(1, Ordering::Relaxed)
    }

    /// Publish the state; callers hold the state lock so snapshots are
    /// emitted in mutation order.
    pub(super) fn publish(&self, state: &PaginationState) {
        self.inner.snapshots.send_replace(state.snapshot());
    }
}
