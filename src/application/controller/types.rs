use std::time::Duration;

use serde::Serialize;

use crate::domain::entities::CatalogItem;

use super::recovery::FailureReport;

pub const DEFAULT_COLLECTION: &str = "listings";
pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifies one issued fetch; only the newest may mutate visible state.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading(RequestId),
    Loaded,
    Exhausted,
    Failed(FailureReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibleStatus {
    Idle,
    Loading,
    Loaded,
    Exhausted,
    Failed,
}

/// Read-only snapshot handed to the surrounding UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleState {
    pub items: Vec<CatalogItem>,
    pub has_more: bool,
    pub status: VisibleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReport>,
}

impl VisibleState {
    pub fn idle() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            status: VisibleStatus::Idle,
            error: None,
        }
    }
}

/// What happened to the state as a result of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was merged into the visible list.
    Applied,
    /// The fetch failed and the state moved to Failed.
    Failed,
    /// A newer operation superseded this one; its result was dropped.
    Discarded,
    /// The operation was not applicable in the current state.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub collection: String,
    pub page_size: u32,
    pub fetch_timeout: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl From<&crate::config::Settings> for PaginationConfig {
    fn from(settings: &crate::config::Settings) -> Self {
        Self {
            collection: settings.catalog.collection.clone(),
            page_size: settings.pagination.page_size.get(),
            fetch_timeout: settings.pagination.fetch_timeout,
        }
    }
}
