//! Failure capture and the retry path out of the Failed state.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::repos::CatalogError;
use crate::util::lock::mutex_lock;

use super::service::{PaginationController, SOURCE};
use super::types::{FetchOutcome, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedOperation {
    Reset,
    LoadMore,
}

/// Structured description of why the controller is in the Failed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub error: CatalogError,
    pub operation: FailedOperation,
    /// Whether issuing the same query again can be expected to help.
    pub retryable: bool,
    /// Items still visible from before the failure.
    pub preserved_items: usize,
}

impl FailureReport {
    pub(super) fn new(error: CatalogError, operation: FailedOperation, preserved_items: usize) -> Self {
        Self {
            retryable: error.is_transient(),
            error,
            operation,
            preserved_items,
        }
    }
}

impl PaginationController {
    /// Replay the reset for the filter that was active when the failure
    /// happened. Only valid from Failed; anything else is skipped.
    #[instrument(skip(self))]
    pub async fn retry(&self) -> FetchOutcome {
        let filter = {
            let state = mutex_lock(&self.inner.state, SOURCE, "retry");
            let (Status::Failed(report), Some(filter)) = (&state.status, state.filter.as_ref())
            else {
                return FetchOutcome::Skipped;
            };
            if report.retryable {
                info!(error = %report.error, "retrying failed catalog query");
            } else {
                warn!(
                    error = %report.error,
                    kind = report.error.kind(),
                    "retrying a query the store rejected"
                );
            }
            filter.clone()
        };

        self.start_reset(filter, false).await
    }
}
