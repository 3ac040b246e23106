use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use crate::application::pagination::Page;
use crate::application::query::ComposedQuery;
use crate::application::repos::CatalogError;
use crate::domain::error::DomainError;
use crate::domain::filter::FilterModel;
use crate::util::lock::mutex_lock;

use super::recovery::{FailedOperation, FailureReport};
use super::service::{PaginationController, SOURCE};
use super::types::{FetchOutcome, RequestId, Status};

pub const METRIC_FETCH: &str = "catalog_fetch_total";
pub const METRIC_FETCH_FAILED: &str = "catalog_fetch_failed_total";
pub const METRIC_FETCH_MS: &str = "catalog_fetch_ms";
pub const METRIC_STALE_DISCARD: &str = "catalog_stale_discard_total";

impl PaginationController {
    /// Apply a filter coming from the UI. An unchanged filter keeps the
    /// current results unless there are none to keep (Idle or Failed).
    #[instrument(skip(self, filter), fields(filter = %filter.to_query_string()))]
    pub async fn set_filter(&self, filter: FilterModel) -> Result<FetchOutcome, DomainError> {
        filter.validate()?;
        Ok(self.start_reset(filter, true).await)
    }

    /// Validate `filter`, drop accumulated results and load its first page.
    ///
    /// Any fetch still in flight is superseded: it runs to completion but its
    /// result is discarded.
    #[instrument(skip(self, filter), fields(filter = %filter.to_query_string()))]
    pub async fn reset(&self, filter: FilterModel) -> Result<FetchOutcome, DomainError> {
        filter.validate()?;
        Ok(self.start_reset(filter, false).await)
    }

    /// Restart on `filter`. With `keep_unchanged`, an equal filter that is
    /// loading or has results is left alone. The check and the restart share
    /// one lock acquisition.
    pub(super) async fn start_reset(
        &self,
        filter: FilterModel,
        keep_unchanged: bool,
    ) -> FetchOutcome {
        let composed = self.inner.composer.compose(&filter, None);
        let request = {
            let mut state = mutex_lock(&self.inner.state, SOURCE, "reset");
            if keep_unchanged
                && state.filter.as_ref() == Some(&filter)
                && matches!(
                    state.status,
                    Status::Loading(_) | Status::Loaded | Status::Exhausted
                )
            {
                debug!("filter unchanged; keeping current results");
                return FetchOutcome::Skipped;
            }
            let request = self.next_request_id();
            if let Status::Loading(superseded) = state.status {
                debug!(superseded, request, "superseding in-flight request");
            }
            state.restart(filter, request);
            self.publish(&state);
            request
        };

        info!(request, signature = %composed.signature, "loading first page");
        let result = self.fetch_page(&composed).await;
        self.apply(request, FailedOperation::Reset, result)
    }

    /// Fetch the page after the stored cursor. No-op unless Loaded with more
    /// results available.
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> FetchOutcome {
        let (request, composed) = {
            let mut state = mutex_lock(&self.inner.state, SOURCE, "load_more");
            if state.status != Status::Loaded || !state.has_more {
                debug!(status = ?state.status, "nothing more to load");
                return FetchOutcome::Skipped;
            }
            let (Some(filter), Some(cursor)) = (state.filter.as_ref(), state.cursor.as_ref())
            else {
                return FetchOutcome::Skipped;
            };
            let composed = self.inner.composer.compose(filter, Some(cursor));
            let request = self.next_request_id();
            state.status = Status::Loading(request);
            self.publish(&state);
            (request, composed)
        };

        debug!(request, signature = %composed.signature, "loading next page");
        let result = self.fetch_page(&composed).await;
        self.apply(request, FailedOperation::LoadMore, result)
    }

    /// Serve from the cache, or query the store and cache the result.
    async fn fetch_page(&self, composed: &ComposedQuery) -> Result<Page, CatalogError> {
        if let Some(page) = self.inner.cache.get(&composed.signature) {
            debug!(
                signature = %composed.signature,
                returned = page.returned(),
                "serving page from cache"
            );
            return Ok(page);
        }

        counter!(METRIC_FETCH).increment(1);
        let started_at = Instant::now();
        let result = tokio::time::timeout(
            self.inner.fetch_timeout,
            self.inner.catalog.query(&composed.query),
        )
        .await
        .unwrap_or(Err(CatalogError::Timeout));
        histogram!(METRIC_FETCH_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(page) => {
                self.inner
                    .cache
                    .put(composed.signature.clone(), page.clone());
                Ok(page)
            }
            Err(error) => {
                counter!(METRIC_FETCH_FAILED, "kind" => error.kind()).increment(1);
                Err(error)
            }
        }
    }

    /// Apply a fetch result if `request` is still the one the state waits on.
    fn apply(
        &self,
        request: RequestId,
        operation: FailedOperation,
        result: Result<Page, CatalogError>,
    ) -> FetchOutcome {
        let mut state = mutex_lock(&self.inner.state, SOURCE, "apply");
        if !state.is_current(request) {
            counter!(METRIC_STALE_DISCARD).increment(1);
            debug!(request, "discarding result of superseded request");
            return FetchOutcome::Discarded;
        }

        let outcome = match result {
            Ok(page) => {
                state.append_page(page, self.page_size());
                FetchOutcome::Applied
            }
            Err(error) => {
                warn!(
                    request,
                    error = %error,
                    kind = error.kind(),
                    "catalog query failed"
                );
                let report = FailureReport::new(error, operation, state.items.len());
                state.fail(report);
                FetchOutcome::Failed
            }
        };
        self.publish(&state);
        outcome
    }
}
