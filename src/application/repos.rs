//! Contract of the remote catalog store.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::application::pagination::{Page, PaginationError};
use crate::application::query::CatalogQuery;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum CatalogError {
    #[error("catalog store unavailable: {0}")]
    Unavailable(String),
    #[error("catalog query timed out")]
    Timeout,
    #[error("catalog store rejected the query: {0}")]
    InvalidQuery(String),
}

impl CatalogError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Transient failures are expected to succeed when the same query is
    /// issued again; an invalid query fails identically every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Unavailable(_) | CatalogError::Timeout)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Unavailable(_) => "unavailable",
            CatalogError::Timeout => "timeout",
            CatalogError::InvalidQuery(_) => "invalid_query",
        }
    }
}

impl From<PaginationError> for CatalogError {
    fn from(error: PaginationError) -> Self {
        CatalogError::InvalidQuery(error.to_string())
    }
}

/// Executes a predicate list against one collection of the document store.
///
/// Implementations return at most `query.page.limit` items, a cursor that
/// continues directly after the last returned item under the same predicates
/// and sort, and must tolerate concurrent calls with different queries.
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    async fn query(&self, query: &CatalogQuery) -> Result<Page, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_classified() {
        assert!(CatalogError::unavailable("503").is_transient());
        assert!(CatalogError::Timeout.is_transient());
        assert!(!CatalogError::invalid_query("needs index").is_transient());
    }

    #[test]
    fn undecodable_cursor_is_an_invalid_query() {
        let error = CatalogError::from(PaginationError::InvalidCursor("bad".into()));
        assert_eq!(error.kind(), "invalid_query");
    }
}
