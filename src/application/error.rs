use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::repos::CatalogError, domain::error::DomainError, infra::error::InfraError,
};

/// Flattened error chain for logging, outermost message first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit status for the command-line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Domain(DomainError::Validation { .. }) => 2,
            AppError::Infra(InfraError::Configuration { .. }) => 78,
            AppError::Catalog(error) if error.is_transient() => 75,
            AppError::Catalog(_) | AppError::Infra(_) | AppError::Unexpected(_) => 1,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_walks_the_source_chain() {
        let io = std::io::Error::other("disk gone");
        let error = AppError::from(InfraError::fixture("listings.json", io));

        let report = error.report();
        assert_eq!(report.messages.len(), 2);
        assert!(report.messages[0].contains("listings.json"));
        assert_eq!(report.messages[1], "disk gone");
    }

    #[test]
    fn exit_codes_distinguish_failure_classes() {
        assert_eq!(
            AppError::from(DomainError::validation("min_price", "negative")).exit_code(),
            2
        );
        assert_eq!(AppError::from(CatalogError::Timeout).exit_code(), 75);
        assert_eq!(
            AppError::from(CatalogError::invalid_query("bad")).exit_code(),
            1
        );
    }
}
