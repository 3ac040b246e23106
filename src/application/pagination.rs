//! Shared cursor pagination helpers.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::domain::entities::CatalogItem;

/// Opaque continuation token handed out by the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Encode a store-specific payload as a URL-safe token.
    pub fn encode<P: Serialize>(payload: &P) -> Result<Self, PaginationError> {
        let serialized = serde_json::to_vec(payload)
            .map_err(|err| PaginationError::InvalidCursor(err.to_string()))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(serialized)))
    }

    pub fn decode<P: DeserializeOwned>(&self) -> Result<P, PaginationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|err| PaginationError::InvalidCursor(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| PaginationError::InvalidCursor(err.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cursor-aware pagination request.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    pub fn new(limit: u32, cursor: Option<Cursor>) -> Self {
        Self { limit, cursor }
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<CatalogItem>,
    pub next_cursor: Option<Cursor>,
}

impl Page {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn new(items: Vec<CatalogItem>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    pub fn returned(&self) -> usize {
        self.items.len()
    }

    /// A short page means the store has nothing after it.
    pub fn is_full(&self, limit: u32) -> bool {
        self.returned() == limit as usize
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Position {
        sort_key: i64,
        id: String,
    }

    #[test]
    fn cursor_payload_round_trip() {
        let position = Position {
            sort_key: 1_700_000_000,
            id: "listing-9".to_string(),
        };
        let cursor = Cursor::encode(&position).expect("encode cursor");
        assert!(!cursor.as_str().contains('='));

        let decoded: Position = cursor.decode().expect("decode cursor");
        assert_eq!(decoded, position);
    }

    #[test]
    fn decoding_invalid_cursor_reports_error() {
        let err = Cursor::new("not-base64!")
            .decode::<Position>()
            .expect_err("invalid cursor rejected");
        assert!(matches!(err, PaginationError::InvalidCursor(_)));
    }

    #[test]
    fn short_page_is_not_full() {
        assert!(Page::empty().is_full(0));
        assert!(!Page::empty().is_full(6));
    }
}
