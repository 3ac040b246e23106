//! Cache key derivation.
//!
//! A signature is the SHA-256 of a JSON document holding every query input.
//! JSON string escaping keeps field boundaries unambiguous, so no choice of
//! filter values can make two different queries encode to the same bytes.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::application::pagination::Cursor;
use crate::domain::filter::FilterModel;

const SIGNATURE_VERSION: u32 = 1;

/// Canonical, collision-resistant key of one page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuerySignature(String);

impl QuerySignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct SignatureInput<'a> {
    version: u32,
    collection: &'a str,
    filter: &'a FilterModel,
    limit: u32,
    cursor: Option<&'a str>,
}

/// Hash every input that shapes a page; `cursor = None` is the first page.
pub fn hash_signature(
    collection: &str,
    filter: &FilterModel,
    limit: u32,
    cursor: Option<&Cursor>,
) -> QuerySignature {
    let input = SignatureInput {
        version: SIGNATURE_VERSION,
        collection,
        filter,
        limit,
        cursor: cursor.map(Cursor::as_str),
    };
    let encoded =
        serde_json::to_vec(&input).expect("serializing signature input should succeed");
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    QuerySignature(hex::encode(hasher.finalize()))
}
