//! In-memory document store implementing the catalog contract.
//!
//! Documents are JSON objects with an `id`. Queries evaluate eq, gte, lte and
//! array-contains-any predicates, order by the requested field with the
//! document id as tie-breaker, and continue from keyset cursors that encode
//! the sort key and id of the last returned document.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::application::pagination::{Cursor, Page};
use crate::application::query::{CatalogQuery, Operator, Predicate, PredicateValue};
use crate::application::repos::{CatalogError, CatalogRepo};
use crate::domain::entities::{CatalogItem, ItemId};
use crate::domain::types::SortDirection;
use crate::util::lock::mutex_lock;

use super::error::InfraError;

const SOURCE: &str = "infra::memory";

static MISSING: Value = Value::Null;

#[derive(Debug, Serialize, Deserialize)]
struct CursorPayload {
    key: Value,
    id: ItemId,
}

pub struct InMemoryCatalog {
    collection: String,
    documents: Vec<CatalogItem>,
    queries: AtomicUsize,
    injected_failures: Mutex<VecDeque<CatalogError>>,
}

impl InMemoryCatalog {
    pub fn from_documents(collection: impl Into<String>, documents: Vec<CatalogItem>) -> Self {
        Self {
            collection: collection.into(),
            documents,
            queries: AtomicUsize::new(0),
            injected_failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Load a JSON array of documents, each an object with a string `id`.
    pub async fn from_json_file(
        collection: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, InfraError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| InfraError::fixture(path, err))?;
        let documents: Vec<CatalogItem> = serde_json::from_slice(&bytes)
            .map_err(|err| InfraError::fixture_format(path, err))?;
        debug!(path = %path.display(), documents = documents.len(), "loaded catalog fixture");
        Ok(Self::from_documents(collection, documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of queries received, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    /// Make the next query fail with `error`; queued failures are consumed in order.
    pub fn fail_next(&self, error: CatalogError) {
        mutex_lock(&self.injected_failures, SOURCE, "fail_next").push_back(error);
    }

    fn execute(&self, query: &CatalogQuery) -> Result<Page, CatalogError> {
        if query.collection != self.collection {
            return Err(CatalogError::invalid_query(format!(
                "unknown collection `{}`",
                query.collection
            )));
        }

        let sort_field = query.sort.field;
        let direction = query.sort.direction;
        let mut matching: Vec<&CatalogItem> = self
            .documents
            .iter()
            .filter(|item| query.predicates.iter().all(|p| matches(item, p)))
            .collect();
        matching.sort_by(|a, b| {
            order(
                sort_key(a, sort_field),
                &a.id,
                sort_key(b, sort_field),
                &b.id,
                direction,
            )
        });

        let start = match query.page.cursor.as_ref() {
            Some(cursor) => {
                let after: CursorPayload = cursor.decode()?;
                matching.partition_point(|item| {
                    order(
                        sort_key(item, sort_field),
                        &item.id,
                        &after.key,
                        &after.id,
                        direction,
                    ) != Ordering::Greater
                })
            }
            None => 0,
        };

        let limit = query.page.limit as usize;
        let items: Vec<CatalogItem> = matching
            .iter()
            .skip(start)
            .take(limit)
            .map(|item| (*item).clone())
            .collect();

        let next_cursor = match items.last() {
            Some(last) => Some(Cursor::encode(&CursorPayload {
                key: sort_key(last, sort_field).clone(),
                id: last.id.clone(),
            })?),
            None => None,
        };

        Ok(Page::new(items, next_cursor))
    }
}

#[async_trait]
impl CatalogRepo for InMemoryCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<Page, CatalogError> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(error) =
            mutex_lock(&self.injected_failures, SOURCE, "query").pop_front()
        {
            debug!(kind = error.kind(), "returning injected failure");
            return Err(error);
        }

        let page = self.execute(query)?;
        debug!(
            collection = %query.collection,
            predicates = query.predicates.len(),
            returned = page.returned(),
            "served in-memory query"
        );
        Ok(page)
    }
}

fn sort_key<'a>(item: &'a CatalogItem, field: &str) -> &'a Value {
    item.field(field).unwrap_or(&MISSING)
}

/// Total order of `(key, id)` pairs; the key follows `direction`, ties break
/// on ascending id.
fn order(
    left_key: &Value,
    left_id: &ItemId,
    right_key: &Value,
    right_id: &ItemId,
    direction: SortDirection,
) -> Ordering {
    let by_key = compare_values(left_key, right_key);
    let by_key = match direction {
        SortDirection::Asc => by_key,
        SortDirection::Desc => by_key.reverse(),
    };
    by_key.then_with(|| left_id.cmp(right_id))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => {
                let a = a.as_f64().unwrap_or_default();
                let b = b.as_f64().unwrap_or_default();
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

fn matches(item: &CatalogItem, predicate: &Predicate) -> bool {
    let Some(actual) = item.field(predicate.field) else {
        return false;
    };

    match (&predicate.op, &predicate.value) {
        (Operator::Eq, PredicateValue::Text(expected)) => {
            actual.as_str() == Some(expected.as_str())
        }
        (Operator::Eq, PredicateValue::Integer(expected)) => {
            actual.is_number() && compare_values(actual, &Value::from(*expected)).is_eq()
        }
        (Operator::Gte, PredicateValue::Integer(bound)) => {
            actual.is_number() && compare_values(actual, &Value::from(*bound)).is_ge()
        }
        (Operator::Lte, PredicateValue::Integer(bound)) => {
            actual.is_number() && compare_values(actual, &Value::from(*bound)).is_le()
        }
        (Operator::ArrayContainsAny, PredicateValue::List(wanted)) => {
            actual.as_array().is_some_and(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|value| wanted.iter().any(|candidate| candidate == value))
            })
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::application::query::QueryComposer;
    use crate::domain::filter::{FilterModel, PriceRange};
    use crate::domain::types::{Category, SortOrder};

    fn listing(id: &str, category: &str, price: i64, keywords: &[&str]) -> CatalogItem {
        let value = json!({
            "id": id,
            "category": category,
            "price": price,
            "keywords": keywords,
            "amenities": ["parking"],
        });
        serde_json::from_value(value).expect("valid listing")
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_documents(
            "listings",
            vec![
                listing("l1", "residential", 250_000, &["kabulonga", "garden"]),
                listing("l2", "commercial", 900_000, &["cairo", "road"]),
                listing("l3", "residential", 150_000, &["roma"]),
                listing("l4", "residential", 250_000, &["kabulonga"]),
                listing("l5", "land", 80_000, &["chongwe"]),
            ],
        )
    }

    fn ids(page: &Page) -> Vec<&str> {
        page.items.iter().map(|item| item.id.as_str()).collect()
    }

    async fn run(catalog: &InMemoryCatalog, filter: &FilterModel, limit: u32) -> Vec<String> {
        let composer = QueryComposer::new("listings", limit);
        let mut cursor: Option<Cursor> = None;
        let mut seen = Vec::new();
        loop {
            let composed = composer.compose(filter, cursor.as_ref());
            let page = catalog.query(&composed.query).await.expect("query");
            seen.extend(ids(&page).into_iter().map(str::to_string));
            if !page.is_full(limit) {
                return seen;
            }
            cursor = page.next_cursor;
        }
    }

    #[tokio::test]
    async fn predicates_narrow_the_result() {
        let filter = FilterModel::default()
            .with_category(Category::Residential)
            .with_price_range(PriceRange::between(200_000, 300_000))
            .with_search_term("Kabulonga");

        let found = run(&catalog(), &filter, 10).await;
        assert_eq!(found, vec!["l1", "l4"]);
    }

    #[tokio::test]
    async fn price_order_breaks_ties_on_id() {
        let filter = FilterModel::default().with_sort(SortOrder::PriceDesc);

        let found = run(&catalog(), &filter, 10).await;
        assert_eq!(found, vec!["l2", "l1", "l4", "l3", "l5"]);
    }

    #[tokio::test]
    async fn keyset_pages_cover_every_match_once() {
        let filter = FilterModel::default().with_sort(SortOrder::PriceAsc);

        let found = run(&catalog(), &filter, 2).await;
        assert_eq!(found, vec!["l5", "l3", "l1", "l4", "l2"]);
    }

    #[tokio::test]
    async fn undecodable_cursor_is_an_invalid_query() {
        let composer = QueryComposer::new("listings", 2);
        let composed = composer.compose(&FilterModel::default(), Some(&Cursor::new("%%%")));

        let err = catalog()
            .query(&composed.query)
            .await
            .expect_err("cursor rejected");
        assert_eq!(err.kind(), "invalid_query");
    }

    #[tokio::test]
    async fn unknown_collection_is_rejected() {
        let composed = QueryComposer::new("rentals", 2).compose(&FilterModel::default(), None);

        let err = catalog()
            .query(&composed.query)
            .await
            .expect_err("collection rejected");
        assert!(matches!(err, CatalogError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let catalog = catalog();
        catalog.fail_next(CatalogError::unavailable("maintenance"));
        let composed = QueryComposer::new("listings", 2).compose(&FilterModel::default(), None);

        assert!(catalog.query(&composed.query).await.is_err());
        assert!(catalog.query(&composed.query).await.is_ok());
        assert_eq!(catalog.query_count(), 2);
    }

    #[tokio::test]
    async fn fixture_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().expect("temp fixture");
        write!(
            file,
            r#"[{{"id": "a", "price": 1}}, {{"id": "b", "price": 2, "keywords": ["roma"]}}]"#
        )
        .expect("write fixture");

        let catalog = InMemoryCatalog::from_json_file("listings", file.path())
            .await
            .expect("fixture loads");
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn malformed_fixture_reports_the_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp fixture");
        write!(file, r#"{{"id": "not-an-array"}}"#).expect("write fixture");

        let err = InMemoryCatalog::from_json_file("listings", file.path())
            .await
            .err()
            .expect("malformed fixture rejected");
        assert!(matches!(err, InfraError::FixtureFormat { .. }));
    }
}
