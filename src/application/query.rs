//! Query composition: turns a filter plus cursor into the store query and
//! the cache signature that addresses its result.

use serde::Serialize;

use crate::application::pagination::{Cursor, PageRequest};
use crate::cache::{QuerySignature, hash_signature};
use crate::domain::filter::FilterModel;
use crate::domain::types::SortDirection;

pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_BEDROOMS: &str = "bedrooms";
pub const FIELD_BATHROOMS: &str = "bathrooms";
pub const FIELD_GARAGE: &str = "garage";
pub const FIELD_FURNISHING: &str = "furnishing";
pub const FIELD_YEAR_BUILT: &str = "year_built";
pub const FIELD_AMENITIES: &str = "amenities";
pub const FIELD_KEYWORDS: &str = "keywords";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Eq,
    Gte,
    Lte,
    ArrayContainsAny,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PredicateValue {
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

/// A `(field, operator, value)` triple understood by the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Predicate {
    pub field: &'static str,
    pub op: Operator,
    pub value: PredicateValue,
}

impl Predicate {
    fn new(field: &'static str, op: Operator, value: PredicateValue) -> Self {
        Self { field, op, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// Everything the catalog store needs to produce one page.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub collection: String,
    pub predicates: Vec<Predicate>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct ComposedQuery {
    pub query: CatalogQuery,
    pub signature: QuerySignature,
}

/// Builds predicate lists and signatures for one collection and page size.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    collection: String,
    page_size: u32,
}

impl QueryComposer {
    pub fn new(collection: impl Into<String>, page_size: u32) -> Self {
        Self {
            collection: collection.into(),
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Derive the store query and cache signature for `filter` at `cursor`
    /// (`None` addresses the first page).
    pub fn compose(&self, filter: &FilterModel, cursor: Option<&Cursor>) -> ComposedQuery {
        let (field, direction) = filter.sort.field();
        let signature = hash_signature(&self.collection, filter, self.page_size, cursor);
        let query = CatalogQuery {
            collection: self.collection.clone(),
            predicates: predicates(filter),
            sort: SortSpec { field, direction },
            page: PageRequest::new(self.page_size, cursor.cloned()),
        };
        ComposedQuery { query, signature }
    }
}

/// Predicates in their fixed order: category, price lower bound, price upper
/// bound, bedrooms, bathrooms, garage, furnishing, year built, amenities,
/// search keywords. Unset filter fields contribute nothing.
pub fn predicates(filter: &FilterModel) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(category) = filter.category.as_str() {
        predicates.push(Predicate::new(
            FIELD_CATEGORY,
            Operator::Eq,
            PredicateValue::Text(category.to_string()),
        ));
    }
    if let Some(min) = filter.price_range.min {
        predicates.push(Predicate::new(
            FIELD_PRICE,
            Operator::Gte,
            PredicateValue::Integer(min),
        ));
    }
    if let Some(max) = filter.price_range.max {
        predicates.push(Predicate::new(
            FIELD_PRICE,
            Operator::Lte,
            PredicateValue::Integer(max),
        ));
    }

    for (field, minimum) in [
        (FIELD_BEDROOMS, filter.min_bedrooms),
        (FIELD_BATHROOMS, filter.min_bathrooms),
        (FIELD_GARAGE, filter.min_garage),
    ] {
        if let Some(minimum) = minimum {
            predicates.push(Predicate::new(
                field,
                Operator::Gte,
                PredicateValue::Integer(i64::from(minimum)),
            ));
        }
    }

    if let Some(furnishing) = filter.furnishing {
        predicates.push(Predicate::new(
            FIELD_FURNISHING,
            Operator::Eq,
            PredicateValue::Text(furnishing.as_str().to_string()),
        ));
    }
    if let Some(year) = filter.min_year_built {
        predicates.push(Predicate::new(
            FIELD_YEAR_BUILT,
            Operator::Gte,
            PredicateValue::Integer(i64::from(year)),
        ));
    }
    if !filter.amenities.is_empty() {
        predicates.push(Predicate::new(
            FIELD_AMENITIES,
            Operator::ArrayContainsAny,
            PredicateValue::List(filter.amenities.iter().cloned().collect()),
        ));
    }

    let tokens = filter.search_tokens();
    if !tokens.is_empty() {
        predicates.push(Predicate::new(
            FIELD_KEYWORDS,
            Operator::ArrayContainsAny,
            PredicateValue::List(tokens),
        ));
    }

    predicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::PriceRange;
    use crate::domain::types::{Category, FurnishingStatus, SortOrder};

    fn composer() -> QueryComposer {
        QueryComposer::new("listings", 6)
    }

    fn full_filter() -> FilterModel {
        FilterModel {
            category: Category::Residential,
            price_range: PriceRange::between(100_000, 500_000),
            min_bedrooms: Some(3),
            min_bathrooms: Some(2),
            min_garage: Some(1),
            furnishing: Some(FurnishingStatus::Furnished),
            min_year_built: Some(2005),
            amenities: ["pool".to_string(), "borehole".to_string()].into(),
            search_term: "Kabulonga".to_string(),
            sort: SortOrder::PriceDesc,
        }
    }

    #[test]
    fn predicates_follow_fixed_order() {
        let fields: Vec<(&str, Operator)> = predicates(&full_filter())
            .into_iter()
            .map(|predicate| (predicate.field, predicate.op))
            .collect();

        assert_eq!(
            fields,
            vec![
                (FIELD_CATEGORY, Operator::Eq),
                (FIELD_PRICE, Operator::Gte),
                (FIELD_PRICE, Operator::Lte),
                (FIELD_BEDROOMS, Operator::Gte),
                (FIELD_BATHROOMS, Operator::Gte),
                (FIELD_GARAGE, Operator::Gte),
                (FIELD_FURNISHING, Operator::Eq),
                (FIELD_YEAR_BUILT, Operator::Gte),
                (FIELD_AMENITIES, Operator::ArrayContainsAny),
                (FIELD_KEYWORDS, Operator::ArrayContainsAny),
            ]
        );
    }

    #[test]
    fn empty_filter_has_no_predicates() {
        assert!(predicates(&FilterModel::default()).is_empty());
    }

    #[test]
    fn equal_filters_compose_identically() {
        let first = composer().compose(&full_filter(), None);
        let second = composer().compose(&full_filter(), None);

        assert_eq!(first.signature, second.signature);
        assert_eq!(first.query.predicates, second.query.predicates);
        assert_eq!(
            serde_json::to_vec(&first.query.predicates).expect("encode"),
            serde_json::to_vec(&second.query.predicates).expect("encode")
        );
    }

    #[test]
    fn cursor_and_sort_change_the_signature() {
        let filter = full_filter();
        let first_page = composer().compose(&filter, None);
        let next_page = composer().compose(&filter, Some(&Cursor::new("abc")));
        assert_ne!(first_page.signature, next_page.signature);

        let resorted = composer().compose(&filter.clone().with_sort(SortOrder::Newest), None);
        assert_ne!(first_page.signature, resorted.signature);
        assert_eq!(resorted.query.sort.field, "listed_at");
        assert_eq!(resorted.query.sort.direction, SortDirection::Desc);
    }

    #[test]
    fn page_request_carries_limit_and_cursor() {
        let cursor = Cursor::new("token");
        let composed = composer().compose(&FilterModel::default(), Some(&cursor));
        assert_eq!(composed.query.page.limit, 6);
        assert_eq!(composed.query.page.cursor, Some(cursor));
        assert_eq!(composed.query.collection, "listings");
    }

    #[test]
    fn predicate_values_serialize_for_the_store() {
        let encoded = serde_json::to_value(predicates(
            &FilterModel::default().with_search_term("Kabulonga"),
        ))
        .expect("encode predicates");
        assert_eq!(
            encoded,
            serde_json::json!([
                {"field": "keywords", "op": "array-contains-any", "value": ["kabulonga"]}
            ])
        );
    }
}
