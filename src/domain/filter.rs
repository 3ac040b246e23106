//! The active catalog query as selected by the user.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::error::DomainError;
use super::types::{Category, FurnishingStatus, SortOrder};

/// Inclusive price bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl PriceRange {
    pub fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Immutable description of the active query.
///
/// Every user change produces a new value; two filters compare equal exactly
/// when every field matches, which is what the controller uses to skip
/// redundant resets and what the cache signature is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterModel {
    pub category: Category,
    pub price_range: PriceRange,
    pub min_bedrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub min_garage: Option<i32>,
    pub furnishing: Option<FurnishingStatus>,
    pub min_year_built: Option<i32>,
    pub amenities: BTreeSet<String>,
    pub search_term: String,
    pub sort: SortOrder,
}

impl FilterModel {
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_price_range(mut self, price_range: PriceRange) -> Self {
        self.price_range = price_range;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_amenity(mut self, amenity: impl Into<String>) -> Self {
        self.amenities.insert(amenity.into());
        self
    }

    /// Reject inverted price ranges and negative minimums.
    pub fn validate(&self) -> Result<(), DomainError> {
        let PriceRange { min, max } = self.price_range;
        non_negative("price_range.min", min.unwrap_or_default())?;
        non_negative("price_range.max", max.unwrap_or_default())?;
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(DomainError::validation(
                "price_range",
                format!("minimum {min} exceeds maximum {max}"),
            ));
        }

        for (field, value) in [
            ("min_bedrooms", self.min_bedrooms),
            ("min_bathrooms", self.min_bathrooms),
            ("min_garage", self.min_garage),
            ("min_year_built", self.min_year_built),
        ] {
            non_negative(field, i64::from(value.unwrap_or_default()))?;
        }

        if self.amenities.iter().any(|amenity| amenity.trim().is_empty()) {
            return Err(DomainError::validation(
                "amenities",
                "amenity tags must not be blank",
            ));
        }

        Ok(())
    }

    /// Lower-cased, de-duplicated keywords of the free-text term.
    ///
    /// The store matches these as "any token": each extra word widens the
    /// result set rather than narrowing it.
    pub fn search_tokens(&self) -> Vec<String> {
        self.search_term
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Parse the URL query form used by listing pages, e.g.
    /// `category=residential&min_price=100000&amenities=pool,garden&q=kabulonga`.
    ///
    /// Unknown keys are ignored; malformed values are validation errors.
    pub fn from_query_string(query: &str) -> Result<Self, DomainError> {
        let mut filter = FilterModel::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "category" => filter.category = Category::parse(value)?,
                "min_price" => filter.price_range.min = parse_number("price_range.min", value)?,
                "max_price" => filter.price_range.max = parse_number("price_range.max", value)?,
                "bedrooms" => filter.min_bedrooms = parse_number("min_bedrooms", value)?,
                "bathrooms" => filter.min_bathrooms = parse_number("min_bathrooms", value)?,
                "garage" => filter.min_garage = parse_number("min_garage", value)?,
                "furnishing" if !value.is_empty() => {
                    filter.furnishing = Some(FurnishingStatus::parse(value)?)
                }
                "min_year" => filter.min_year_built = parse_number("min_year_built", value)?,
                "amenities" => filter.amenities.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string),
                ),
                "q" => filter.search_term = value.to_string(),
                "sort" => filter.sort = SortOrder::parse(value)?,
                _ => {}
            }
        }

        filter.validate()?;
        Ok(filter)
    }

    /// Canonical URL query form; default fields are omitted.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = self.category.as_str() {
            serializer.append_pair("category", category);
        }
        if let Some(min) = self.price_range.min {
            serializer.append_pair("min_price", &min.to_string());
        }
        if let Some(max) = self.price_range.max {
            serializer.append_pair("max_price", &max.to_string());
        }
        if let Some(value) = self.min_bedrooms {
            serializer.append_pair("bedrooms", &value.to_string());
        }
        if let Some(value) = self.min_bathrooms {
            serializer.append_pair("bathrooms", &value.to_string());
        }
        if let Some(value) = self.min_garage {
            serializer.append_pair("garage", &value.to_string());
        }
        if let Some(furnishing) = self.furnishing {
            serializer.append_pair("furnishing", furnishing.as_str());
        }
        if let Some(value) = self.min_year_built {
            serializer.append_pair("min_year", &value.to_string());
        }
        if !self.amenities.is_empty() {
            let joined = self
                .amenities
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",");
            serializer.append_pair("amenities", &joined);
        }
        if !self.search_term.is_empty() {
            serializer.append_pair("q", &self.search_term);
        }
        if self.sort != SortOrder::default() {
            serializer.append_pair("sort", self.sort.as_str());
        }
        serializer.finish()
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::validation(
            field,
            format!("must not be negative (got {value})"),
        ));
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<Option<T>, DomainError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| DomainError::validation(field, format!("`{value}` is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residential() -> FilterModel {
        FilterModel::default()
            .with_category(Category::Residential)
            .with_price_range(PriceRange::between(100_000, 500_000))
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let filter =
            FilterModel::default().with_price_range(PriceRange::between(500_000, 100_000));
        let err = filter.validate().expect_err("inverted range");
        assert_eq!(err.field(), "price_range");
    }

    #[test]
    fn negative_minimum_is_rejected() {
        let filter = FilterModel {
            min_bathrooms: Some(-1),
            ..Default::default()
        };
        let err = filter.validate().expect_err("negative minimum");
        assert_eq!(err.field(), "min_bathrooms");
    }

    #[test]
    fn open_and_equal_bounds_are_valid() {
        FilterModel::default().validate().expect("empty filter");
        FilterModel::default()
            .with_price_range(PriceRange::between(250_000, 250_000))
            .validate()
            .expect("equal bounds");
        FilterModel::default()
            .with_price_range(PriceRange {
                min: None,
                max: Some(90_000),
            })
            .validate()
            .expect("upper bound only");
    }

    #[test]
    fn equality_tracks_every_field() {
        assert_eq!(residential(), residential());
        assert_ne!(residential(), residential().with_search_term("kabulonga"));
        assert_ne!(residential(), residential().with_sort(SortOrder::PriceAsc));
        assert_ne!(residential(), residential().with_amenity("pool"));
    }

    #[test]
    fn search_tokens_are_lowercased_and_unique() {
        let filter = FilterModel::default().with_search_term("  Kabulonga  garden kabulonga ");
        assert_eq!(filter.search_tokens(), vec!["garden", "kabulonga"]);
        assert!(FilterModel::default().search_tokens().is_empty());
    }

    #[test]
    fn query_string_parses_listing_filters() {
        let filter = FilterModel::from_query_string(
            "?category=residential&min_price=100000&max_price=500000&bedrooms=3\
             &furnishing=semi_furnished&amenities=pool,%20garden,&q=Kabulonga&sort=price_desc&page=2",
        )
        .expect("parse query");

        assert_eq!(filter.category, Category::Residential);
        assert_eq!(filter.price_range, PriceRange::between(100_000, 500_000));
        assert_eq!(filter.min_bedrooms, Some(3));
        assert_eq!(filter.furnishing, Some(FurnishingStatus::SemiFurnished));
        assert_eq!(
            filter.amenities.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["garden", "pool"]
        );
        assert_eq!(filter.search_term, "Kabulonga");
        assert_eq!(filter.sort, SortOrder::PriceDesc);
    }

    #[test]
    fn query_string_rejects_bad_values() {
        let err = FilterModel::from_query_string("bedrooms=many").expect_err("not a number");
        assert_eq!(err.field(), "min_bedrooms");

        let err = FilterModel::from_query_string("min_price=9&max_price=1").expect_err("inverted");
        assert_eq!(err.field(), "price_range");
    }

    #[test]
    fn canonical_query_string_round_trips() {
        let filter = residential()
            .with_amenity("pool")
            .with_search_term("kabulonga east")
            .with_sort(SortOrder::PriceAsc);
        let rendered = filter.to_query_string();

        assert_eq!(
            rendered,
            "category=residential&min_price=100000&max_price=500000&amenities=pool&q=kabulonga+east&sort=price_asc"
        );
        assert_eq!(
            FilterModel::from_query_string(&rendered).expect("reparse"),
            filter
        );
        assert_eq!(FilterModel::default().to_query_string(), "");
    }
}
