//! Shared domain enumerations aligned with the catalog document fields.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Any,
    Residential,
    Commercial,
    Land,
    Industrial,
}

impl Category {
    /// Stored value of the `category` field, `None` for the unrestricted filter.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Category::Any => None,
            Category::Residential => Some("residential"),
            Category::Commercial => Some("commercial"),
            Category::Land => Some("land"),
            Category::Industrial => Some("industrial"),
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim() {
            "" | "any" | "all" => Ok(Category::Any),
            "residential" => Ok(Category::Residential),
            "commercial" => Ok(Category::Commercial),
            "land" => Ok(Category::Land),
            "industrial" => Ok(Category::Industrial),
            other => Err(DomainError::validation(
                "category",
                format!("unknown category `{other}`"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnishingStatus {
    Furnished,
    SemiFurnished,
    Unfurnished,
}

impl FurnishingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FurnishingStatus::Furnished => "furnished",
            FurnishingStatus::SemiFurnished => "semi_furnished",
            FurnishingStatus::Unfurnished => "unfurnished",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim() {
            "furnished" => Ok(FurnishingStatus::Furnished),
            "semi_furnished" | "semi-furnished" => Ok(FurnishingStatus::SemiFurnished),
            "unfurnished" => Ok(FurnishingStatus::Unfurnished),
            other => Err(DomainError::validation(
                "furnishing",
                format!("unknown furnishing status `{other}`"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
        }
    }

    /// Document field and direction the store orders by.
    pub fn field(self) -> (&'static str, SortDirection) {
        match self {
            SortOrder::Newest => ("listed_at", SortDirection::Desc),
            SortOrder::PriceAsc => ("price", SortDirection::Asc),
            SortOrder::PriceDesc => ("price", SortDirection::Desc),
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim() {
            "" | "newest" => Ok(SortOrder::Newest),
            "price_asc" | "price-asc" => Ok(SortOrder::PriceAsc),
            "price_desc" | "price-desc" => Ok(SortOrder::PriceDesc),
            other => Err(DomainError::validation(
                "sort",
                format!("unknown sort order `{other}`"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_any_has_no_stored_value() {
        assert_eq!(Category::Any.as_str(), None);
        assert_eq!(Category::parse("all").expect("any"), Category::Any);
        assert_eq!(
            Category::parse("residential").expect("residential"),
            Category::Residential
        );
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let err = SortOrder::parse("cheapest").expect_err("unknown sort");
        assert_eq!(err.field(), "sort");

        let err = FurnishingStatus::parse("bare").expect_err("unknown furnishing");
        assert_eq!(err.field(), "furnishing");
    }

    #[test]
    fn sort_order_maps_to_store_fields() {
        assert_eq!(
            SortOrder::Newest.field(),
            ("listed_at", SortDirection::Desc)
        );
        assert_eq!(SortOrder::PriceAsc.field(), ("price", SortDirection::Asc));
        assert_eq!(SortOrder::PriceDesc.field(), ("price", SortDirection::Desc));
    }
}
