use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::domain::error::DomainError;
use crate::domain::filter::FilterModel;
use crate::domain::types::{Category, FurnishingStatus, SortOrder};

/// Command-line arguments for the catalog-pager binary.
#[derive(Debug, Parser)]
#[command(
    name = "catalog-pager",
    version,
    about = "Filtered, cached, cursor-paginated catalog queries"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CATALOG_PAGER_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a filtered query against the catalog fixture and print each page.
    Query(Box<QueryArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub overrides: QueryOverrides,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Number of pages to load: the first page plus `pages - 1` load-more calls.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}

#[derive(Debug, Args, Default, Clone)]
pub struct QueryOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the number of items requested per page.
    #[arg(long = "page-size", value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Override the page cache time-to-live.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Toggle the page cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the catalog collection name.
    #[arg(long = "collection", value_name = "NAME")]
    pub collection: Option<String>,

    /// JSON array of catalog documents to serve queries from.
    #[arg(long = "fixture", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub fixture: Option<PathBuf>,
}

/// Filter flags; applied on top of `--url-query` when both are given.
#[derive(Debug, Args, Default, Clone)]
pub struct FilterArgs {
    /// Listing query string, e.g. `category=residential&q=kabulonga`.
    #[arg(long = "url-query", value_name = "QUERY")]
    pub url_query: Option<String>,

    /// Category (any|residential|commercial|land|industrial).
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    #[arg(long = "min-price", value_name = "AMOUNT")]
    pub min_price: Option<i64>,

    #[arg(long = "max-price", value_name = "AMOUNT")]
    pub max_price: Option<i64>,

    #[arg(long, value_name = "COUNT")]
    pub bedrooms: Option<i32>,

    #[arg(long, value_name = "COUNT")]
    pub bathrooms: Option<i32>,

    #[arg(long, value_name = "COUNT")]
    pub garage: Option<i32>,

    /// Furnishing status (furnished|semi_furnished|unfurnished).
    #[arg(long, value_name = "STATUS")]
    pub furnishing: Option<String>,

    #[arg(long = "min-year", value_name = "YEAR")]
    pub min_year: Option<i32>,

    /// Required amenity; repeat for several (any of them matches).
    #[arg(long = "amenity", value_name = "TAG")]
    pub amenities: Vec<String>,

    /// Free-text search term.
    #[arg(long = "search", short = 'q', value_name = "TERM")]
    pub search: Option<String>,

    /// Sort order (newest|price_asc|price_desc).
    #[arg(long, value_name = "ORDER")]
    pub sort: Option<String>,
}

impl FilterArgs {
    /// Build and validate the filter these flags describe.
    pub fn to_filter(&self) -> Result<FilterModel, DomainError> {
        let mut filter = match self.url_query.as_deref() {
            Some(query) => FilterModel::from_query_string(query)?,
            None => FilterModel::default(),
        };

        if let Some(category) = self.category.as_deref() {
            filter.category = Category::parse(category)?;
        }
        if let Some(min) = self.min_price {
            filter.price_range.min = Some(min);
        }
        if let Some(max) = self.max_price {
            filter.price_range.max = Some(max);
        }
        if let Some(value) = self.bedrooms {
            filter.min_bedrooms = Some(value);
        }
        if let Some(value) = self.bathrooms {
            filter.min_bathrooms = Some(value);
        }
        if let Some(value) = self.garage {
            filter.min_garage = Some(value);
        }
        if let Some(furnishing) = self.furnishing.as_deref() {
            filter.furnishing = Some(FurnishingStatus::parse(furnishing)?);
        }
        if let Some(year) = self.min_year {
            filter.min_year_built = Some(year);
        }
        filter.amenities.extend(self.amenities.iter().cloned());
        if let Some(term) = self.search.as_ref() {
            filter.search_term = term.clone();
        }
        if let Some(sort) = self.sort.as_deref() {
            filter.sort = SortOrder::parse(sort)?;
        }

        filter.validate()?;
        Ok(filter)
    }
}
