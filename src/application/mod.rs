//! Application services: query composition, pagination and search input.

pub mod browser;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod pagination;
pub mod query;
pub mod repos;
