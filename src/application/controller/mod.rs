//! Pagination controller: the state machine behind a catalog listing.
//!
//! States are Idle, Loading(request), Loaded, Exhausted and Failed. `reset`
//! starts over for a new filter, `load_more` continues from the stored cursor
//! and `retry` replays the reset that failed.

mod commands;
mod recovery;
mod service;
mod state;
pub mod types;


pub use commands::{METRIC_FETCH, METRIC_FETCH_FAILED, METRIC_FETCH_MS, METRIC_STALE_DISCARD};
pub use recovery::{FailedOperation, FailureReport};
pub use service::PaginationController;
pub use types::{
    DEFAULT_PAGE_SIZE, FetchOutcome, PaginationConfig, RequestId, Status, VisibleState,
    VisibleStatus,
};
