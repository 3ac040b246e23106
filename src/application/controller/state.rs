use std::collections::HashSet;

use crate::application::pagination::{Cursor, Page};
use crate::domain::entities::{CatalogItem, ItemId};
use crate::domain::filter::FilterModel;

use super::recovery::FailureReport;
use super::types::{RequestId, Status, VisibleState, VisibleStatus};

/// Everything one controller accumulates for the active filter.
#[derive(Debug)]
pub(super) struct PaginationState {
    pub(super) filter: Option<FilterModel>,
    pub(super) items: Vec<CatalogItem>,
    seen: HashSet<ItemId>,
    pub(super) cursor: Option<Cursor>,
    pub(super) has_more: bool,
    pub(super) status: Status,
}

impl PaginationState {
    pub(super) fn new() -> Self {
        Self {
            filter: None,
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            has_more: false,
            status: Status::Idle,
        }
    }

    /// Drop everything accumulated and start loading the first page of `filter`.
    pub(super) fn restart(&mut self, filter: FilterModel, request: RequestId) {
        self.filter = Some(filter);
        self.items.clear();
        self.seen.clear();
        self.cursor = None;
        self.has_more = false;
        self.status = Status::Loading(request);
    }

    pub(super) fn is_current(&self, request: RequestId) -> bool {
        self.status == Status::Loading(request)
    }

    /// Merge a page, skipping ids already shown, and advance the cursor.
    pub(super) fn append_page(&mut self, page: Page, limit: u32) {
        let has_more = page.is_full(limit) && page.next_cursor.is_some();
        for item in page.items {
            if self.seen.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        self.cursor = if has_more { page.next_cursor } else { None };
        self.has_more = has_more;
        self.status = if has_more {
            Status::Loaded
        } else {
            Status::Exhausted
        };
    }

    /// Items already shown stay visible next to the failure.
    pub(super) fn fail(&mut self, report: FailureReport) {
        self.status = Status::Failed(report);
    }

    pub(super) fn snapshot(&self) -> VisibleState {
        let (status, error) = match &self.status {
            Status::Idle => (VisibleStatus::Idle, None),
            Status::Loading(_) => (VisibleStatus::Loading, None),
            Status::Loaded => (VisibleStatus::Loaded, None),
            Status::Exhausted => (VisibleStatus::Exhausted, None),
            Status::Failed(report) => (VisibleStatus::Failed, Some(report.clone())),
        };
        VisibleState {
            items: self.items.clone(),
            has_more: self.has_more,
            status,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;

    fn page(ids: &[&str], cursor: Option<&str>) -> Page {
        Page::new(
            ids.iter()
                .map(|id| CatalogItem::new(*id, Map::new()))
                .collect(),
            cursor.map(Cursor::new),
        )
    }

    fn ids(state: &PaginationState) -> Vec<&str> {
        state.items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn replayed_items_are_not_duplicated() {
        let mut state = PaginationState::new();
        state.restart(FilterModel::default(), 1);
        state.append_page(page(&["a", "b"], Some("c1")), 2);
        state.status = Status::Loading(2);
        state.append_page(page(&["b", "c"], Some("c2")), 2);

        assert_eq!(ids(&state), vec!["a", "b", "c"]);
        assert_eq!(state.cursor, Some(Cursor::new("c2")));
        assert_eq!(state.status, Status::Loaded);
    }

    #[test]
    fn short_page_exhausts_and_clears_cursor() {
        let mut state = PaginationState::new();
        state.restart(FilterModel::default(), 1);
        state.append_page(page(&["a"], Some("ignored")), 6);

        assert!(!state.has_more);
        assert_eq!(state.cursor, None);
        assert_eq!(state.status, Status::Exhausted);
    }

    #[test]
    fn full_page_without_cursor_cannot_continue() {
        let mut state = PaginationState::new();
        state.restart(FilterModel::default(), 1);
        state.append_page(page(&["a", "b"], None), 2);

        assert!(!state.has_more);
        assert_eq!(state.status, Status::Exhausted);
    }

    #[test]
    fn restart_clears_accumulated_items() {
        let mut state = PaginationState::new();
        state.restart(FilterModel::default(), 1);
        state.append_page(page(&["a", "b"], Some("c1")), 2);
        state.restart(FilterModel::default().with_search_term("roma"), 2);

        assert!(state.items.is_empty());
        assert!(state.is_current(2));
        assert!(!state.is_current(1));
        assert_eq!(state.snapshot().status, VisibleStatus::Loading);
    }
}
