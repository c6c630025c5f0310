// ── Paged, debounced collection queries ──
//
// `QueryController` drives a paged view over a `PageSource`: search text is
// debounced, paging is bounded by the last known page count, and every
// fetch is tagged with an epoch so only the latest one may write the view.

mod controller;
mod scheduler;
mod source;

use std::sync::Arc;

use serde::Serialize;

pub use controller::{QueryConfig, QueryController};
pub use scheduler::{Scheduler, TimerHandle, TimerTask, TokioScheduler};
pub use source::{HospitalSource, PageQuery, PageSource};

/// Where the view is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QueryStatus {
    /// Nothing requested yet.
    Idle,
    Loading,
    Success,
    Error,
}

/// Observable state of a paged query.
#[derive(Debug, Clone)]
pub struct QueryView<T> {
    /// Latest text handed to `set_search_text`, applied or not.
    pub search_text: String,
    /// 1-based page the next fetch will request.
    pub page: u32,
    pub page_size: u32,
    /// Items from the most recent applied response.
    pub items: Arc<Vec<T>>,
    /// Page count from the most recent successful response; 0 before any.
    pub total_pages: u32,
    pub status: QueryStatus,
    /// Present only when `status` is [`QueryStatus::Error`].
    pub error_message: Option<String>,
    /// Bumped each time a fetch starts. Responses for older epochs are dropped.
    pub epoch: u64,
    /// The query whose response `items` came from.
    pub applied: Option<PageQuery>,
}

impl<T> QueryView<T> {
    pub(crate) fn new(page_size: u32) -> Self {
        Self {
            search_text: String::new(),
            page: 1,
            page_size,
            items: Arc::new(Vec::new()),
            total_pages: 0,
            status: QueryStatus::Idle,
            error_message: None,
            epoch: 0,
            applied: None,
        }
    }

    /// A successful fetch that matched nothing.
    pub fn is_empty_result(&self) -> bool {
        self.status == QueryStatus::Success && self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
