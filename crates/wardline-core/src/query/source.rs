// Page sources
//
// A page source turns (search text, page, page size) into one page of
// results. The controller is generic over it so any paged collection can
// reuse the debounce and stale-response handling.

use std::future::Future;

use serde::Serialize;
use tracing::debug;
use wardline_api::{ApiClient, Hospital, Page, SearchFilter};

use crate::error::{CoreError, message_or};

/// Parameters of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    pub search: String,
    pub page: u32,
    pub page_size: u32,
}

/// Something that can fetch one page of a collection.
pub trait PageSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Fetch the page described by `query`. Errors carry a user-facing
    /// message in [`CoreError::user_message`].
    fn fetch_page(
        &self,
        query: &PageQuery,
    ) -> impl Future<Output = Result<Page<Self::Item>, CoreError>> + Send;
}

/// The hospital directory, filtered by a single query parameter.
#[derive(Debug, Clone)]
pub struct HospitalSource {
    api: ApiClient,
    search_param: String,
}

impl HospitalSource {
    pub fn new(api: ApiClient, search_param: impl Into<String>) -> Self {
        Self {
            api,
            search_param: search_param.into(),
        }
    }
}

impl PageSource for HospitalSource {
    type Item = Hospital;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Hospital>, CoreError> {
        let filter = SearchFilter {
            param: &self.search_param,
            value: &query.search,
        };
        self.api
            .list_hospitals(query.page, query.page_size, Some(filter))
            .await
            .map_err(|e| {
                debug!(error = %e, page = query.page, "hospital page fetch failed");
                CoreError::Fetch {
                    message: message_or(&e, "Failed to fetch hospitals"),
                }
            })
    }
}
