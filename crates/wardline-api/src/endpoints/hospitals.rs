// Hospital collection endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Hospital, HospitalDraft, MaybeWrapped, Page};

const HOSPITALS: &str = "/api/hospitals";
const SEARCH: &str = "/api/search";

/// A free-text filter sent as a single query parameter (e.g. `city=Boston`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilter<'a> {
    pub param: &'a str,
    pub value: &'a str,
}

impl ApiClient {
    /// Fetch one page of hospitals.
    ///
    /// `GET /api/hospitals?page={page}&limit={limit}[&{param}={value}]`
    ///
    /// The filter value is sent exactly as typed. Only an empty value is
    /// left out, which lists the whole collection.
    pub async fn list_hospitals(
        &self,
        page: u32,
        limit: u32,
        filter: Option<SearchFilter<'_>>,
    ) -> Result<Page<Hospital>, Error> {
        let mut params = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(f) = filter.filter(|f| !f.value.is_empty()) {
            params.push((f.param, f.value.to_owned()));
        }
        self.get(HOSPITALS, &params).await
    }

    /// `GET /api/hospitals/{id}`
    pub async fn get_hospital(&self, id: &str) -> Result<Hospital, Error> {
        let url = self.item_url(HOSPITALS, id)?;
        let wrapped: MaybeWrapped<Hospital> = self.get_url(url, &[]).await?;
        Ok(wrapped.into_inner())
    }

    /// `POST /api/hospitals`
    pub async fn create_hospital(&self, draft: &HospitalDraft) -> Result<Hospital, Error> {
        debug!(name = ?draft.name, "creating hospital");
        let wrapped: MaybeWrapped<Hospital> = self.post(HOSPITALS, draft).await?;
        Ok(wrapped.into_inner())
    }

    /// `PUT /api/hospitals/{id}`
    pub async fn update_hospital(&self, id: &str, draft: &HospitalDraft) -> Result<Hospital, Error> {
        debug!(id, "updating hospital");
        let url = self.item_url(HOSPITALS, id)?;
        let wrapped: MaybeWrapped<Hospital> = self.put_url(url, draft).await?;
        Ok(wrapped.into_inner())
    }

    /// `DELETE /api/hospitals/{id}`
    pub async fn delete_hospital(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting hospital");
        let url = self.item_url(HOSPITALS, id)?;
        let _: serde_json::Value = self.delete_url(url).await?;
        Ok(())
    }

    /// Unpaged free-text search.
    ///
    /// `GET /api/search?query={query}`
    pub async fn search_hospitals(&self, query: &str) -> Result<Vec<Hospital>, Error> {
        let wrapped: MaybeWrapped<Vec<Hospital>> =
            self.get(SEARCH, &[("query", query.to_owned())]).await?;
        Ok(wrapped.into_inner())
    }
}
