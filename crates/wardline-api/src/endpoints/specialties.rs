use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{MaybeWrapped, Specialty};

impl ApiClient {
    /// `GET /api/specialties`
    pub async fn list_specialties(&self) -> Result<Vec<Specialty>, Error> {
        let wrapped: MaybeWrapped<Vec<Specialty>> = self.get("/api/specialties", &[]).await?;
        Ok(wrapped.into_inner())
    }
}
