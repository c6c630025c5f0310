// Profile endpoints for the logged-in user

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{MaybeWrapped, ProfilePatch, User};

const PROFILE: &str = "/api/users/profile";

impl ApiClient {
    /// `GET /api/users/profile`
    pub async fn get_profile(&self) -> Result<User, Error> {
        let wrapped: MaybeWrapped<User> = self.get(PROFILE, &[]).await?;
        Ok(wrapped.into_inner())
    }

    /// `PUT /api/users/profile`, returning the updated user.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, Error> {
        let wrapped: MaybeWrapped<User> = self.put(PROFILE, patch).await?;
        Ok(wrapped.into_inner())
    }
}
