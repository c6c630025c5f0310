// Credential exchange endpoints
//
// Login and registration are sent without a bearer token and return
// `{ token, user }`. Logout carries the current token so the server can
// revoke it.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::AuthResponse;

const LOGIN: &str = "/api/auth/login";
const REGISTER: &str = "/api/auth/register";
const LOGOUT: &str = "/api/auth/logout";

/// Email + password login.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// New account details. `role` is forwarded only when set.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Option<String>,
}

impl ApiClient {
    /// Exchange credentials for a token.
    ///
    /// `POST /api/auth/login`
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, Error> {
        debug!(email = %credentials.email, "logging in");

        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        self.post_anonymous(LOGIN, &body).await
    }

    /// Create an account; the response already carries a usable token.
    ///
    /// `POST /api/auth/register`
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, Error> {
        debug!(email = %registration.email, "registering account");

        let mut body = json!({
            "name": registration.name,
            "email": registration.email,
            "password": registration.password.expose_secret(),
        });
        if let Some(ref role) = registration.role {
            body["role"] = json!(role);
        }
        self.post_anonymous(REGISTER, &body).await
    }

    /// Revoke the current token server-side.
    ///
    /// `POST /api/auth/logout`
    pub async fn logout(&self) -> Result<(), Error> {
        let _: serde_json::Value = self.post(LOGOUT, &json!({})).await?;
        debug!("logout acknowledged");
        Ok(())
    }
}
