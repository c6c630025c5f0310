// HTTP client for the hospital directory API
//
// Wraps `reqwest::Client` with base-URL joining, per-request bearer
// attachment, 401 interception and JSON decoding. Endpoint groups live in
// `endpoints/` as inherent methods so this file stays about transport.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{Bearer, TokenSource};
use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the hospital directory API.
///
/// Cheap to clone: the underlying connection pool and token source are
/// shared. The bearer token is read from the [`TokenSource`] at the moment
/// each request is issued.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("has_token_source", &self.tokens.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` from a transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout: Some(transport.timeout),
            tokens: None,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages timeouts and TLS).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout: None,
            tokens: None,
        })
    }

    /// Attach a token source. Every request issued afterwards asks it for
    /// the current bearer token.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// The API base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the base path ends with a slash so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint path (e.g. `"/api/hospitals"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// `{path}/{id}` with `id` percent-encoded as exactly one path segment,
    /// so `/`, `?` and `#` inside it stay part of the id.
    ///
    /// `url` silently drops `.` and `..` segments, so those are refused.
    pub(crate) fn item_url(&self, path: &str, id: &str) -> Result<Url, Error> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(Error::InvalidPathSegment {
                segment: id.to_owned(),
            });
        }
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// `GET path?params`, decoding the JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.get_url(self.url(path)?, params).await
    }

    pub(crate) async fn get_url<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let req = self.http.get(url).query(params);
        self.execute(req, Bearer::Session).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let req = self.http.post(url).json(body);
        self.execute(req, Bearer::Session).await
    }

    /// `POST path` without a bearer token, for credential exchange.
    pub(crate) async fn post_anonymous<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (anonymous)");

        let req = self.http.post(url).json(body);
        self.execute(req, Bearer::Omit).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.put_url(self.url(path)?, body).await
    }

    pub(crate) async fn put_url<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");

        let req = self.http.put(url).json(body);
        self.execute(req, Bearer::Session).await
    }

    /// `DELETE path`. An empty response body decodes as JSON `null`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.delete_url(self.url(path)?).await
    }

    pub(crate) async fn delete_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {url}");

        let req = self.http.delete(url);
        self.execute(req, Bearer::Session).await
    }

    // ── Request execution ────────────────────────────────────────────

    /// Attach the bearer (if any), send, and map the response.
    ///
    /// A 401 on a request that carried a token invalidates that token
    /// before the error is returned.
    async fn execute<T: DeserializeOwned>(
        &self,
        mut req: RequestBuilder,
        bearer: Bearer,
    ) -> Result<T, Error> {
        let token = match (bearer, &self.tokens) {
            (Bearer::Session, Some(tokens)) => tokens.bearer_token(),
            _ => None,
        };
        if let Some(ref token) = token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req.send().await.map_err(|e| self.map_send_error(e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let message = server_message(&body);
            if let (Some(token), Some(tokens)) = (token, &self.tokens) {
                warn!("bearer token rejected by server, invalidating session");
                tokens.invalidate(&token);
            }
            return Err(Error::Unauthorized { message });
        }

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        let text = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.map_or(0, |t| t.as_secs()),
            }
        } else {
            Error::Transport(err)
        }
    }
}
