use std::sync::Arc;
use std::time::Duration;

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::resource::Resource;
use super::ResourceSource;
use crate::config::ClientConfig;
use crate::models::{LoginRequest, LoginResponse, Records, User};
use crate::session::Session;

/// HTTP client for the clinic REST backend.
///
/// Cheap to clone: the underlying connection pool and session are shared.
#[derive(Clone)]
pub struct ClinicClient {
    base_url: Url,
    client: reqwest::Client,
    timeout_secs: u64,
    session: Option<Arc<Session>>,
}

impl ClinicClient {
    /// Create a client for the given base URL. A trailing slash is added so
    /// relative resource paths join under it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            timeout_secs: timeout.as_secs(),
            session: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeout)
    }

    /// Attach an authenticated session; every request carries its token.
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Detach the session, e.g. once the backend has rejected its token.
    pub fn without_session(mut self) -> Self {
        self.session = None;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `GET users/`: the signed-in user.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("users/").await
    }

    /// `POST login/`: exchange credentials for a token.
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse, ApiError> {
        let url = self.url("login/")?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::decode(Self::check_status(response).await?).await
    }

    /// `GET <path>` decoded as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let mut request = self.client.get(url);
        if let Some(session) = &self.session {
            request = request.header(reqwest::header::AUTHORIZATION, session.authorization());
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        Self::decode(Self::check_status(response).await?).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_connect() {
            ApiError::Connection(self.base_url.to_string())
        } else if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::HttpClient(e.to_string())
        }
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::ResponseParsing(e.to_string()))
    }
}

impl ResourceSource for ClinicClient {
    async fn fetch(&self, resource: Resource) -> Result<Records, ApiError> {
        self.get_json(resource.path()).await
    }
}

impl std::fmt::Debug for ClinicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClinicClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .field("session", &self.session)
            .finish()
    }
}
