//! Login form: validate credentials, exchange them for a token, persist it.

use zeroize::Zeroize;

use crate::api::{ApiError, ClinicClient};
use crate::models::LoginRequest;
use crate::routes::Route;
use crate::session::{Session, SessionError, TokenStore};

/// Credentials typed into the login screen. Zeroed on drop.
#[derive(Default, Zeroize)]
#[zeroize(drop)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug)]
pub struct LoggedIn {
    pub session: Session,
    pub redirect: Route,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), LoginError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(LoginError::MissingField("email"));
        }
        if self.password.trim().is_empty() {
            return Err(LoginError::MissingField("password"));
        }
        if !email.contains('@') {
            return Err(LoginError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }

    /// Validate, `POST login/`, and persist the issued token under `Token`.
    pub async fn submit(
        &self,
        client: &ClinicClient,
        store: &TokenStore,
    ) -> Result<LoggedIn, LoginError> {
        let result = self.try_submit(client, store).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Error during login");
        }
        result
    }

    async fn try_submit(
        &self,
        client: &ClinicClient,
        store: &TokenStore,
    ) -> Result<LoggedIn, LoginError> {
        self.validate()?;

        let request = LoginRequest {
            email: self.email.trim(),
            password: &self.password,
        };
        let response = client.login(&request).await?;
        if response.token.is_empty() {
            return Err(LoginError::EmptyToken);
        }

        let session = Session::new(response.token);
        session.persist(store)?;
        tracing::info!(session_id = %session.id(), "Logged in");

        Ok(LoggedIn {
            session,
            redirect: Route::Home,
        })
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Errors from the login flow.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Not an email address: {0}")]
    InvalidEmail(String),
    #[error("Login rejected: {0}")]
    Api(#[from] ApiError),
    #[error("Backend returned an empty token")]
    EmptyToken,
    #[error("Could not store session: {0}")]
    Store(#[from] SessionError),
}

impl LoginError {
    /// Whether the backend refused the credentials (as opposed to being unreachable).
    pub fn is_rejected(&self) -> bool {
        matches!(self, LoginError::Api(e) if e.is_unauthorized())
    }
}
