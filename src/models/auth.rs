use serde::{Deserialize, Serialize};

/// Body of `POST login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
