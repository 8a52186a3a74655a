use serde::{Deserialize, Serialize};

use super::tokens::Token;

/// Request body for login. No `Debug`: it carries the password.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `{"authentication_token": {"token": .., "expiry": ..}}`
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub authentication_token: Token,
}
