use serde::{Deserialize, Serialize};

use super::repo_types::User;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub version: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}
