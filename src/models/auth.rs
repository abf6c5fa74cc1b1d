//! Authentication-related models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::User;

/// Login credentials
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

/// Login response from the identity API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
