//! API types for signup, login and session introspection.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{api::models::users::UserResponse, config::PasswordConfig, errors::Error};

/// Request body for account creation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

impl SignupRequest {
    pub fn validate(&self, password_config: &PasswordConfig) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::Validation {
                message: "username must not be blank".to_string(),
            });
        }

        if !self.email.contains('@') {
            return Err(Error::Validation {
                message: "email must be a valid email address".to_string(),
            });
        }

        let length = self.password.chars().count();
        if length < password_config.min_length || length > password_config.max_length {
            return Err(Error::Validation {
                message: format!(
                    "password must be between {} and {} characters",
                    password_config.min_length, password_config.max_length
                ),
            });
        }

        Ok(())
    }
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the user and a bearer token for subsequent requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
}
