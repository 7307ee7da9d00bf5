//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::relay::Credential;

/// Login form as posted by the browser.
///
/// Missing fields become empty strings so the upstream runs its own validation.
/// Fields that are present but not strings fail to parse.
#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<LoginRequest> for Credential {
    fn from(request: LoginRequest) -> Self {
        Self::new(request.email, request.password)
    }
}

/// Body of every message-only response (logout, errors).
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
