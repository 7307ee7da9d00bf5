use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Message returned for every failure the browser cannot act on.
pub const SERVER_ERROR_MESSAGE: &str = "サーバーエラーが発生しました";

/// Message returned when a request arrives without any session cookie.
pub const UNAUTHENTICATED_MESSAGE: &str = "認証情報がありません";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("upstream CSRF cookie request failed with status {0}")]
    UpstreamUnavailable(StatusCode),
    #[error("upstream rejected the request with status {status}: {message}")]
    UpstreamRejected { status: StatusCode, message: String },
    #[error("no session cookie present")]
    Unauthenticated,
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid upstream response body: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error("XSRF token is not valid UTF-8 once decoded")]
    InvalidToken,
    #[error("invalid request payload: {0}")]
    InvalidPayload(String),
}

impl RelayError {
    /// Status code the browser receives for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UpstreamRejected { status, .. } => *status,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::UpstreamUnavailable(_)
            | Self::Transport(_)
            | Self::InvalidBody(_)
            | Self::InvalidToken
            | Self::InvalidPayload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message the browser receives for this error.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::UpstreamRejected { message, .. } => message,
            Self::Unauthenticated => UNAUTHENTICATED_MESSAGE,
            _ => SERVER_ERROR_MESSAGE,
        }
    }

    /// Errors the upstream decided on, as opposed to failures of the relay itself.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::UpstreamRejected { .. } | Self::Unauthenticated)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(error: RelayError) -> Result<(StatusCode, Value)> {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&body)?))
    }

    #[tokio::test]
    async fn rejection_keeps_upstream_status_and_message() -> Result<()> {
        let (status, body) = body_json(RelayError::UpstreamRejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "The provided credentials are incorrect.".to_string(),
        })
        .await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "The provided credentials are incorrect.");
        Ok(())
    }

    #[tokio::test]
    async fn unauthenticated_maps_to_401() -> Result<()> {
        let (status, body) = body_json(RelayError::Unauthenticated).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], UNAUTHENTICATED_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn relay_failures_are_generic_500() -> Result<()> {
        for error in [
            RelayError::UpstreamUnavailable(StatusCode::BAD_GATEWAY),
            RelayError::InvalidToken,
            RelayError::InvalidPayload("EOF while parsing".to_string()),
        ] {
            assert!(!error.is_rejection());
            let (status, body) = body_json(error).await?;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["message"], SERVER_ERROR_MESSAGE);
        }
        Ok(())
    }

    #[test]
    fn invalid_body_comes_from_serde() {
        let error = serde_json::from_str::<Value>("<html>").map_err(RelayError::from);
        assert!(matches!(error, Err(RelayError::InvalidBody(_))));
    }
}
