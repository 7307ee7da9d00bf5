use axum::{
    body::Bytes,
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    origin, referer, respond,
    types::{LoginRequest, MessageResponse},
};
use crate::relay::{Credential, RelayError, SessionRelay};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login accepted; upstream body and session cookies relayed"),
        (status = 401, description = "Upstream rejected the credentials", body = MessageResponse),
        (status = 419, description = "Upstream rejected the CSRF token", body = MessageResponse),
        (status = 422, description = "Upstream validation failed", body = MessageResponse),
        (status = 500, description = "Upstream unreachable or payload invalid", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    relay: Extension<Arc<SessionRelay>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Parsed regardless of Content-Type; browsers may post JSON as text/plain.
    let request = match serde_json::from_slice::<LoginRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            // serde_json messages can echo field values; keep only the position.
            let reason = format!(
                "{:?} error at line {} column {}",
                err.classify(),
                err.line(),
                err.column()
            );
            error!("Invalid login payload: {reason}");
            return RelayError::InvalidPayload(reason).into_response();
        }
    };

    let credential = Credential::from(request);
    respond(
        relay
            .authenticate(&credential, origin(&headers), referer(&headers))
            .await,
    )
}
