use axum::{extract::Extension, http::HeaderMap, response::Response};
use std::sync::Arc;
use tracing::instrument;

use super::{origin, referer, respond, types::MessageResponse};
use crate::relay::{SessionRelay, cookies::request_cookie_header};

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out; upstream cookie updates relayed", body = MessageResponse),
        (status = 401, description = "Upstream has no such session", body = MessageResponse),
        (status = 419, description = "Upstream rejected the CSRF token", body = MessageResponse),
        (status = 500, description = "Upstream unreachable", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(relay: Extension<Arc<SessionRelay>>, headers: HeaderMap) -> Response {
    let cookie_header = request_cookie_header(&headers);
    respond(
        relay
            .deauthenticate(
                cookie_header.as_deref(),
                origin(&headers),
                referer(&headers),
            )
            .await,
    )
}
