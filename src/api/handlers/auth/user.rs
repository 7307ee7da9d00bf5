use axum::{extract::Extension, http::HeaderMap, response::Response};
use std::sync::Arc;
use tracing::instrument;

use super::{respond, types::MessageResponse};
use crate::relay::{SessionRelay, cookies::request_cookie_header};

#[utoipa::path(
    get,
    path = "/api/auth/user",
    responses(
        (status = 200, description = "Current user as returned by the upstream; renewed cookies relayed"),
        (status = 401, description = "No session cookie, or the upstream refused it", body = MessageResponse),
        (status = 500, description = "Upstream unreachable or returned invalid JSON", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn user(relay: Extension<Arc<SessionRelay>>, headers: HeaderMap) -> Response {
    let cookie_header = request_cookie_header(&headers);
    respond(relay.fetch_current_user(cookie_header.as_deref()).await)
}
