//! Browser-facing auth endpoints.
//!
//! Each handler pulls the headers the upstream cares about (`Cookie`, `Origin`,
//! `Referer`) out of the request and hands them to the [`SessionRelay`].
//! Responses mirror the upstream; relay failures collapse to a generic 500.
//!
//! [`SessionRelay`]: crate::relay::SessionRelay

pub mod login;
pub mod logout;
pub mod types;
pub mod user;

use crate::relay::{RelayError, RelayResponse};
use axum::{
    http::{
        HeaderMap,
        header::{HeaderName, ORIGIN, REFERER},
    },
    response::{IntoResponse, Response},
};
use tracing::{error, info};

/// Non-empty `Origin` header of the inbound request.
fn origin(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, &ORIGIN)
}

/// Non-empty `Referer` header of the inbound request.
fn referer(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, &REFERER)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Render a relay outcome, logging failures by who caused them.
fn respond(result: Result<RelayResponse, RelayError>) -> Response {
    match result {
        Ok(response) => response.into_response(),
        Err(err) if err.is_rejection() => {
            info!("Upstream rejected request: {err}");
            err.into_response()
        }
        Err(err) => {
            error!("Relay failed: {err}");
            err.into_response()
        }
    }
}
