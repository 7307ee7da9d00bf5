//! # Kintai session relay
//!
//! `kintai` sits between the browser-facing login shell of the attendance
//! management app and its cookie-session upstream API. The browser never talks
//! to the upstream directly; instead it calls three endpoints here:
//!
//! - `POST /api/auth/login` fetches a fresh CSRF cookie from the upstream,
//!   then submits the credentials with that cookie and the decoded token.
//! - `POST /api/auth/logout` forwards the browser's session cookie and the
//!   token it already holds.
//! - `GET /api/auth/user` returns the current user, or 401 without a session
//!   cookie.
//!
//! Every `Set-Cookie` header from the upstream is relayed to the browser
//! unchanged, so the session stays owned by the upstream.
//!
//! The relay itself keeps no state between requests. See [`relay::SessionRelay`].

pub mod api;
pub mod cli;
pub mod relay;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
