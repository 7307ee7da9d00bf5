//! Route handlers for the browser-facing API.
//!
//! `auth` wraps the session relay; `health` reports build metadata.

pub mod auth;
pub mod health;
