//! Session relay between the browser-facing API and the upstream session API.
//!
//! The upstream (a Sanctum style cookie-session API) owns every session. The
//! relay keeps no state between calls: each operation rebuilds its cookie
//! context from the incoming request, talks to the upstream once or twice in
//! strict order, and hands the upstream's `Set-Cookie` headers back untouched.
//!
//! - [`SessionRelay::authenticate`]: CSRF pre-flight, then credential submit.
//! - [`SessionRelay::deauthenticate`]: logout with the browser's own cookies.
//! - [`SessionRelay::fetch_current_user`]: current user, renewing cookies.

pub mod cookies;
mod error;

pub use error::{RelayError, SERVER_ERROR_MESSAGE, UNAUTHENTICATED_MESSAGE};

use anyhow::{Context, Result, bail};
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

const CSRF_COOKIE_PATH: &str = "sanctum/csrf-cookie";
const LOGIN_PATH: &str = "api/login";
const LOGOUT_PATH: &str = "api/logout";
const USER_PATH: &str = "api/user";

const XSRF_HEADER: &str = "x-xsrf-token";
const APPLICATION_JSON: &str = "application/json";

const LOGIN_FAILED_MESSAGE: &str = "ログインに失敗しました";
const LOGOUT_FAILED_MESSAGE: &str = "ログアウトに失敗しました";
const LOGOUT_MESSAGE: &str = "ログアウトしました";
const USER_FAILED_MESSAGE: &str = "認証に失敗しました";

/// Login credentials, held only for the duration of one request.
#[derive(Debug)]
pub struct Credential {
    pub email: String,
    pub password: SecretString,
}

impl Credential {
    #[must_use]
    pub fn new(email: String, password: String) -> Self {
        Self {
            email,
            password: SecretString::from(password),
        }
    }
}

/// What the browser gets back: status, JSON body and the relayed cookies.
#[derive(Debug)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookies: Vec<HeaderValue>,
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        // One header per upstream cookie; never merged, never deduplicated.
        for cookie in self.cookies {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        response
    }
}

#[derive(Debug, Clone)]
pub struct SessionRelay {
    client: Client,
    api_url: String,
    frontend_origin: String,
}

impl SessionRelay {
    /// Create a relay for the upstream at `api_url`.
    ///
    /// `frontend_origin` stands in for the `Origin` of requests that carry none.
    /// Without `timeout`, upstream calls wait indefinitely.
    ///
    /// # Errors
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be built.
    pub fn new(api_url: &str, frontend_origin: &str, timeout: Option<Duration>) -> Result<Self> {
        let parsed =
            Url::parse(api_url).with_context(|| format!("Invalid upstream API URL: {api_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Upstream API URL must use http or https: {api_url}");
        }

        let mut builder = Client::builder().user_agent(crate::APP_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            frontend_origin: frontend_origin.to_string(),
        })
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub fn frontend_origin(&self) -> &str {
        &self.frontend_origin
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    fn origin_and_referer<'a>(
        &'a self,
        origin: Option<&'a str>,
        referer: Option<&'a str>,
    ) -> (&'a str, &'a str) {
        let origin = origin
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.frontend_origin);
        let referer = referer.filter(|value| !value.is_empty()).unwrap_or(origin);
        (origin, referer)
    }

    /// Log in against the upstream and relay its session cookies.
    ///
    /// # Errors
    /// - [`RelayError::UpstreamUnavailable`] if the CSRF pre-flight is not successful.
    /// - [`RelayError::UpstreamRejected`] with the upstream status if the login fails.
    /// - Transport, body and token errors for anything else.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        credential: &Credential,
        origin: Option<&str>,
        referer: Option<&str>,
    ) -> Result<RelayResponse, RelayError> {
        let csrf_response = self
            .client
            .get(self.endpoint(CSRF_COOKIE_PATH))
            .header(ACCEPT, APPLICATION_JSON)
            .send()
            .await?;

        if !csrf_response.status().is_success() {
            error!("CSRF cookie request failed: {}", csrf_response.status());
            return Err(RelayError::UpstreamUnavailable(csrf_response.status()));
        }

        let csrf_cookies = cookies::set_cookies(csrf_response.headers());
        let xsrf_token = cookies::xsrf_token_from_set_cookies(&csrf_cookies)?;
        if xsrf_token.is_empty() {
            // Let the upstream reject the login instead of guessing here.
            warn!("CSRF cookie response carried no XSRF-TOKEN cookie");
        }
        let cookie_header = cookies::cookie_header_from_set_cookies(&csrf_cookies);
        debug!(cookies = csrf_cookies.len(), "received CSRF cookies");

        let (origin, referer) = self.origin_and_referer(origin, referer);
        let body = json!({
            "email": credential.email,
            "password": credential.password.expose_secret(),
        });

        let response = self
            .client
            .post(self.endpoint(LOGIN_PATH))
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .header(XSRF_HEADER, xsrf_token)
            .header(COOKIE, cookie_header)
            .header(REFERER, referer)
            .header(ORIGIN, origin)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let relayed = cookies::set_cookies(response.headers());

        if !status.is_success() {
            let message = upstream_message(response)
                .await
                .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
            return Err(RelayError::UpstreamRejected { status, message });
        }

        let body = json_body(response).await?;
        debug!(cookies = relayed.len(), "login accepted by upstream");

        Ok(RelayResponse {
            status,
            body,
            cookies: relayed,
        })
    }

    /// Log out the session identified by the browser's cookies.
    ///
    /// # Errors
    /// - [`RelayError::UpstreamRejected`] with the upstream status if the logout fails.
    /// - Transport and token errors for anything else.
    #[instrument(skip_all)]
    pub async fn deauthenticate(
        &self,
        cookie_header: Option<&str>,
        origin: Option<&str>,
        referer: Option<&str>,
    ) -> Result<RelayResponse, RelayError> {
        let cookie_header = cookie_header.unwrap_or_default();
        let xsrf_token = cookies::xsrf_token_from_cookie_header(cookie_header)?;
        let (origin, referer) = self.origin_and_referer(origin, referer);

        let response = self
            .client
            .post(self.endpoint(LOGOUT_PATH))
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .header(XSRF_HEADER, xsrf_token)
            .header(COOKIE, cookie_header)
            .header(REFERER, referer)
            .header(ORIGIN, origin)
            .send()
            .await?;

        let status = response.status();
        let relayed = cookies::set_cookies(response.headers());

        if !status.is_success() {
            let message = upstream_message(response)
                .await
                .unwrap_or_else(|| LOGOUT_FAILED_MESSAGE.to_string());
            return Err(RelayError::UpstreamRejected { status, message });
        }

        debug!(cookies = relayed.len(), "logout accepted by upstream");

        Ok(RelayResponse {
            status: StatusCode::OK,
            body: json!({ "message": LOGOUT_MESSAGE }),
            cookies: relayed,
        })
    }

    /// Fetch the user behind the browser's session, relaying renewed cookies.
    ///
    /// # Errors
    /// - [`RelayError::Unauthenticated`] without contacting the upstream if there are no cookies.
    /// - [`RelayError::UpstreamRejected`] with the upstream status if the upstream refuses.
    /// - Transport and body errors for anything else.
    #[instrument(skip_all)]
    pub async fn fetch_current_user(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<RelayResponse, RelayError> {
        let Some(cookie_header) = cookie_header.filter(|value| !value.is_empty()) else {
            return Err(RelayError::Unauthenticated);
        };

        let response = self
            .client
            .get(self.endpoint(USER_PATH))
            .header(ACCEPT, APPLICATION_JSON)
            .header(COOKIE, cookie_header)
            .send()
            .await?;

        let status = response.status();
        let relayed = cookies::set_cookies(response.headers());

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(%status, body = %detail, "upstream refused current user");
            return Err(RelayError::UpstreamRejected {
                status,
                message: USER_FAILED_MESSAGE.to_string(),
            });
        }

        let body = json_body(response).await?;

        Ok(RelayResponse {
            status,
            body,
            cookies: relayed,
        })
    }
}

/// The upstream's `message` field, if its error body has a non-empty one.
async fn upstream_message(response: reqwest::Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

async fn json_body(response: reqwest::Response) -> Result<Value, RelayError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
