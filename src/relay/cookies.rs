//! Cookie plumbing between the browser and the upstream.
//!
//! `Set-Cookie` values are kept as raw [`HeaderValue`]s so they can be relayed
//! byte-for-byte; only the outbound `Cookie` context and the XSRF token are
//! derived from them.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};
use regex::Regex;
use std::borrow::Cow;

use super::RelayError;

const XSRF_TOKEN_PATTERN: &str = r"XSRF-TOKEN=([^;]+)";

/// Every `Set-Cookie` header of a response, in the order received.
#[must_use]
pub fn set_cookies(headers: &HeaderMap) -> Vec<HeaderValue> {
    headers.get_all(SET_COOKIE).iter().cloned().collect()
}

/// Join the inbound `Cookie` headers into a single value.
///
/// Returns `None` when the request carries no cookies at all.
#[must_use]
pub fn request_cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    if joined.is_empty() { None } else { Some(joined) }
}

/// Build the outbound `Cookie` header from `Set-Cookie` values.
///
/// Only the leading `name=value` of each cookie is kept; attributes are dropped.
/// Values that are not visible ASCII cannot be echoed and are skipped.
#[must_use]
pub fn cookie_header_from_set_cookies(set_cookies: &[HeaderValue]) -> String {
    set_cookies
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("; ")
}

/// XSRF token carried by the first `Set-Cookie` that has one, or an empty token.
///
/// # Errors
/// Returns [`RelayError::InvalidToken`] if the token does not decode to UTF-8.
pub fn xsrf_token_from_set_cookies(set_cookies: &[HeaderValue]) -> Result<String, RelayError> {
    set_cookies
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(find_xsrf_token)
        .map_or_else(|| Ok(String::new()), decode_token)
}

/// XSRF token from a browser `Cookie` header, or an empty token.
///
/// # Errors
/// Returns [`RelayError::InvalidToken`] if the token does not decode to UTF-8.
pub fn xsrf_token_from_cookie_header(cookie_header: &str) -> Result<String, RelayError> {
    find_xsrf_token(cookie_header).map_or_else(|| Ok(String::new()), decode_token)
}

fn find_xsrf_token(cookie: &str) -> Option<&str> {
    let re = Regex::new(XSRF_TOKEN_PATTERN).ok()?;
    re.captures(cookie)?.get(1).map(|found| found.as_str())
}

// Cookie values are percent-encoded by the upstream; `+` is not a space here.
fn decode_token(raw: &str) -> Result<String, RelayError> {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|_| RelayError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XSRF_COOKIE: &str = "XSRF-TOKEN=eyJpdiI6IkFCQyIsInZhbHVlIjoiMTIzIn0%3D; expires=Mon, 20 Oct 2026 10:00:00 GMT; Max-Age=7200; path=/; samesite=lax";
    const SESSION_COOKIE: &str = "laravel_session=abc123; expires=Mon, 20 Oct 2026 10:00:00 GMT; Max-Age=7200; path=/; httponly; samesite=lax";

    fn values(raw: &[&'static str]) -> Vec<HeaderValue> {
        raw.iter().copied().map(HeaderValue::from_static).collect()
    }

    #[test]
    fn set_cookies_keeps_every_header_in_order() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static(XSRF_COOKIE));
        headers.append(SET_COOKIE, HeaderValue::from_static(SESSION_COOKIE));
        headers.append(SET_COOKIE, HeaderValue::from_static("laravel_session=dup; path=/"));

        let cookies = set_cookies(&headers);
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[0], XSRF_COOKIE);
        assert_eq!(cookies[1], SESSION_COOKIE);
        assert_eq!(cookies[2], "laravel_session=dup; path=/");
    }

    #[test]
    fn xsrf_token_is_percent_decoded() -> Result<(), RelayError> {
        let token = xsrf_token_from_set_cookies(&values(&[SESSION_COOKIE, XSRF_COOKIE]))?;
        assert_eq!(token, "eyJpdiI6IkFCQyIsInZhbHVlIjoiMTIzIn0=");
        Ok(())
    }

    #[test]
    fn xsrf_token_keeps_plus_signs() -> Result<(), RelayError> {
        let token = xsrf_token_from_cookie_header("XSRF-TOKEN=a+b%2Bc")?;
        assert_eq!(token, "a+b+c");
        Ok(())
    }

    #[test]
    fn first_xsrf_cookie_wins() -> Result<(), RelayError> {
        let token = xsrf_token_from_set_cookies(&values(&[
            "XSRF-TOKEN=first; path=/",
            "XSRF-TOKEN=second; path=/",
        ]))?;
        assert_eq!(token, "first");
        Ok(())
    }

    #[test]
    fn missing_xsrf_cookie_yields_empty_token() -> Result<(), RelayError> {
        assert_eq!(xsrf_token_from_set_cookies(&values(&[SESSION_COOKIE]))?, "");
        assert_eq!(xsrf_token_from_set_cookies(&[])?, "");
        assert_eq!(xsrf_token_from_cookie_header("laravel_session=abc")?, "");
        assert_eq!(xsrf_token_from_cookie_header("XSRF-TOKEN=; a=b")?, "");
        Ok(())
    }

    #[test]
    fn xsrf_token_found_anywhere_in_cookie_header() -> Result<(), RelayError> {
        let token = xsrf_token_from_cookie_header("laravel_session=abc; XSRF-TOKEN=tok%20en")?;
        assert_eq!(token, "tok en");
        Ok(())
    }

    #[test]
    fn undecodable_token_is_rejected() {
        let result = xsrf_token_from_cookie_header("XSRF-TOKEN=%FF%FE");
        assert!(matches!(result, Err(RelayError::InvalidToken)));
    }

    #[test]
    fn cookie_header_keeps_only_name_value_pairs() {
        let header = cookie_header_from_set_cookies(&values(&[XSRF_COOKIE, SESSION_COOKIE]));
        assert_eq!(
            header,
            "XSRF-TOKEN=eyJpdiI6IkFCQyIsInZhbHVlIjoiMTIzIn0%3D; laravel_session=abc123"
        );
    }

    #[test]
    fn cookie_header_keeps_empty_values() {
        let header = cookie_header_from_set_cookies(&values(&["empty=; path=/", "bare"]));
        assert_eq!(header, "empty=; bare");
    }

    #[test]
    fn cookie_header_is_empty_without_cookies() {
        assert_eq!(cookie_header_from_set_cookies(&[]), "");
    }

    #[test]
    fn request_cookie_header_joins_split_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("laravel_session=abc"));
        headers.append(COOKIE, HeaderValue::from_static("XSRF-TOKEN=tok"));
        assert_eq!(
            request_cookie_header(&headers).as_deref(),
            Some("laravel_session=abc; XSRF-TOKEN=tok")
        );
    }

    #[test]
    fn request_cookie_header_absent_or_blank() {
        assert_eq!(request_cookie_header(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(""));
        assert_eq!(request_cookie_header(&headers), None);
    }
}
