//! Emporia API header construction.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Build the standard headers for authenticated API requests.
///
/// The bearer token is carried in the legacy `authtoken` header and
/// duplicated as a standard `Authorization: Bearer` header, which newer
/// c-api endpoints expect.
pub fn api_headers(bearer_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        HeaderName::from_static("authtoken"),
        HeaderValue::from_str(bearer_token)
            .unwrap_or_else(|_| HeaderValue::from_static("invalid")),
    );

    headers.insert(
        reqwest::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", bearer_token))
            .unwrap_or_else(|_| HeaderValue::from_static("Bearer invalid")),
    );

    headers.insert(
        reqwest::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );

    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/json"),
    );

    headers
}

/// Build headers for the persistent event stream connection.
pub fn stream_headers(bearer_token: &str) -> HeaderMap {
    let mut headers = api_headers(bearer_token);

    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("text/event-stream"),
    );

    headers
}
