use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::cookies;

/// Record cookie consent and send the visitor back to the page.
pub async fn accept(headers: axum::http::HeaderMap) -> Response {
    if !cookies::consent_accepted(&headers) {
        debug!("[aichecking] Cookie consent accepted");
    }
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, cookies::consent_cookie()),
        ],
    )
        .into_response()
}
