use axum::http::{header, HeaderMap};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "aic_session";
pub const CONSENT_COOKIE: &str = "cookiesAccepted";

/// Consent has no expiry; ten years is as close as a cookie gets.
const CONSENT_MAX_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Value of the first cookie named `name` across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    read_cookie(headers, SESSION_COOKIE).and_then(|v| Uuid::parse_str(&v).ok())
}

pub fn consent_accepted(headers: &HeaderMap) -> bool {
    read_cookie(headers, CONSENT_COOKIE).as_deref() == Some("true")
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn consent_cookie() -> String {
    format!(
        "{}=true; Path=/; Max-Age={}; SameSite=Lax",
        CONSENT_COOKIE, CONSENT_MAX_AGE_SECS
    )
}
