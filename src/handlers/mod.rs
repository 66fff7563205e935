pub mod check;
pub mod consent;
pub mod health;
pub mod metrics;
pub mod page;

use axum::error_handling::HandleErrorLayer;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::cookies;
use crate::session::Session;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = if let Some(ref origins) = state.config.cors_origins {
        let origins: Vec<_> = origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let check_rate_limit = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
            StatusCode::TOO_MANY_REQUESTS
        }))
        .layer(BufferLayer::new(64))
        .layer(RateLimitLayer::new(30, Duration::from_secs(60)));

    Router::new()
        .route("/", get(page::index))
        .route(
            "/check",
            post(check::check_form).layer(check_rate_limit.clone()),
        )
        .route(
            "/api/check",
            post(check::check_json).layer(check_rate_limit),
        )
        .route("/consent", post(consent::accept))
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::metrics))
        .layer(cors)
        .with_state(state)
}

/// The session named by the visitor's cookie, if this process still has it.
/// Never creates one.
pub(crate) fn known_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    cookies::session_id(headers).and_then(|id| state.sessions.get(id))
}

/// The visitor's session, created on first use, plus the `Set-Cookie` value to send when the
/// cookie was missing or named a session this process no longer knows.
pub(crate) fn session_for(state: &AppState, headers: &HeaderMap) -> (Session, Option<String>) {
    let requested = cookies::session_id(headers);
    let session = state.sessions.get_or_create(requested);
    let set_cookie = (requested != Some(session.id)).then(|| cookies::session_cookie(session.id));
    (session, set_cookie)
}

pub(crate) fn with_cookie(response: impl IntoResponse, set_cookie: Option<String>) -> Response {
    let mut response = response.into_response();
    if let Some(value) = set_cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}
