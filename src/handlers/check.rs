use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::{session_for, with_cookie};
use crate::checker::CheckOutcome;
use crate::cookies;
use crate::input::input_state;
use crate::state::AppState;
use crate::templates::page::{self, PageView, Status};

#[derive(Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub text: String,
}

/// Error body in the shape the analysis service itself uses.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Form submit from the page. Always answers with the full page.
pub async fn check_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(request): Form<CheckRequest>,
) -> Response {
    let (session, set_cookie) = session_for(&state, &headers);
    let show_cookie_banner = !cookies::consent_accepted(&headers);
    let text = request.text.as_str();

    let (status, html) = match state.checker.check(&session, text).await {
        Ok(outcome) => (
            StatusCode::OK,
            page::render(&PageView {
                text,
                input: input_state(text, false),
                status: Status::Complete,
                error: None,
                display: Some(&outcome.display),
                show_cookie_banner,
            }),
        ),
        Err(e) => (
            e.status_code(),
            page::render(&PageView {
                text,
                input: input_state(text, session.is_busy()),
                status: Status::Error,
                error: Some(e.to_string()),
                display: None,
                show_cookie_banner,
            }),
        ),
    };

    with_cookie((status, Html(html)), set_cookie)
}

pub async fn check_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(ErrorResponse {
                    detail: rejection.body_text(),
                }),
            )
                .into_response();
        }
    };

    let (session, set_cookie) = session_for(&state, &headers);
    let response = match state.checker.check(&session, &request.text).await {
        Ok(outcome) => Json::<CheckOutcome>(outcome).into_response(),
        Err(e) => (
            e.status_code(),
            Json(ErrorResponse {
                detail: e.to_string(),
            }),
        )
            .into_response(),
    };
    with_cookie(response, set_cookie)
}
