use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;

use super::known_session;
use crate::cookies;
use crate::input::input_state;
use crate::state::AppState;
use crate::templates::page::{self, PageView, Status};

/// The empty page. Sessions are only created by a check, so visitors who
/// never submit leave nothing behind.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let busy = known_session(&state, &headers).is_some_and(|s| s.is_busy());
    let view = PageView {
        text: "",
        input: input_state("", busy),
        status: Status::Ready,
        error: None,
        display: None,
        show_cookie_banner: !cookies::consent_accepted(&headers),
    };
    Html(page::render(&view))
}
