//! Identity and logout endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use txportal_core::Identity;

use crate::extract::AuthUser;
use crate::AppState;

pub async fn api_me(user: AuthUser) -> Json<Identity> {
    Json(user.0)
}

/// Drop the caller's results; the token itself stays with the identity service
pub async fn api_logout(State(state): State<AppState>, user: AuthUser) -> StatusCode {
    let removed = state.sessions.write().await.remove(&user.session_key());
    log::info!(
        target: "txportal::api",
        "{} signed out (had session: {})",
        user.0.email,
        removed.is_some()
    );
    StatusCode::NO_CONTENT
}
