//! Filter and page the caller's current results

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use txportal_core::ResultPage;

use crate::extract::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct MovementsQuery {
    /// Free-text filter; a new value goes back to page 1
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

pub async fn api_movements(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MovementsQuery>,
) -> Result<Json<ResultPage>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&user.session_key())
        .filter(|session| session.result().is_some())
        .ok_or_else(|| ApiError::NotFound {
            resource: "resultados de búsqueda".to_string(),
        })?;

    if let Some(filter) = &query.q {
        session.set_filter(filter);
    }
    if let Some(page) = query.page {
        session.set_page(page);
    }
    Ok(Json(session.view()))
}
