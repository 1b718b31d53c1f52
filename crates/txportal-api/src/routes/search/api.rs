//! Search endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use txportal_core::{
    AccountQueryResult, CoreError, ErrorContext, ProviderId, ResultPage, SearchCriteria, SearchWarning,
};

use crate::extract::AuthUser;
use crate::{ApiError, AppState};

/// Account metadata without the movement list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub number: String,
    pub account_type: String,
    pub status: String,
    pub currency: String,
    pub opened_date: String,
    pub available_balance: f64,
}

impl From<&AccountQueryResult> for AccountSummary {
    fn from(result: &AccountQueryResult) -> Self {
        Self {
            number: result.number.clone(),
            account_type: result.account_type.clone(),
            status: result.status.clone(),
            currency: result.currency.clone(),
            opened_date: result.opened_date.clone(),
            available_balance: result.available_balance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub provider: ProviderId,
    pub account: AccountSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SearchWarning>,
    /// First page of the unfiltered results
    pub page: ResultPage,
}

pub async fn api_search(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<SearchCriteria>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(criteria) = payload.map_err(|e| ApiError::BadRequest {
        message: e.body_text(),
    })?;
    let key = user.session_key();
    let context = ErrorContext::new("search").with_user(user.0.email.clone());

    let ticket = {
        let mut sessions = state.sessions.write().await;
        sessions
            .entry(key.clone())
            .or_insert_with(|| state.new_session())
            .begin_search()
    };

    // the session lock is not held while the provider answers
    let outcome = state.portal.search(&criteria).await;
    let failure = outcome.as_ref().err().cloned();
    if let Some(e) = &failure {
        state.error_logger.log_error(e, &context);
    }

    let mut sessions = state.sessions.write().await;
    let session = sessions.entry(key).or_insert_with(|| state.new_session());
    if !session.complete(ticket, outcome) {
        return Err(ApiError::Superseded);
    }
    if let Some(e) = failure {
        return Err(e.into());
    }

    let result = session.result().ok_or_else(|| CoreError::InternalError {
        message: "search result missing after completion".to_string(),
    })?;
    if let Some(SearchWarning::PaginationSafetyLimitReached { pages }) = result.warnings.first() {
        state.error_logger.log_warning(
            &format!("results truncated after {} pages", pages),
            &context,
        );
    }

    Ok(Json(SearchResponse {
        provider: criteria.provider(),
        account: AccountSummary::from(result),
        warnings: result.warnings.clone(),
        page: session.view(),
    }))
}
