//! Error types for txportal-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use txportal_core::{CoreError, ErrorCode, ErrorDetails};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No encontrado: {resource}")]
    NotFound { resource: String },

    #[error("Solicitud inválida: {message}")]
    BadRequest { message: String },

    #[error("La búsqueda fue reemplazada por una más reciente")]
    Superseded,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e.code() {
                ErrorCode::AuthRejected => StatusCode::UNAUTHORIZED,
                ErrorCode::AuthUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                ErrorCode::ProviderTimeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorCode::ProviderHttp
                | ErrorCode::ProviderLogic
                | ErrorCode::ProviderUnavailable
                | ErrorCode::InvalidResponse => StatusCode::BAD_GATEWAY,
                ErrorCode::ConfigError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Superseded => StatusCode::CONFLICT,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::ValidationError, self.to_string()),
            _ => ErrorDetails::new(ErrorCode::InternalError, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_details())).into_response()
    }
}
