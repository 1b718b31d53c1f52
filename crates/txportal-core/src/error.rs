//! Error types for txportal-core
//!
//! Every failure a search or sign-in can produce, with stable error codes,
//! severities and user-facing suggestions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Identity rejected (wrong domain, invalid or expired token)
    AuthRejected,
    /// Token validation endpoint unreachable
    AuthUnavailable,
    /// Search criteria incomplete or inconsistent
    ValidationError,
    /// Provider answered with a non-success status
    ProviderHttp,
    /// Provider answered successfully but reported a business failure
    ProviderLogic,
    /// Provider did not answer in time
    ProviderTimeout,
    /// Provider could not be reached
    ProviderUnavailable,
    /// Provider payload could not be decoded
    InvalidResponse,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::AuthRejected => write!(f, "AUTH_REJECTED"),
            ErrorCode::AuthUnavailable => write!(f, "AUTH_UNAVAILABLE"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::ProviderHttp => write!(f, "PROVIDER_HTTP"),
            ErrorCode::ProviderLogic => write!(f, "PROVIDER_LOGIC"),
            ErrorCode::ProviderTimeout => write!(f, "PROVIDER_TIMEOUT"),
            ErrorCode::ProviderUnavailable => write!(f, "PROVIDER_UNAVAILABLE"),
            ErrorCode::InvalidResponse => write!(f, "INVALID_RESPONSE"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for txportal-core
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("Acceso denegado: {reason}")]
    AuthRejected { reason: String },

    #[error("Servicio de identidad no disponible: {message}")]
    AuthUnavailable { message: String },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("Error al consultar {provider}: {status}")]
    ProviderHttp {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider}: {message}")]
    ProviderLogic { provider: String, message: String },

    #[error("{provider} no respondió a tiempo")]
    ProviderTimeout { provider: String },

    #[error("No se pudo conectar con {provider}: {message}")]
    ProviderUnavailable { provider: String, message: String },

    #[error("Respuesta inesperada de {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("Error de configuración: {message}")]
    ConfigError { message: String },

    #[error("Error interno: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::AuthRejected { .. } => ErrorCode::AuthRejected,
            CoreError::AuthUnavailable { .. } => ErrorCode::AuthUnavailable,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::ProviderHttp { .. } => ErrorCode::ProviderHttp,
            CoreError::ProviderLogic { .. } => ErrorCode::ProviderLogic,
            CoreError::ProviderTimeout { .. } => ErrorCode::ProviderTimeout,
            CoreError::ProviderUnavailable { .. } => ErrorCode::ProviderUnavailable,
            CoreError::InvalidResponse { .. } => ErrorCode::InvalidResponse,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::AuthRejected { .. } => ErrorSeverity::Warning,
            CoreError::AuthUnavailable { .. } => ErrorSeverity::Error,
            CoreError::ValidationError { .. } => ErrorSeverity::Info,
            CoreError::ProviderHttp { .. } => ErrorSeverity::Error,
            CoreError::ProviderLogic { .. } => ErrorSeverity::Warning,
            CoreError::ProviderTimeout { .. } => ErrorSeverity::Error,
            CoreError::ProviderUnavailable { .. } => ErrorSeverity::Error,
            CoreError::InvalidResponse { .. } => ErrorSeverity::Error,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// True for failures that came from a provider round-trip
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            CoreError::ProviderHttp { .. }
                | CoreError::ProviderLogic { .. }
                | CoreError::ProviderTimeout { .. }
                | CoreError::ProviderUnavailable { .. }
                | CoreError::InvalidResponse { .. }
        )
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::AuthRejected { .. } => {
                details = details.with_suggestion(
                    "Inicia sesión nuevamente con una cuenta autorizada.".to_string(),
                );
            }
            CoreError::ValidationError { .. } => {
                details = details
                    .with_suggestion("Completa todos los campos de búsqueda y revisa las fechas.".to_string());
            }
            CoreError::ProviderHttp { provider, status, body } => {
                details = details.with_detail(serde_json::json!({
                    "provider": provider,
                    "status": status,
                    "body": body,
                }));
                details = details.with_suggestion(
                    "Verifica la conexión e intenta la búsqueda nuevamente.".to_string(),
                );
            }
            CoreError::ProviderLogic { provider, .. } => {
                details = details.with_detail(serde_json::json!({ "provider": provider }));
                details = details
                    .with_suggestion("Revisa los criterios de búsqueda según el mensaje del banco.".to_string());
            }
            CoreError::ProviderTimeout { .. } | CoreError::ProviderUnavailable { .. } => {
                details = details.with_suggestion(
                    "El banco puede no estar disponible temporalmente; intenta más tarde.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// Email of the authenticated user
    pub user: Option<String>,
    /// Operation being performed
    pub operation: String,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: None,
            user: None,
            operation: operation.into(),
        }
    }

    /// Add request ID
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add the acting user
    pub fn with_user(mut self, user: String) -> Self {
        self.user = Some(user);
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let line = format!(
            "[{}] {} - Operation: {} - User: {:?} - Request: {:?}",
            error.code(),
            error,
            context.operation,
            context.user,
            context.request_id
        );
        match error.severity() {
            ErrorSeverity::Info => log::info!(target: "txportal::error", "{}", line),
            ErrorSeverity::Warning => log::warn!(target: "txportal::error", "{}", line),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                log::error!(target: "txportal::error", "{}", line)
            }
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "txportal::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user
        );
    }
}

// ==================== Tests ====================
