//! Core search pipeline: provider adapters, normalization, paging and views

pub mod auth;
pub mod error;
pub mod models;
pub mod paging;
pub mod portal;
pub mod providers;
pub mod session;
pub mod transform;
pub mod types;
pub mod view;

pub use auth::{AuthGate, HttpTokenValidator, IdentityProvider, LocalIdentityProvider, TokenValidator};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity};
pub use models::{AccountQueryResult, Identity, Movement, SearchWarning};
pub use portal::Portal;
pub use providers::ProviderAdapter;
pub use session::{SearchSession, SearchTicket};
pub use types::{AccountRange, PaymentLookup, ProviderId, SearchCriteria};
pub use view::ResultPage;
