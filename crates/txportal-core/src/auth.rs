//! Authentication gate
//!
//! Two ways in: an identity pushed by an external identity provider, which
//! must belong to the allowed email domain, or a bearer token checked
//! against the validation endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{CoreError, CoreResult};
use crate::models::Identity;

/// Source of the signed-in identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;

    /// Receiver notified on every sign-in and sign-out
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    async fn sign_out(&self) -> CoreResult<()>;
}

/// In-process identity provider backed by a watch channel
pub struct LocalIdentityProvider {
    tx: watch::Sender<Option<Identity>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn sign_in(&self, identity: Identity) {
        self.tx.send_replace(Some(identity));
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }

    async fn sign_out(&self) -> CoreResult<()> {
        self.tx.send_replace(None);
        Ok(())
    }
}

/// Checks a bearer token and returns whose it is
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> CoreResult<Identity>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// Validates tokens by POSTing them to a remote endpoint
pub struct HttpTokenValidator {
    client: Client,
    url: String,
}

impl HttpTokenValidator {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> CoreResult<Identity> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CoreError::AuthUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            log::info!(target: "txportal::auth", "Token rejected by validator ({})", status);
            return Err(CoreError::AuthRejected {
                reason: format!("token rechazado ({})", status.as_u16()),
            });
        }

        let info: TokenInfo = response.json().await.map_err(|e| CoreError::AuthUnavailable {
            message: format!("respuesta de validación inválida: {}", e),
        })?;
        Ok(Identity {
            email: info.email,
            display_name: info.name,
        })
    }
}

/// Admission rules for both authentication paths
pub struct AuthGate {
    allowed_domain: String,
    validator: Option<Arc<dyn TokenValidator>>,
}

impl AuthGate {
    pub fn new(allowed_domain: impl Into<String>) -> Self {
        Self {
            allowed_domain: allowed_domain.into().trim().to_lowercase(),
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn TokenValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    pub fn is_allowed(&self, identity: &Identity) -> bool {
        identity.email_domain().as_deref() == Some(self.allowed_domain.as_str())
    }

    /// Admit `identity` from `provider`, signing it out on a foreign domain
    pub async fn admit(
        &self,
        provider: &dyn IdentityProvider,
        identity: Option<Identity>,
    ) -> CoreResult<Option<Identity>> {
        let identity = match identity {
            Some(identity) => identity,
            None => return Ok(None),
        };

        if self.is_allowed(&identity) {
            log::info!(target: "txportal::auth", "Admitted {}", identity.email);
            return Ok(Some(identity));
        }

        log::warn!(target: "txportal::auth", "Rejected {}: domain not allowed", identity.email);
        if let Err(e) = provider.sign_out().await {
            log::error!(target: "txportal::auth", "Sign-out after rejection failed: {}", e);
        }
        Err(CoreError::AuthRejected {
            reason: format!("solo se permiten cuentas @{}", self.allowed_domain),
        })
    }

    /// Follow identity changes from `provider`
    pub fn follow<'a>(&'a self, provider: &'a dyn IdentityProvider) -> IdentityFollower<'a> {
        IdentityFollower {
            gate: self,
            provider,
            rx: provider.subscribe(),
        }
    }

    /// Resolve a bearer token to an identity
    pub async fn validate_token(&self, token: &str) -> CoreResult<Identity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CoreError::AuthRejected {
                reason: "falta el token de acceso".to_string(),
            });
        }
        match &self.validator {
            Some(validator) => validator.validate(token).await,
            None => Err(CoreError::AuthUnavailable {
                message: "la validación de tokens no está configurada".to_string(),
            }),
        }
    }
}

/// Stream of admitted identities, one per provider change
pub struct IdentityFollower<'a> {
    gate: &'a AuthGate,
    provider: &'a dyn IdentityProvider,
    rx: watch::Receiver<Option<Identity>>,
}

impl IdentityFollower<'_> {
    /// Wait for the next change; `None` once the provider is gone
    pub async fn changed(&mut self) -> Option<CoreResult<Option<Identity>>> {
        self.rx.changed().await.ok()?;
        let identity = self.rx.borrow_and_update().clone();
        Some(self.gate.admit(self.provider, identity).await)
    }
}
