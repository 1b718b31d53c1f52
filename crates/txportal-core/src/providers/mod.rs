//! Provider adapters
//!
//! Each external bank has its own request/response contract. Adapters turn
//! that contract into an [`AccountQueryResult`] of canonical movements.
//!
//! - plaza: query-string GET, result passed through
//! - venezuela: cursor-paginated POST loop
//! - mercantil: single POST validating one mobile payment

pub mod mercantil;
pub mod plaza;
pub mod venezuela;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::models::AccountQueryResult;
use crate::types::{ProviderId, SearchCriteria};

pub use mercantil::MercantilAdapter;
pub use plaza::PlazaAdapter;
pub use venezuela::VenezuelaAdapter;

/// Longest provider error body kept in a [`CoreError::ProviderHttp`]
const MAX_ERROR_BODY: usize = 500;

/// Uniform search capability over one external provider
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter talks to
    fn provider(&self) -> ProviderId;

    /// Run one search and return canonical results
    async fn search(&self, criteria: &SearchCriteria) -> CoreResult<AccountQueryResult>;
}

/// Build the HTTP client shared by every adapter
pub fn build_http_client(timeout: Duration) -> CoreResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CoreError::ConfigError {
            message: format!("no se pudo crear el cliente HTTP: {}", e),
        })
}

/// Error for criteria routed to the wrong adapter
pub(crate) fn mismatched_criteria(expected: ProviderId, criteria: &SearchCriteria) -> CoreError {
    CoreError::InternalError {
        message: format!(
            "el adaptador de {} recibió criterios de {}",
            expected.display_name(),
            criteria.provider().display_name()
        ),
    }
}

/// Send a JSON request and decode the JSON answer
///
/// Transport failures, non-success statuses and undecodable bodies map to
/// the provider error taxonomy.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: RequestBuilder,
) -> CoreResult<T> {
    let name = provider.display_name();
    let response = request
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::warn!(target: "txportal::providers", "{} answered {}: {}", name, status, body);
        return Err(CoreError::ProviderHttp {
            provider: name.to_string(),
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;
    serde_json::from_str(&text).map_err(|e| CoreError::InvalidResponse {
        provider: name.to_string(),
        message: e.to_string(),
    })
}

fn transport_error(provider: ProviderId, error: reqwest::Error) -> CoreError {
    let name = provider.display_name().to_string();
    if error.is_timeout() {
        CoreError::ProviderTimeout { provider: name }
    } else {
        CoreError::ProviderUnavailable {
            provider: name,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, serde::Deserialize)]
    struct Ping {
        ok: bool,
    }

    #[tokio::test]
    async fn test_send_json_decodes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_secs(5)).unwrap();
        let ping: Ping = send_json(ProviderId::Plaza, client.get(server.uri())).await.unwrap();
        assert!(ping.ok);
    }

    #[tokio::test]
    async fn test_send_json_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_secs(5)).unwrap();
        let err = send_json::<Ping>(ProviderId::Venezuela, client.get(server.uri()))
            .await
            .unwrap_err();
        match err {
            CoreError::ProviderHttp { provider, status, body } => {
                assert_eq!(provider, "Banco de Venezuela");
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_json_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_millis(50)).unwrap();
        let err = send_json::<Ping>(ProviderId::Mercantil, client.get(server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProviderTimeout { .. }));
    }

    #[tokio::test]
    async fn test_send_json_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_secs(5)).unwrap();
        let err = send_json::<Ping>(ProviderId::Plaza, client.get(server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidResponse { .. }));
    }
}
