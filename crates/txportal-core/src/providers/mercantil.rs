//! Mercantil mobile-payment adapter
//!
//! Validates a single payment: one POST with the payment details, at most
//! one movement back. An approved answer without transactions means no
//! matching payment was found, which is not an error.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{mismatched_criteria, send_json, ProviderAdapter};
use crate::error::{CoreError, CoreResult};
use crate::models::{AccountQueryResult, Movement};
use crate::transform::{amount_from_value, iso_to_display_date, null_as_default, text_from_value};
use crate::types::{PaymentLookup, ProviderId, SearchCriteria};

pub const STATUS_APPROVED: &str = "APROBADO";
pub const STATUS_ERROR: &str = "ERROR";

const ACCOUNT_NUMBER: &str = "Mercantil PM";
const ACCOUNT_TYPE: &str = "Pago Móvil";
const DEFAULT_INVOICE: &str = "Pago Móvil Mercantil";
const FALLBACK_ERROR: &str = "Error al consultar movimientos";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest<'a> {
    tipo_moneda: &'a str,
    fecha_pago: &'a str,
    referencia: &'a str,
    telefono_pagador: &'a str,
    telefono_destino: &'a str,
    importe: &'a str,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    #[serde(rename = "Estado", default)]
    estado: Option<String>,
    #[serde(rename = "Mensaje", default)]
    mensaje: Option<String>,
    /// Only decoded once `Estado` says the payment was approved
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PaymentData {
    #[serde(default, deserialize_with = "null_as_default")]
    transaction_list: Vec<PaymentTransaction>,
}

impl PaymentData {
    /// First transaction of an approved answer; odd shapes count as none
    fn first_transaction(data: Option<Value>) -> Option<PaymentTransaction> {
        let data = data.filter(Value::is_object)?;
        match serde_json::from_value::<PaymentData>(data) {
            Ok(data) => data.transaction_list.into_iter().next(),
            Err(e) => {
                log::warn!(target: "txportal::providers", "Mercantil: unreadable transaction data: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentTransaction {
    #[serde(default)]
    payment_reference: Value,
    #[serde(default)]
    amount: Value,
    #[serde(default)]
    invoice_number: Value,
    #[serde(default)]
    authorization_code: Value,
}

impl PaymentTransaction {
    fn into_movement(self, lookup: &PaymentLookup, date: &str) -> Movement {
        let invoice = text_from_value(&self.invoice_number).unwrap_or_else(|| DEFAULT_INVOICE.to_string());
        let auth = text_from_value(&self.authorization_code).unwrap_or_else(|| "N/A".to_string());
        Movement {
            reference: text_from_value(&self.payment_reference)
                .unwrap_or_else(|| lookup.reference.trim().to_string()),
            amount: amount_from_value(&self.amount),
            date: date.to_string(),
            time: "-".to_string(),
            concept: format!("{} - Auth: {}", invoice, auth).trim().to_string(),
        }
    }
}

/// Mercantil payment lookup endpoint
pub struct MercantilAdapter {
    client: Client,
    url: String,
    destination_phone: String,
    currency: String,
}

impl MercantilAdapter {
    pub fn new(client: Client, url: impl Into<String>, destination_phone: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            destination_phone: destination_phone.into(),
            currency: "ves".to_string(),
        }
    }

    /// Override the currency sent as `tipoMoneda`
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

#[async_trait]
impl ProviderAdapter for MercantilAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Mercantil
    }

    async fn search(&self, criteria: &SearchCriteria) -> CoreResult<AccountQueryResult> {
        let lookup = match criteria {
            SearchCriteria::Mercantil(lookup) => lookup,
            other => return Err(mismatched_criteria(ProviderId::Mercantil, other)),
        };

        let payment_date = iso_to_display_date(&lookup.payment_date)?;
        let body = PaymentRequest {
            tipo_moneda: &self.currency,
            fecha_pago: &payment_date,
            referencia: lookup.reference.trim(),
            telefono_pagador: lookup.payer_phone.trim(),
            telefono_destino: &self.destination_phone,
            importe: lookup.amount.trim(),
        };

        log::info!(
            target: "txportal::providers",
            "Mercantil: reference {} on {}",
            lookup.reference, payment_date
        );

        let request = self.client.post(&self.url).json(&body);
        let response: PaymentResponse = send_json(ProviderId::Mercantil, request).await?;
        let status = response.estado.unwrap_or_default();

        if status == STATUS_ERROR {
            return Err(CoreError::ProviderLogic {
                provider: ProviderId::Mercantil.display_name().to_string(),
                message: response
                    .mensaje
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| FALLBACK_ERROR.to_string()),
            });
        }

        let mut movements = Vec::new();
        if status == STATUS_APPROVED {
            if let Some(transaction) = PaymentData::first_transaction(response.data) {
                movements.push(transaction.into_movement(lookup, &payment_date));
            }
        }

        if movements.is_empty() {
            log::info!(target: "txportal::providers", "Mercantil: no matching payment (status {:?})", status);
        }

        Ok(AccountQueryResult::synthetic(ACCOUNT_NUMBER, ACCOUNT_TYPE, movements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::build_http_client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> MercantilAdapter {
        MercantilAdapter::new(
            build_http_client(Duration::from_secs(5)).unwrap(),
            server.uri(),
            "04141150078",
        )
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria::Mercantil(PaymentLookup {
            reference: "489842375".to_string(),
            payer_phone: "04120794256".to_string(),
            amount: "1939,68".to_string(),
            payment_date: "2024-03-05".to_string(),
        })
    }

    async fn respond(server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "tipoMoneda": "ves",
                "fechaPago": "05/03/2024",
                "referencia": "489842375",
                "telefonoPagador": "04120794256",
                "telefonoDestino": "04141150078",
                "importe": "1939,68"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Estado": "APROBADO"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert!(result.movements.is_empty());
    }

    #[tokio::test]
    async fn test_approved_yields_one_movement() {
        let server = MockServer::start().await;
        respond(
            &server,
            json!({
                "Estado": "APROBADO",
                "data": {"transaction_list": [
                    {"payment_reference": 1234489842375u64, "amount": "1939.68", "invoice_number": "FAC-77", "authorization_code": "A1B2"},
                    {"payment_reference": "ignored", "amount": "1"}
                ]}
            }),
        )
        .await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert_eq!(result.movements.len(), 1);
        let movement = &result.movements[0];
        assert_eq!(movement.reference, "1234489842375");
        assert_eq!(movement.amount, 1939.68);
        assert_eq!(movement.date, "05/03/2024");
        assert_eq!(movement.time, "-");
        assert_eq!(movement.concept, "FAC-77 - Auth: A1B2");
        assert_eq!(result.number, "Mercantil PM");
        assert_eq!(result.account_type, "Pago Móvil");
        assert_eq!(result.currency, "VES");
    }

    #[tokio::test]
    async fn test_missing_transaction_fields_use_defaults() {
        let server = MockServer::start().await;
        respond(
            &server,
            json!({
                "Estado": "APROBADO",
                "data": {"transaction_list": [{"amount": "abc"}]}
            }),
        )
        .await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        let movement = &result.movements[0];
        assert_eq!(movement.reference, "489842375");
        assert_eq!(movement.amount, 0.0);
        assert_eq!(movement.concept, "Pago Móvil Mercantil - Auth: N/A");
    }

    #[tokio::test]
    async fn test_approved_without_transactions_is_empty() {
        let server = MockServer::start().await;
        respond(&server, json!({"Estado": "APROBADO", "data": {"transaction_list": []}})).await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert!(result.movements.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_logic_error() {
        let server = MockServer::start().await;
        respond(&server, json!({"Estado": "ERROR", "Mensaje": "Pago no encontrado"})).await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        match err {
            CoreError::ProviderLogic { provider, message } => {
                assert_eq!(provider, "Banco Mercantil");
                assert_eq!(message, "Pago no encontrado");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_without_message() {
        let server = MockServer::start().await;
        respond(&server, json!({"Estado": "ERROR"})).await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        assert!(err.to_string().ends_with(FALLBACK_ERROR));
    }

    #[tokio::test]
    async fn test_error_status_with_null_transaction_list() {
        let server = MockServer::start().await;
        respond(
            &server,
            json!({"Estado": "ERROR", "Mensaje": "Pago no encontrado", "data": {"transaction_list": null}}),
        )
        .await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        match err {
            CoreError::ProviderLogic { message, .. } => assert_eq!(message, "Pago no encontrado"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_with_string_data() {
        let server = MockServer::start().await;
        respond(&server, json!({"Estado": "ERROR", "Mensaje": "Referencia invalida", "data": ""})).await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        match err {
            CoreError::ProviderLogic { message, .. } => assert_eq!(message, "Referencia invalida"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_approved_with_null_transaction_list_is_empty() {
        let server = MockServer::start().await;
        respond(&server, json!({"Estado": "APROBADO", "data": {"transaction_list": null}})).await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert!(result.movements.is_empty());
        assert_eq!(result.number, "Mercantil PM");
    }

    #[tokio::test]
    async fn test_approved_with_odd_data_is_empty() {
        let server = MockServer::start().await;
        respond(&server, json!({"Estado": "APROBADO", "data": "sin datos"})).await;
        assert!(adapter(&server).search(&criteria()).await.unwrap().movements.is_empty());

        let server = MockServer::start().await;
        respond(&server, json!({"Estado": "APROBADO", "data": {"transaction_list": "x"}})).await;
        assert!(adapter(&server).search(&criteria()).await.unwrap().movements.is_empty());
    }

    #[tokio::test]
    async fn test_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        assert!(matches!(err, CoreError::ProviderHttp { status: 401, .. }));
    }
}
