//! Banco de Venezuela adapter
//!
//! The endpoint returns movements one page at a time; the `nroMov` of the
//! last movement on a page is the cursor for the next one. Paging runs
//! through [`crate::paging::drive`], then every raw movement is normalized.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{mismatched_criteria, send_json, ProviderAdapter};
use crate::error::{CoreError, CoreResult};
use crate::models::{AccountQueryResult, Movement, SearchWarning};
use crate::paging::{drive, PagingSource, DEFAULT_MAX_PAGES};
use crate::transform::{format_hhmm, iso_to_display_date, null_as_default, parse_locale_amount};
use crate::types::{ProviderId, SearchCriteria};

/// Tag reported as `accountType` for this provider
pub const ACCOUNT_TYPE: &str = "BDV";

const FALLBACK_ERROR: &str = "Error al consultar movimientos";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageRequest<'a> {
    cuenta: &'a str,
    fecha_ini: &'a str,
    fecha_fin: &'a str,
    tipo_moneda: &'a str,
    nro_movimiento: &'a str,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    success: bool,
    /// `{code, message, data}`; the body is only decoded on success
    #[serde(default)]
    data: Option<Value>,
}

impl PageResponse {
    fn message(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    fn into_body(self) -> CoreResult<PageBody> {
        let body = match self.data.and_then(|mut d| d.get_mut("data").map(Value::take)) {
            Some(Value::Null) | None => return Ok(PageBody::default()),
            Some(body) => body,
        };
        serde_json::from_value(body).map_err(|e| CoreError::InvalidResponse {
            provider: ProviderId::Venezuela.display_name().to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageBody {
    #[serde(default)]
    total_of_movements: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    movs: Vec<RawMovement>,
}

/// One movement as the provider reports it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMovement {
    #[serde(default, deserialize_with = "null_as_default")]
    pub referencia: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fecha: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hora: String,
    #[serde(default)]
    pub mov: Option<String>,
    #[serde(default)]
    pub saldo: Option<String>,
    /// Comma-decimal amount, e.g. `1.234,56`
    #[serde(default, deserialize_with = "null_as_default")]
    pub importe: String,
    /// Paging cursor
    #[serde(default)]
    pub nro_mov: Option<String>,
    #[serde(default)]
    pub observacion: Option<String>,
}

impl From<RawMovement> for Movement {
    fn from(raw: RawMovement) -> Self {
        Movement {
            reference: raw.referencia,
            amount: parse_locale_amount(&raw.importe),
            date: raw.fecha,
            time: format_hhmm(&raw.hora),
            concept: raw.observacion.unwrap_or_default().trim().to_string(),
        }
    }
}

/// Page fetcher for one account and date range
struct MovementPages<'a> {
    client: &'a Client,
    url: &'a str,
    account: &'a str,
    start: String,
    end: String,
    currency: &'a str,
}

#[async_trait]
impl PagingSource for MovementPages<'_> {
    type Item = RawMovement;

    async fn fetch_page(&self, cursor: &str) -> CoreResult<Vec<RawMovement>> {
        let body = PageRequest {
            cuenta: self.account,
            fecha_ini: &self.start,
            fecha_fin: &self.end,
            tipo_moneda: self.currency,
            nro_movimiento: cursor,
        };
        let request = self.client.post(self.url).json(&body);
        let page: PageResponse = send_json(ProviderId::Venezuela, request).await?;

        if !page.success {
            return Err(CoreError::ProviderLogic {
                provider: ProviderId::Venezuela.display_name().to_string(),
                message: page.message().unwrap_or_else(|| FALLBACK_ERROR.to_string()),
            });
        }

        let body = page.into_body()?;
        log::debug!(
            target: "txportal::providers",
            "Banco de Venezuela: page with {} movements (provider total {:?})",
            body.movs.len(),
            body.total_of_movements
        );
        Ok(body.movs)
    }

    fn cursor_of(item: &RawMovement) -> Option<&str> {
        item.nro_mov.as_deref()
    }
}

/// Banco de Venezuela movements endpoint
pub struct VenezuelaAdapter {
    client: Client,
    url: String,
    currency: String,
    max_pages: usize,
}

impl VenezuelaAdapter {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            currency: "VES".to_string(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Override the currency sent as `tipoMoneda`
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Override the page request cap
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

#[async_trait]
impl ProviderAdapter for VenezuelaAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Venezuela
    }

    async fn search(&self, criteria: &SearchCriteria) -> CoreResult<AccountQueryResult> {
        let range = match criteria {
            SearchCriteria::Venezuela(range) => range,
            other => return Err(mismatched_criteria(ProviderId::Venezuela, other)),
        };

        let pages = MovementPages {
            client: &self.client,
            url: &self.url,
            account: range.account.trim(),
            start: iso_to_display_date(&range.start_date)?,
            end: iso_to_display_date(&range.end_date)?,
            currency: &self.currency,
        };

        log::info!(
            target: "txportal::providers",
            "Banco de Venezuela: account {} from {} to {}",
            range.account, pages.start, pages.end
        );

        let outcome = drive(&pages, self.max_pages).await?;
        let movements: Vec<Movement> = outcome.items.into_iter().map(Movement::from).collect();

        log::info!(
            target: "txportal::providers",
            "Banco de Venezuela: {} movements in {} pages",
            movements.len(),
            outcome.pages
        );

        let mut result = AccountQueryResult::synthetic(range.account.trim(), ACCOUNT_TYPE, movements);
        if outcome.truncated {
            result.warnings.push(SearchWarning::PaginationSafetyLimitReached {
                pages: outcome.pages,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::build_http_client;
    use crate::types::AccountRange;
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACCOUNT: &str = "01020762210000117663";

    fn adapter(server: &MockServer) -> VenezuelaAdapter {
        VenezuelaAdapter::new(build_http_client(Duration::from_secs(5)).unwrap(), server.uri())
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria::Venezuela(AccountRange::new(ACCOUNT, "2024-01-01", "2024-01-31"))
    }

    fn raw(reference: &str, importe: &str, nro_mov: Option<&str>) -> Value {
        json!({
            "referencia": reference,
            "descripcion": null,
            "fecha": "15/01/2024",
            "hora": "2304",
            "mov": "C",
            "saldo": "10.000,00",
            "importe": importe,
            "nroMov": nro_mov,
            "observacion": "  PAGO MOVIL  "
        })
    }

    fn page(movs: Vec<Value>) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "code": "00",
                "message": "OK",
                "data": { "totalOfMovements": movs.len(), "movs": movs }
            }
        }))
    }

    async fn mount_page(server: &MockServer, cursor: &str, movs: Vec<Value>) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "nroMovimiento": cursor })))
            .respond_with(page(movs))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_request_body_uses_display_dates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "cuenta": ACCOUNT,
                "fechaIni": "01/01/2024",
                "fechaFin": "31/01/2024",
                "tipoMoneda": "VES",
                "nroMovimiento": ""
            })))
            .respond_with(page(vec![]))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert!(result.movements.is_empty());
    }

    #[tokio::test]
    async fn test_two_movements_then_empty_page() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "",
            vec![raw("111", "520,00", Some("99")), raw("112", "1.234,56", Some("100"))],
        )
        .await;
        mount_page(&server, "100", vec![]).await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert_eq!(result.movements.len(), 2);
        assert_eq!(result.account_type, ACCOUNT_TYPE);
        assert_eq!(result.number, ACCOUNT);
        assert_eq!(result.available_balance, 0.0);
        assert!(result.warnings.is_empty());

        let first = &result.movements[0];
        assert_eq!(first.reference, "111");
        assert_eq!(first.amount, 520.0);
        assert_eq!(first.time, "23:04");
        assert_eq!(first.concept, "PAGO MOVIL");
        assert_eq!(result.movements[1].amount, 1234.56);
    }

    #[tokio::test]
    async fn test_one_request_per_page_in_arrival_order() {
        let server = MockServer::start().await;
        mount_page(&server, "", vec![raw("a1", "1,00", Some("10")), raw("a2", "2,00", Some("20"))]).await;
        mount_page(&server, "20", vec![raw("b1", "3,00", Some("30"))]).await;
        mount_page(&server, "30", vec![raw("c1", "4,00", Some("40")), raw("c2", "5,00", None)]).await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        let refs: Vec<&str> = result.movements.iter().map(|m| m.reference.as_str()).collect();
        assert_eq!(refs, vec!["a1", "a2", "b1", "c1", "c2"]);
    }

    #[tokio::test]
    async fn test_repeated_cursor_stops() {
        let server = MockServer::start().await;
        mount_page(&server, "", vec![raw("a1", "1,00", Some("10"))]).await;
        mount_page(&server, "10", vec![raw("b1", "2,00", Some("10"))]).await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert_eq!(result.movements.len(), 2);
    }

    #[tokio::test]
    async fn test_page_cap_keeps_partial_result() {
        let server = MockServer::start().await;
        mount_page(&server, "", vec![raw("a1", "1,00", Some("10"))]).await;
        mount_page(&server, "10", vec![raw("b1", "2,00", Some("20"))]).await;

        let result = adapter(&server)
            .with_max_pages(2)
            .search(&criteria())
            .await
            .unwrap();
        assert_eq!(result.movements.len(), 2);
        assert!(result.is_truncated());
        assert_eq!(
            result.warnings,
            vec![SearchWarning::PaginationSafetyLimitReached { pages: 2 }]
        );
    }

    #[tokio::test]
    async fn test_success_false_is_logic_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "data": { "code": "99", "message": "Cuenta no afiliada" }
            })))
            .mount(&server)
            .await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        match err {
            CoreError::ProviderLogic { message, .. } => assert_eq!(message, "Cuenta no afiliada"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_false_without_message_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&server)
            .await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        assert_eq!(err.to_string(), "Banco de Venezuela: Error al consultar movimientos");
    }

    #[tokio::test]
    async fn test_success_false_with_null_movs_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "data": { "message": "Cuenta no afiliada", "data": { "movs": null } }
            })))
            .mount(&server)
            .await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        match err {
            CoreError::ProviderLogic { message, .. } => assert_eq!(message, "Cuenta no afiliada"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_movs_ends_paging() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "message": "OK", "data": { "movs": null } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter(&server).search(&criteria()).await.unwrap();
        assert!(result.movements.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_page_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "data": { "movs": "nope" } }
            })))
            .mount(&server)
            .await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_http_error_on_later_page_discards_everything() {
        let server = MockServer::start().await;
        mount_page(&server, "", vec![raw("a1", "1,00", Some("10"))]).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "nroMovimiento": "10" })))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = adapter(&server).search(&criteria()).await.unwrap_err();
        assert!(matches!(err, CoreError::ProviderHttp { status: 503, .. }));
    }

    #[test]
    fn test_raw_movement_mapping() {
        let raw = RawMovement {
            referencia: "778".to_string(),
            fecha: "01/02/2024".to_string(),
            hora: "930".to_string(),
            importe: "0,00".to_string(),
            observacion: None,
            ..Default::default()
        };
        let movement = Movement::from(raw);
        assert_eq!(movement.amount, 0.0);
        assert_eq!(movement.time, "930");
        assert_eq!(movement.concept, "");
        assert_eq!(movement.date, "01/02/2024");
    }

    #[test]
    fn test_raw_movement_tolerates_nulls() {
        let raw: RawMovement = serde_json::from_value(json!({
            "referencia": "5",
            "hora": null,
            "importe": null,
            "nroMov": "7"
        }))
        .unwrap();
        assert_eq!(raw.hora, "");
        let movement = Movement::from(raw);
        assert_eq!(movement.amount, 0.0);
        assert_eq!(movement.time, "");
    }
}
