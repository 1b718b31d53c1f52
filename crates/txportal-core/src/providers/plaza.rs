//! Banco Plaza adapter
//!
//! One GET with the account and ISO dates as query parameters. The
//! provider already answers in the portal's account shape, so the body is
//! passed through with sentinels filled in.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{mismatched_criteria, send_json, ProviderAdapter};
use crate::error::CoreResult;
use crate::models::{AccountQueryResult, Movement};
use crate::transform::amount_from_value;
use crate::types::{ProviderId, SearchCriteria};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlazaAccount {
    #[serde(default)]
    numero: Option<String>,
    #[serde(default)]
    fecha_apertura: Option<String>,
    #[serde(default)]
    tipo_cuenta: Option<String>,
    #[serde(default)]
    estatus: Option<String>,
    #[serde(default)]
    moneda: Option<String>,
    #[serde(default)]
    saldo_disponible: Value,
    #[serde(default)]
    movimientos: Option<Vec<PlazaMovement>>,
}

#[derive(Debug, Deserialize)]
struct PlazaMovement {
    #[serde(default)]
    referencia: Option<String>,
    #[serde(default)]
    monto: Value,
    #[serde(default)]
    fecha: Option<String>,
    #[serde(default)]
    hora: Option<String>,
    #[serde(default)]
    concepto: Option<String>,
}

impl From<PlazaMovement> for Movement {
    fn from(raw: PlazaMovement) -> Self {
        Movement {
            reference: raw.referencia.unwrap_or_default(),
            amount: amount_from_value(&raw.monto),
            date: raw.fecha.unwrap_or_default(),
            time: raw.hora.filter(|h| !h.is_empty()).unwrap_or_else(|| "-".to_string()),
            concept: raw.concepto.unwrap_or_default().trim().to_string(),
        }
    }
}

impl From<PlazaAccount> for AccountQueryResult {
    fn from(raw: PlazaAccount) -> Self {
        AccountQueryResult {
            number: raw.numero.unwrap_or_default(),
            account_type: raw.tipo_cuenta.unwrap_or_default(),
            status: raw.estatus.unwrap_or_default(),
            currency: raw.moneda.unwrap_or_default(),
            opened_date: raw.fecha_apertura.unwrap_or_default(),
            available_balance: amount_from_value(&raw.saldo_disponible),
            movements: raw
                .movimientos
                .unwrap_or_default()
                .into_iter()
                .map(Movement::from)
                .collect(),
            warnings: vec![],
        }
    }
}

/// Banco Plaza movements endpoint
pub struct PlazaAdapter {
    client: Client,
    url: String,
}

impl PlazaAdapter {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for PlazaAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Plaza
    }

    async fn search(&self, criteria: &SearchCriteria) -> CoreResult<AccountQueryResult> {
        let range = match criteria {
            SearchCriteria::Plaza(range) => range,
            other => return Err(mismatched_criteria(ProviderId::Plaza, other)),
        };

        log::info!(
            target: "txportal::providers",
            "Banco Plaza: account {} from {} to {}",
            range.account, range.start_date, range.end_date
        );

        let request = self.client.get(&self.url).query(&[
            ("cuentaCliente", range.account.trim()),
            ("fechaInicio", range.start_date.trim()),
            ("fechaFin", range.end_date.trim()),
        ]);
        let raw: PlazaAccount = send_json(ProviderId::Plaza, request).await?;
        let result = AccountQueryResult::from(raw);

        log::info!(target: "txportal::providers", "Banco Plaza: {} movements", result.movements.len());
        Ok(result)
    }
}
