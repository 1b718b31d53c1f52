//! Provider identifiers and search criteria

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// External provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Banco Plaza (query-string GET)
    Plaza,
    /// Banco de Venezuela (cursor-paginated POST)
    Venezuela,
    /// Mercantil mobile payments (single POST)
    Mercantil,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::Plaza, ProviderId::Venezuela, ProviderId::Mercantil];

    /// Human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Plaza => "Banco Plaza",
            ProviderId::Venezuela => "Banco de Venezuela",
            ProviderId::Mercantil => "Banco Mercantil",
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plaza" => Ok(ProviderId::Plaza),
            "venezuela" => Ok(ProviderId::Venezuela),
            "mercantil" => Ok(ProviderId::Mercantil),
            _ => Err(format!("Invalid provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderId::Plaza => write!(f, "plaza"),
            ProviderId::Venezuela => write!(f, "venezuela"),
            ProviderId::Mercantil => write!(f, "mercantil"),
        }
    }
}

/// Account and ISO date range, used by Plaza and Venezuela
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRange {
    pub account: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
}

impl AccountRange {
    pub fn new(account: &str, start_date: &str, end_date: &str) -> Self {
        Self {
            account: account.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if is_blank(&self.account) || is_blank(&self.start_date) || is_blank(&self.end_date) {
            return Err(CoreError::validation(
                "Campos incompletos: selecciona una cuenta y el rango de fechas",
            ));
        }
        let start = parse_iso(&self.start_date)?;
        let end = parse_iso(&self.end_date)?;
        if start > end {
            return Err(CoreError::validation(
                "La fecha de inicio no puede ser mayor que la fecha final",
            ));
        }
        Ok(())
    }
}

/// Single mobile-payment lookup, used by Mercantil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLookup {
    pub reference: String,
    pub payer_phone: String,
    /// Amount as typed by the user (`1939,68` or `1939.68`)
    pub amount: String,
    /// `YYYY-MM-DD`
    pub payment_date: String,
}

impl PaymentLookup {
    fn validate(&self) -> CoreResult<()> {
        if is_blank(&self.reference)
            || is_blank(&self.payer_phone)
            || is_blank(&self.amount)
            || is_blank(&self.payment_date)
        {
            return Err(CoreError::validation(
                "Campos incompletos: referencia, fecha, teléfono pagador e importe son obligatorios",
            ));
        }
        parse_iso(&self.payment_date)?;
        Ok(())
    }
}

/// Criteria for one search, discriminated by provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum SearchCriteria {
    Plaza(AccountRange),
    Venezuela(AccountRange),
    Mercantil(PaymentLookup),
}

impl SearchCriteria {
    /// Provider this search targets
    pub fn provider(&self) -> ProviderId {
        match self {
            SearchCriteria::Plaza(_) => ProviderId::Plaza,
            SearchCriteria::Venezuela(_) => ProviderId::Venezuela,
            SearchCriteria::Mercantil(_) => ProviderId::Mercantil,
        }
    }

    /// Reject incomplete or inconsistent criteria before any network call
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            SearchCriteria::Plaza(range) | SearchCriteria::Venezuela(range) => range.validate(),
            SearchCriteria::Mercantil(lookup) => lookup.validate(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn parse_iso(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::validation(format!("Fecha inválida: {}", value)))
}
