//! Canonical records shared by every provider

use serde::{Deserialize, Serialize};

/// One bank movement, normalized across providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Provider-assigned transaction reference
    pub reference: String,
    /// Decimal amount, always finite
    pub amount: f64,
    /// Display date (`DD/MM/YYYY` when the provider supplies it)
    pub date: String,
    /// `HH:MM`, or `-` when the provider has no time
    pub time: String,
    /// Trimmed description
    pub concept: String,
}

impl Movement {
    /// Decimal string form of the amount (`1234.56`, `520`, `0`)
    pub fn amount_text(&self) -> String {
        self.amount.to_string()
    }

    /// Case-insensitive match against reference, amount and concept
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.reference.to_lowercase().contains(needle_lower)
            || self.amount_text().contains(needle_lower)
            || self.concept.to_lowercase().contains(needle_lower)
    }
}

/// Non-fatal conditions attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SearchWarning {
    /// Paging stopped at the request cap; the result may be incomplete
    PaginationSafetyLimitReached { pages: usize },
}

/// Account metadata plus its movements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountQueryResult {
    pub number: String,
    pub account_type: String,
    pub status: String,
    pub currency: String,
    pub opened_date: String,
    pub available_balance: f64,
    pub movements: Vec<Movement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SearchWarning>,
}

impl AccountQueryResult {
    /// Metadata sentinels for providers that do not report account details
    pub fn synthetic(number: &str, account_type: &str, movements: Vec<Movement>) -> Self {
        Self {
            number: number.to_string(),
            account_type: account_type.to_string(),
            status: "A".to_string(),
            currency: "VES".to_string(),
            opened_date: String::new(),
            available_balance: 0.0,
            movements,
            warnings: vec![],
        }
    }

    /// True when paging stopped early
    pub fn is_truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, SearchWarning::PaginationSafetyLimitReached { .. }))
    }
}

/// An authenticated person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            display_name: None,
        }
    }

    /// Part after the `@`, lowercased; `None` unless there is exactly one `@`
    pub fn email_domain(&self) -> Option<String> {
        let (_, domain) = self.email.split_once('@')?;
        if domain.contains('@') {
            return None;
        }
        Some(domain.trim().to_lowercase()).filter(|domain| !domain.is_empty())
    }
}
