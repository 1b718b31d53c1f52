//! Provider catalog endpoint

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use txportal_config::{AccountEntry, Config};
use txportal_core::ProviderId;

use crate::AppState;

/// Selectable account, shown by its masked label
#[derive(Debug, Clone, Serialize)]
pub struct AccountOption {
    pub number: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: &'static str,
    pub accounts: Vec<AccountOption>,
}

/// `*<last 4 digits> - <description>`
pub fn masked_label(number: &str, description: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("*{} - {}", tail, description)
}

fn catalog(config: &Config, provider: ProviderId) -> &[AccountEntry] {
    match provider {
        ProviderId::Plaza => &config.providers.plaza.accounts,
        ProviderId::Venezuela => &config.providers.venezuela.accounts,
        ProviderId::Mercantil => &config.providers.mercantil.accounts,
    }
}

pub async fn api_providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let providers = state
        .portal
        .providers()
        .into_iter()
        .map(|id| ProviderInfo {
            id,
            name: id.display_name(),
            accounts: catalog(&state.config, id)
                .iter()
                .map(|entry| AccountOption {
                    number: entry.number.clone(),
                    label: masked_label(&entry.number, &entry.description),
                })
                .collect(),
        })
        .collect();
    Json(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_label() {
        assert_eq!(
            masked_label("01380033220330017446", "Cuenta Corriente"),
            "*7446 - Cuenta Corriente"
        );
        assert_eq!(masked_label("12", "Corta"), "*12 - Corta");
    }
}
