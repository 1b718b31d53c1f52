//! Adapter registry and search dispatch

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use txportal_config::Config;

use crate::error::{CoreError, CoreResult};
use crate::models::AccountQueryResult;
use crate::providers::{build_http_client, MercantilAdapter, PlazaAdapter, ProviderAdapter, VenezuelaAdapter};
use crate::types::{ProviderId, SearchCriteria};
use crate::view::DEFAULT_PAGE_SIZE;

/// Routes each search to the adapter of its provider
pub struct Portal {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
    page_size: usize,
}

impl Portal {
    pub fn new(page_size: usize) -> Self {
        Self {
            adapters: HashMap::new(),
            page_size,
        }
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    /// Register the three adapters over one shared HTTP client
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let client = build_http_client(Duration::from_secs(config.http.timeout_secs))?;
        let providers = &config.providers;

        let plaza = PlazaAdapter::new(client.clone(), providers.plaza.url.clone());
        let venezuela = VenezuelaAdapter::new(client.clone(), providers.venezuela.url.clone())
            .with_currency(providers.venezuela.currency.clone())
            .with_max_pages(providers.venezuela.max_pages);
        let mercantil = MercantilAdapter::new(
            client,
            providers.mercantil.url.clone(),
            providers.mercantil.destination_phone.clone(),
        )
        .with_currency(providers.mercantil.currency.clone());

        Ok(Self::new(config.pagination.records_per_page)
            .with_adapter(Arc::new(plaza))
            .with_adapter(Arc::new(venezuela))
            .with_adapter(Arc::new(mercantil)))
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.adapters.contains_key(id))
            .collect()
    }

    /// Validate `criteria` and run exactly one provider search
    pub async fn search(&self, criteria: &SearchCriteria) -> CoreResult<AccountQueryResult> {
        criteria.validate()?;

        let provider = criteria.provider();
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or_else(|| CoreError::validation(format!("Proveedor no disponible: {}", provider)))?;

        log::info!(target: "txportal::portal", "Searching {}", provider.display_name());
        let result = adapter.search(criteria).await;
        match &result {
            Ok(r) => log::info!(
                target: "txportal::portal",
                "{} returned {} movements",
                provider.display_name(),
                r.movements.len()
            ),
            Err(e) => log::warn!(target: "txportal::portal", "{} search failed: {}", provider.display_name(), e),
        }
        result
    }
}

impl Default for Portal {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
