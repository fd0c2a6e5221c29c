use std::sync::Arc;

use super::traits::QuoteProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Ordered list of primary market-price providers.
///
/// The quote service tries them in registration order and falls back to the
/// next one when a provider fails. New providers can be added without
/// touching the cache logic.
#[derive(Clone, Default)]
pub struct QuoteProviderRegistry {
    providers: Vec<Arc<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the default providers.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // Yahoo Finance: NSE/BSE equities, no API key needed
        match YahooFinanceProvider::new() {
            Ok(yahoo) => registry.register(Arc::new(yahoo)),
            Err(e) => tracing::warn!(error = %e, "Yahoo Finance provider unavailable"),
        }

        registry
    }

    /// Register a new quote provider at the lowest priority.
    pub fn register(&mut self, provider: Arc<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// All providers, ordered by registration priority.
    pub fn providers(&self) -> &[Arc<dyn QuoteProvider>] {
        &self.providers
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for QuoteProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteProviderRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}
