use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::errors::CoreError;
use crate::models::quote::{BatchQuotes, Fundamentals, Quote, QuoteCache, QuoteSource, SymbolError};
use crate::providers::registry::QuoteProviderRegistry;
use crate::providers::symbols::to_exchange_symbol;
use crate::providers::traits::SupplementaryQuoteFetcher;

/// Default freshness window for cached quotes.
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct QuoteServiceConfig {
    /// Quotes younger than this are served without any network call.
    pub ttl: Duration,
}

impl Default for QuoteServiceConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_QUOTE_TTL,
        }
    }
}

/// Serves per-symbol quotes from a short-lived cache, falling back across
/// providers and finally to stale cache data.
///
/// Cache strategy:
/// - **Fresh entry (< TTL)**: returned as-is, no outbound call.
/// - **Missing or expired**: live fetch. The primary price lookup and the
///   supplementary fundamentals scrape run concurrently; the scrape can only
///   degrade P/E and EPS to zero, never fail the fetch.
/// - **Live fetch failed**: the last cached entry for the symbol, whatever
///   its age, re-tagged as [`QuoteSource::Cache`]. Nothing cached → error.
///
/// The cache lock is never held across an outbound call, so concurrent misses
/// for one symbol may fetch twice; the last write wins.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
    fundamentals: Option<Arc<dyn SupplementaryQuoteFetcher>>,
    cache: RwLock<QuoteCache>,
    config: QuoteServiceConfig,
}

impl QuoteService {
    pub fn new(
        registry: QuoteProviderRegistry,
        fundamentals: Option<Arc<dyn SupplementaryQuoteFetcher>>,
        config: QuoteServiceConfig,
    ) -> Self {
        Self {
            registry,
            fundamentals,
            cache: RwLock::new(QuoteCache::new()),
            config,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Names of the primary providers, in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    /// Freshest known quote for `symbol` (an opaque, already-normalised key).
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        if symbol.trim().is_empty() {
            return Err(CoreError::InvalidSymbol(symbol.to_string()));
        }

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get_fresh(symbol, self.config.ttl) {
                tracing::debug!(symbol, "quote cache HIT");
                return Ok(entry.quote.clone());
            }
        }
        tracing::debug!(symbol, "quote cache MISS");

        match self.fetch_live(symbol).await {
            Ok(quote) => {
                self.cache.write().await.insert(quote.clone());
                Ok(quote)
            }
            Err(e) => {
                let stale = self
                    .cache
                    .read()
                    .await
                    .get(symbol)
                    .map(|entry| entry.quote.as_cached());
                match stale {
                    Some(quote) => {
                        tracing::warn!(symbol, error = %e, "live fetch failed, serving stale cache");
                        Ok(quote)
                    }
                    None => {
                        tracing::warn!(symbol, error = %e, "live fetch failed, nothing cached");
                        Err(CoreError::QuoteUnavailable {
                            symbol: symbol.to_string(),
                        })
                    }
                }
            }
        }
    }

    /// Quote every symbol concurrently. Each symbol succeeds or fails on its
    /// own; duplicates are fetched once. Results keep first-seen input order.
    pub async fn get_quotes(&self, symbols: &[String]) -> BatchQuotes {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = symbols.iter().filter(|s| seen.insert(s.as_str())).collect();

        let results = join_all(unique.iter().map(|symbol| self.get_quote(symbol))).await;

        let mut batch = BatchQuotes::default();
        for (symbol, result) in unique.into_iter().zip(results) {
            match result {
                Ok(quote) => batch.quotes.push(quote),
                Err(e) => batch.errors.push(SymbolError {
                    symbol: symbol.clone(),
                    message: e.to_string(),
                }),
            }
        }
        batch
    }

    /// Drop one symbol's entry, or the whole cache when `symbol` is `None`.
    /// Returns the number of entries removed.
    pub async fn clear_cache(&self, symbol: Option<&str>) -> usize {
        let mut cache = self.cache.write().await;
        match symbol {
            Some(symbol) => {
                let removed = usize::from(cache.remove(symbol));
                tracing::info!(symbol, "quote cache cleared");
                removed
            }
            None => {
                let removed = cache.len();
                cache.clear();
                tracing::info!(removed, "all quote cache cleared");
                removed
            }
        }
    }

    /// Number of symbols currently cached (fresh or stale).
    pub async fn cache_size(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn fetch_live(&self, symbol: &str) -> Result<Quote, CoreError> {
        let exchange_symbol = to_exchange_symbol(symbol);

        let (price, fundamentals) = tokio::join!(
            self.fetch_price(&exchange_symbol),
            self.fetch_fundamentals(symbol, &exchange_symbol),
        );
        let price = price?;

        Ok(Quote {
            symbol: symbol.to_string(),
            cmp: price,
            pe_ratio: fundamentals.pe_ratio,
            latest_earnings: fundamentals.latest_earnings,
            source: QuoteSource::Yahoo,
            timestamp: Utc::now(),
        })
    }

    /// Try the primary providers in registration order. A non-finite or
    /// non-positive price counts as missing and moves on to the next provider.
    async fn fetch_price(&self, exchange_symbol: &str) -> Result<f64, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in providers {
            match provider.get_current_price(exchange_symbol).await {
                Ok(price) if price.is_finite() && price > 0.0 => return Ok(price),
                Ok(price) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Invalid price returned for {exchange_symbol}: {price}"),
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), exchange_symbol, error = %e, "price lookup failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    async fn fetch_fundamentals(&self, symbol: &str, exchange_symbol: &str) -> Fundamentals {
        let Some(fetcher) = &self.fundamentals else {
            return Fundamentals::default();
        };
        match fetcher.fetch_fundamentals(symbol, exchange_symbol).await {
            Ok(fundamentals) => fundamentals,
            Err(e) => {
                tracing::warn!(provider = fetcher.name(), symbol, error = %e, "fundamentals scrape failed");
                Fundamentals::default()
            }
        }
    }
}

impl std::fmt::Debug for QuoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteService")
            .field("registry", &self.registry)
            .field("fundamentals", &self.fundamentals.as_ref().map(|f| f.name().to_string()))
            .field("ttl", &self.config.ttl)
            .finish()
    }
}
