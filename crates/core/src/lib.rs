pub mod errors;
pub mod import;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use errors::CoreError;
use models::{
    holding::HoldingsDocument,
    portfolio::LivePortfolio,
    quote::{BatchQuotes, CacheStats, Quote},
};
use providers::{
    google_finance::GoogleFinanceScraper, registry::QuoteProviderRegistry,
    traits::SupplementaryQuoteFetcher,
};
use services::{
    holdings_service::{HoldingsService, HoldingsServiceConfig},
    portfolio_service::PortfolioService,
    quote_service::{QuoteService, QuoteServiceConfig},
};

/// Configuration for [`PortfolioDashboard::new`].
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub quotes: QuoteServiceConfig,
    pub holdings: HoldingsServiceConfig,
    /// Timeout applied to outbound scrape requests.
    pub provider_timeout: Duration,
    /// Whether to scrape supplementary fundamentals (P/E, EPS).
    pub fundamentals_enabled: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            quotes: QuoteServiceConfig::default(),
            holdings: HoldingsServiceConfig::default(),
            provider_timeout: Duration::from_secs(10),
            fundamentals_enabled: true,
        }
    }
}

/// Main entry point for the dashboard core library.
/// Holds the quote cache, the holdings document accessor and the enrichment
/// logic; one instance per process, shared behind an `Arc`.
pub struct PortfolioDashboard {
    quote_service: QuoteService,
    holdings_service: HoldingsService,
    portfolio_service: PortfolioService,
}

impl std::fmt::Debug for PortfolioDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioDashboard")
            .field("quote_service", &self.quote_service)
            .field("holdings_path", &self.holdings_service.path())
            .finish()
    }
}

impl PortfolioDashboard {
    /// Build with the default providers (Yahoo Finance, Google Finance scrape).
    pub fn new(config: DashboardConfig) -> Self {
        let fundamentals: Option<Arc<dyn SupplementaryQuoteFetcher>> = if config.fundamentals_enabled {
            Some(Arc::new(GoogleFinanceScraper::new(config.provider_timeout)))
        } else {
            None
        };
        let quote_service = QuoteService::new(
            QuoteProviderRegistry::new_with_defaults(),
            fundamentals,
            config.quotes,
        );
        Self::with_services(quote_service, HoldingsService::new(config.holdings))
    }

    /// Build from pre-assembled services (custom providers, tests).
    pub fn with_services(quote_service: QuoteService, holdings_service: HoldingsService) -> Self {
        Self {
            quote_service,
            holdings_service,
            portfolio_service: PortfolioService::new(),
        }
    }

    // ── Quotes ──────────────────────────────────────────────────────

    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.quote_service.get_quote(symbol).await
    }

    pub async fn get_quotes(&self, symbols: &[String]) -> BatchQuotes {
        self.quote_service.get_quotes(symbols).await
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// The holdings document exactly as stored.
    pub async fn get_holdings(&self) -> Result<Arc<serde_json::Value>, CoreError> {
        self.holdings_service.get_holdings().await
    }

    pub async fn get_holdings_document(&self) -> Result<Arc<HoldingsDocument>, CoreError> {
        self.holdings_service.get_document().await
    }

    /// Load the holdings document, quote every symbol in it and return the
    /// repriced portfolio. Individual quote failures leave that holding at
    /// its document price.
    pub async fn get_live_portfolio(&self) -> Result<LivePortfolio, CoreError> {
        let document = self.get_holdings_document().await?;
        let quotes = self.get_quotes(&document.symbols()).await;
        for failed in &quotes.errors {
            tracing::warn!(symbol = %failed.symbol, error = %failed.message, "holding left unpriced");
        }
        Ok(self.portfolio_service.build_live_portfolio(&document, &quotes))
    }

    // ── Cache management ────────────────────────────────────────────

    /// Clear the quote cache and the holdings document slot.
    pub async fn clear_all_caches(&self) {
        self.quote_service.clear_cache(None).await;
        self.holdings_service.clear_cache().await;
    }

    /// Clear one symbol's cached quote. Other symbols are untouched.
    pub async fn clear_quote(&self, symbol: &str) -> bool {
        self.quote_service.clear_cache(Some(symbol)).await > 0
    }

    pub async fn cache_stats(&self) -> CacheStats {
        CacheStats {
            stock_cache_size: self.quote_service.cache_size().await,
            holdings_cached: self.holdings_service.is_cached().await,
        }
    }

    pub fn quote_service(&self) -> &QuoteService {
        &self.quote_service
    }

    pub fn holdings_service(&self) -> &HoldingsService {
        &self.holdings_service
    }
}
