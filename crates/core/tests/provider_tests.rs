// ═══════════════════════════════════════════════════════════════════
// Provider Tests — Registry, symbol mapping, Google Finance parsing
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use portfolio_dashboard_core::errors::CoreError;
use portfolio_dashboard_core::providers::google_finance::{parse_fundamentals, GoogleFinanceScraper};
use portfolio_dashboard_core::providers::registry::QuoteProviderRegistry;
use portfolio_dashboard_core::providers::symbols::{to_exchange_symbol, to_google_symbol};
use portfolio_dashboard_core::providers::traits::{QuoteProvider, SupplementaryQuoteFetcher};
use portfolio_dashboard_core::providers::yahoo_finance::YahooFinanceProvider;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

struct MockProvider {
    name: String,
}

impl MockProvider {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_current_price(&self, _sym: &str) -> Result<f64, CoreError> {
        Ok(100.0)
    }
}

// ═══════════════════════════════════════════════════════════════════
// QuoteProviderRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn new_creates_empty_registry() {
        let registry = QuoteProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.providers().is_empty());
    }

    #[test]
    fn default_creates_empty_registry() {
        assert!(QuoteProviderRegistry::default().is_empty());
    }

    #[test]
    fn preserves_registration_order() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(MockProvider::new("A"));
        registry.register(MockProvider::new("B"));
        registry.register(MockProvider::new("C"));

        assert_eq!(registry.provider_names(), vec!["A", "B", "C"]);
        assert_eq!(registry.providers()[0].name(), "A");
    }

    #[test]
    fn clones_share_providers() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(MockProvider::new("Only"));
        let copy = registry.clone();
        assert!(Arc::ptr_eq(&registry.providers()[0], &copy.providers()[0]));
    }

    #[test]
    fn defaults_register_yahoo() {
        let registry = QuoteProviderRegistry::new_with_defaults();
        assert_eq!(registry.provider_names(), vec!["Yahoo Finance"]);
    }

    #[test]
    fn debug_lists_provider_names() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(MockProvider::new("Primary"));
        assert!(format!("{registry:?}").contains("Primary"));
    }

    #[tokio::test]
    async fn registered_provider_is_callable() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(MockProvider::new("Mock"));
        let price = registry.providers()[0].get_current_price("INFY.NS").await.unwrap();
        assert_eq!(price, 100.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Symbol mapping
// ═══════════════════════════════════════════════════════════════════

mod symbols {
    use super::*;

    #[test]
    fn yahoo_and_google_forms_agree() {
        let cases = [
            ("INFY", "INFY.NS", "INFY:NSE"),
            ("500325", "500325.BO", "500325:BOM"),
            ("532174", "ICICIBANK.NS", "ICICIBANK:NSE"),
            ("511577", "511577.BO", "511577:BOM"),
        ];
        for (symbol, yahoo, google) in cases {
            let exchange = to_exchange_symbol(symbol);
            assert_eq!(exchange, yahoo, "yahoo form of {symbol}");
            assert_eq!(to_google_symbol(&exchange), google, "google form of {symbol}");
        }
    }

    #[test]
    fn mapping_is_idempotent_for_qualified_symbols() {
        assert_eq!(to_exchange_symbol("TCS.NS"), "TCS.NS");
        assert_eq!(to_exchange_symbol("500325.BO"), "500325.BO");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Google Finance — page parsing
// ═══════════════════════════════════════════════════════════════════

mod google_finance {
    use super::*;

    fn row(label: &str, value: &str) -> String {
        format!(
            r#"<div class="gyFHrc"><span><div class="mfs7Fc">{label}</div></span><div class="P6K39c">{value}</div></div>"#
        )
    }

    #[test]
    fn reads_labelled_rows() {
        let html = format!(
            "<html><body>{}{}{}</body></html>",
            row("Market cap", "6.1T INR"),
            row("P/E ratio", "28.50"),
            row("EPS (TTM)", "52.30"),
        );
        let f = parse_fundamentals(&html).unwrap();
        assert_eq!(f.pe_ratio, 28.5);
        assert_eq!(f.latest_earnings, 52.3);
    }

    #[test]
    fn strips_thousands_separators() {
        let html = format!("<html><body>{}</body></html>", row("EPS (TTM)", "1,052.30"));
        let f = parse_fundamentals(&html).unwrap();
        assert_eq!(f.latest_earnings, 1052.3);
    }

    #[test]
    fn dash_values_read_as_zero() {
        let html = format!("<html><body>{}</body></html>", row("P/E ratio", "-"));
        let f = parse_fundamentals(&html).unwrap();
        assert_eq!(f.pe_ratio, 0.0);
    }

    #[test]
    fn missing_labels_read_as_zero() {
        let f = parse_fundamentals("<html><body><div>Nothing here</div></body></html>").unwrap();
        assert_eq!(f.pe_ratio, 0.0);
        assert_eq!(f.latest_earnings, 0.0);
    }

    #[test]
    fn label_must_match_whole_text() {
        let html = format!("<html><body>{}</body></html>", row("Forward P/E ratio", "40"));
        let f = parse_fundamentals(&html).unwrap();
        assert_eq!(f.pe_ratio, 0.0);
    }

    #[test]
    fn falls_back_to_last_sibling_without_row_markup() {
        let html = r#"<html><body>
            <div class="card"><div>P/E ratio</div><span>icon</span><div>31.2</div></div>
        </body></html>"#;
        let f = parse_fundamentals(html).unwrap();
        assert_eq!(f.pe_ratio, 31.2);
    }

    #[test]
    fn name() {
        let scraper = GoogleFinanceScraper::new(Duration::from_secs(5));
        assert_eq!(scraper.name(), "Google Finance");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let scraper =
            GoogleFinanceScraper::with_base_url("http://127.0.0.1:1/finance/quote", Duration::from_secs(2));
        let result = scraper.fetch_fundamentals("INFY", "INFY.NS").await;
        assert!(matches!(result, Err(CoreError::Network(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// YahooFinanceProvider
// ═══════════════════════════════════════════════════════════════════

mod yahoo_finance {
    use super::*;

    #[test]
    fn name() {
        let provider = YahooFinanceProvider::new().unwrap();
        assert_eq!(provider.name(), "Yahoo Finance");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Provider trait compliance
// ═══════════════════════════════════════════════════════════════════

mod trait_compliance {
    use super::*;

    /// Verify all providers implement Send + Sync (required by async-trait).
    #[test]
    fn providers_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<YahooFinanceProvider>();
        assert_send_sync::<GoogleFinanceScraper>();
        assert_send_sync::<QuoteProviderRegistry>();
    }

    #[test]
    fn providers_as_trait_objects() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Arc::new(YahooFinanceProvider::new().unwrap()));
        registry.register(MockProvider::new("Fallback"));

        let fetcher: Arc<dyn SupplementaryQuoteFetcher> =
            Arc::new(GoogleFinanceScraper::new(Duration::from_secs(1)));
        assert_eq!(registry.provider_names(), vec!["Yahoo Finance", "Fallback"]);
        assert_eq!(fetcher.name(), "Google Finance");
    }
}
