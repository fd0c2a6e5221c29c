use async_trait::async_trait;
use yahoo_finance_api::YahooConnector;

use super::traits::QuoteProvider;
use crate::errors::CoreError;

const PROVIDER: &str = "Yahoo Finance";
/// Daily bars; the last bar's close tracks the live price while the market is open.
const INTERVAL: &str = "1d";

/// Primary price feed for NSE (`.NS`) and BSE (`.BO`) listings.
///
/// Keyless and unofficial: Yahoo may throttle or change the chart endpoint
/// without notice, so the quote service treats every failure as recoverable.
pub struct YahooFinanceProvider {
    connector: YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        YahooConnector::new()
            .map(|connector| Self { connector })
            .map_err(|e| api_error(format!("Failed to create connector: {e}")))
    }
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: PROVIDER.into(),
        message,
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_current_price(&self, exchange_symbol: &str) -> Result<f64, CoreError> {
        let response = self
            .connector
            .get_latest_quotes(exchange_symbol, INTERVAL)
            .await
            .map_err(|e| api_error(format!("Chart request for {exchange_symbol} failed: {e}")))?;

        let bar = response
            .last_quote()
            .map_err(|e| api_error(format!("No quote data for {exchange_symbol}: {e}")))?;

        tracing::debug!(exchange_symbol, close = bar.close, timestamp = bar.timestamp, "Yahoo close");
        Ok(bar.close)
    }
}
