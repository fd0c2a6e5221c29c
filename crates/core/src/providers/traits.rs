use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::Fundamentals;

/// A source of current market prices.
///
/// The quote service only depends on this trait; swapping Yahoo for another
/// feed means registering a different implementation.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Current market price for an exchange-qualified symbol (e.g. `INFY.NS`).
    async fn get_current_price(&self, exchange_symbol: &str) -> Result<f64, CoreError>;
}

/// A best-effort source of supplementary per-share fundamentals.
///
/// Failures are expected: callers degrade to [`Fundamentals::default`].
#[async_trait]
pub trait SupplementaryQuoteFetcher: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch P/E and EPS for `symbol`, whose primary exchange-qualified form is
    /// `exchange_symbol`.
    async fn fetch_fundamentals(
        &self,
        symbol: &str,
        exchange_symbol: &str,
    ) -> Result<Fundamentals, CoreError>;
}
