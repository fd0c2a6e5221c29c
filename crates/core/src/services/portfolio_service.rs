use chrono::Utc;

use crate::models::holding::{percent_of, GrandTotal, HoldingsDocument};
use crate::models::portfolio::LivePortfolio;
use crate::models::quote::BatchQuotes;

/// Applies live quotes to the holdings document and recomputes rollups.
///
/// No I/O here; quotes are fetched by the caller.
#[derive(Debug, Default)]
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Reprice every holding and rebuild sector and grand totals.
    ///
    /// A quoted holding takes the quote's price, P/E and EPS. An unquoted
    /// holding keeps its document price; its derived values are still
    /// recomputed so that `present_value == cmp * qty` holds everywhere.
    /// Holdings without a symbol are never quoted and never reported unpriced.
    pub fn build_live_portfolio(
        &self,
        document: &HoldingsDocument,
        quotes: &BatchQuotes,
    ) -> LivePortfolio {
        let by_symbol = quotes.by_symbol();
        let mut sectors = document.sectors.clone();
        let mut unpriced_symbols = Vec::new();

        for sector in &mut sectors {
            for holding in &mut sector.holdings {
                match by_symbol.get(holding.symbol.as_str()) {
                    Some(quote) => {
                        holding.pe_ratio = quote.pe_ratio;
                        holding.latest_earnings = quote.latest_earnings;
                        holding.reprice(quote.cmp);
                    }
                    None => {
                        if !holding.symbol.is_empty() && !unpriced_symbols.contains(&holding.symbol) {
                            unpriced_symbols.push(holding.symbol.clone());
                        }
                        holding.reprice(holding.cmp);
                    }
                }
            }
            sector.recompute_totals();
        }

        let total_investment: f64 = sectors.iter().map(|s| s.investment).sum();
        let total_present_value: f64 = sectors.iter().map(|s| s.present_value).sum();

        for sector in &mut sectors {
            sector.portfolio_percent = percent_of(sector.investment, total_investment);
            for holding in &mut sector.holdings {
                holding.portfolio_percent = percent_of(holding.investment, total_investment);
            }
        }

        let gain_loss = total_present_value - total_investment;
        let grand_total = GrandTotal {
            investment: total_investment,
            present_value: total_present_value,
            gain_loss,
            gain_loss_percent: percent_of(gain_loss, total_investment),
            portfolio_percent: 100.0,
            total_sale_price: document.grand_total.total_sale_price,
        };

        LivePortfolio {
            grand_total,
            sectors,
            last_updated: Utc::now(),
            unpriced_symbols,
        }
    }
}
