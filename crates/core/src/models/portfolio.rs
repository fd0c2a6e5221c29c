use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::holding::{GrandTotal, Sector};

/// The holdings document after a refresh: every holding repriced from live
/// quotes and every rollup recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePortfolio {
    pub grand_total: GrandTotal,
    pub sectors: Vec<Sector>,
    pub last_updated: DateTime<Utc>,
    /// Symbols with no quote this cycle; they keep the spreadsheet price.
    pub unpriced_symbols: Vec<String>,
}
