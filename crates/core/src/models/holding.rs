use serde::{Deserialize, Deserializer, Serialize};

/// A spreadsheet cell that is numeric for some rows and free text for others
/// (percentages such as "12%", growth figures, "NA").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Number(f64),
    Text(String),
}

impl Metric {
    /// Numeric value, if the cell held a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Metric::Number(n) => Some(*n),
            Metric::Text(_) => None,
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Number(0.0)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Number(n) => write!(f, "{n}"),
            Metric::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Cells that were blank or evaluated to NaN in the sheet are stored as
/// `null`; they read as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One security position, as exported from the brokerage spreadsheet.
///
/// `cmp`, `present_value`, `gain_loss`, `gain_loss_percent`, `pe_ratio` and
/// `latest_earnings` are overwritten on every refresh; everything else is
/// copied verbatim from the sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Holding {
    #[serde(deserialize_with = "null_as_default")]
    pub no: f64,
    /// Display name of the security.
    #[serde(deserialize_with = "null_as_default")]
    pub particulars: String,
    /// Ticker symbol or numeric exchange code, upper-cased.
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub purchase_price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub qty: f64,
    /// Cost basis (purchase price × quantity, as recorded in the sheet).
    #[serde(deserialize_with = "null_as_default")]
    pub investment: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub portfolio_percent: f64,

    // Live fields
    #[serde(deserialize_with = "null_as_default")]
    pub cmp: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub present_value: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gain_loss: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gain_loss_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub market_cap: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub pe_ratio: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub latest_earnings: f64,

    // Core fundamentals
    #[serde(rename = "revenueTTM", deserialize_with = "null_as_default")]
    pub revenue_ttm: f64,
    #[serde(rename = "ebitdaTTM", deserialize_with = "null_as_default")]
    pub ebitda_ttm: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub ebitda_percent: Metric,
    #[serde(deserialize_with = "null_as_default")]
    pub pat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub pat_percent: Metric,
    #[serde(deserialize_with = "null_as_default")]
    pub cfo_march24: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub cfo_5_years: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub free_cash_flow: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub debt_to_equity: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub book_value: f64,

    // Growth (3 years)
    #[serde(deserialize_with = "null_as_default")]
    pub revenue_growth: Metric,
    #[serde(deserialize_with = "null_as_default")]
    pub ebitda_growth: Metric,
    #[serde(deserialize_with = "null_as_default")]
    pub profit_growth: Metric,

    // Valuation & others
    #[serde(deserialize_with = "null_as_default")]
    pub market_cap2: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub price_to_sales: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub cfo_to_ebitda: Metric,
    #[serde(deserialize_with = "null_as_default")]
    pub cfo_to_pat: Metric,
    #[serde(deserialize_with = "null_as_default")]
    pub price_to_book: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub stage2: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sale_price: f64,
    /// Free-text commentary column; the document key is `abhishek`.
    #[serde(rename = "abhishek", alias = "commentary", deserialize_with = "null_as_default")]
    pub commentary: String,
}

impl Holding {
    /// Apply a current market price and recompute the derived values.
    pub fn reprice(&mut self, cmp: f64) {
        self.cmp = cmp;
        self.present_value = cmp * self.qty;
        self.gain_loss = self.present_value - self.investment;
        self.gain_loss_percent = percent_of(self.gain_loss, self.investment);
    }
}

/// A named group of holdings with rolled-up totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sector {
    #[serde(deserialize_with = "null_as_default")]
    pub sector_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub investment: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub present_value: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gain_loss: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gain_loss_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub portfolio_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub holdings: Vec<Holding>,
}

impl Sector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            sector_name: name.into(),
            ..Self::default()
        }
    }

    /// Recompute investment, present value and gain/loss from the holdings.
    pub fn recompute_totals(&mut self) {
        self.investment = self.holdings.iter().map(|h| h.investment).sum();
        self.present_value = self.holdings.iter().map(|h| h.present_value).sum();
        self.gain_loss = self.present_value - self.investment;
        self.gain_loss_percent = percent_of(self.gain_loss, self.investment);
    }
}

/// Portfolio-wide rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrandTotal {
    #[serde(deserialize_with = "null_as_default")]
    pub investment: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub present_value: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gain_loss: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub gain_loss_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub portfolio_percent: f64,
    /// Realised sale total found below the holdings in the sheet, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sale_price: Option<f64>,
}

/// The precomputed holdings document: sectors → holdings plus a grand total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoldingsDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub grand_total: GrandTotal,
    #[serde(deserialize_with = "null_as_default")]
    pub sectors: Vec<Sector>,
}

impl HoldingsDocument {
    /// Distinct holding symbols in document order.
    pub fn symbols(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.sectors
            .iter()
            .flat_map(|s| s.holdings.iter())
            .filter(|h| !h.symbol.is_empty())
            .filter(|h| seen.insert(h.symbol.clone()))
            .map(|h| h.symbol.clone())
            .collect()
    }

    pub fn holding_count(&self) -> usize {
        self.sectors.iter().map(|s| s.holdings.len()).sum()
    }
}

/// `part / whole × 100`, or 0 when `whole` is 0.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}
