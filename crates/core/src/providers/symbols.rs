//! Mapping of spreadsheet symbols onto provider-specific exchange identifiers.
//!
//! The brokerage export mixes NSE tickers (`INFY`) with BSE numeric scrip
//! codes (`500209`). Yahoo wants `INFY.NS` / `500209.BO`; Google Finance wants
//! `INFY:NSE` / `500209:BOM`.

/// Known BSE scrip codes whose NSE listing is more liquid (or the only one
/// Yahoo quotes reliably).
const EXCHANGE_OVERRIDES: &[(&str, &str)] = &[
    ("532174", "ICICIBANK.NS"),
    ("533282", "GRAVITA.NS"),
    ("540719", "SBILIFE.NS"),
    ("500209", "INFY.NS"),
    ("543237", "HAPPSTMNDS.NS"),
    ("543272", "EASEMYTRIP.NS"),
    ("511577", "511577.BO"),
    ("541557", "541557.BO"),
];

const NSE_SUFFIX: &str = ".NS";
const BSE_SUFFIX: &str = ".BO";

fn is_numeric(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit())
}

/// Resolve a symbol to the Yahoo exchange-qualified identifier.
///
/// Override table first; otherwise numeric codes go to BSE and bare tickers to NSE.
/// Symbols that already carry a suffix are returned unchanged.
pub fn to_exchange_symbol(symbol: &str) -> String {
    if let Some((_, mapped)) = EXCHANGE_OVERRIDES.iter().find(|(code, _)| *code == symbol) {
        return (*mapped).to_string();
    }
    if is_numeric(symbol) {
        format!("{symbol}{BSE_SUFFIX}")
    } else if !symbol.contains('.') {
        format!("{symbol}{NSE_SUFFIX}")
    } else {
        symbol.to_string()
    }
}

/// Remap a Yahoo identifier to Google Finance's `TICKER:EXCHANGE` form.
pub fn to_google_symbol(exchange_symbol: &str) -> String {
    let mapped = exchange_symbol
        .replace(NSE_SUFFIX, ":NSE")
        .replace(BSE_SUFFIX, ":BOM");
    if mapped.contains(':') {
        return mapped;
    }
    if is_numeric(exchange_symbol) {
        format!("{exchange_symbol}:BOM")
    } else {
        format!("{exchange_symbol}:NSE")
    }
}
