use thiserror::Error;

/// Unified error type for the portfolio-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Holdings document ───────────────────────────────────────────
    #[error("Failed to load holdings data: {0}")]
    HoldingsLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Import error: {0}")]
    Import(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Scrape error ({provider}): {message}")]
    Scrape {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No quote provider registered")]
    NoProvider,

    // ── Quotes ──────────────────────────────────────────────────────
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Failed to fetch stock data for {symbol}")]
    QuoteUnavailable { symbol: String },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Import(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Report origin and path only; query strings never reach logs or responses.
        let endpoint = e
            .url()
            .map(|url| format!("{}{}", url.origin().ascii_serialization(), url.path()));
        let kind = if e.is_timeout() {
            "timed out"
        } else if e.is_connect() {
            "connection failed"
        } else if e.is_status() {
            "bad status"
        } else {
            "request failed"
        };
        let detail = e.without_url().to_string();
        match endpoint {
            Some(endpoint) => CoreError::Network(format!("{kind} for {endpoint}: {detail}")),
            None => CoreError::Network(format!("{kind}: {detail}")),
        }
    }
}
