use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Which source produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Fresh fetch from the primary market-price provider.
    Yahoo,
    /// A previously cached quote, served because a refetch failed.
    Cache,
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteSource::Yahoo => write!(f, "yahoo"),
            QuoteSource::Cache => write!(f, "cache"),
        }
    }
}

/// A market quote for one ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,

    /// Current market price.
    pub cmp: f64,

    /// Price/earnings ratio (0 when the supplementary source had nothing).
    pub pe_ratio: f64,

    /// Latest earnings per share (0 when the supplementary source had nothing).
    pub latest_earnings: f64,

    pub source: QuoteSource,

    /// Wall-clock time the quote was fetched.
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// The same quote, re-tagged as served from the cache.
    pub fn as_cached(&self) -> Self {
        Self {
            source: QuoteSource::Cache,
            ..self.clone()
        }
    }
}

/// Supplementary per-share fundamentals scraped from a secondary source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub pe_ratio: f64,
    pub latest_earnings: f64,
}

/// A cached quote together with the monotonic instant it was stored.
#[derive(Debug, Clone)]
pub struct CachedQuote {
    pub quote: Quote,
    pub fetched_at: Instant,
}

impl CachedQuote {
    pub fn new(quote: Quote) -> Self {
        Self {
            quote,
            fetched_at: Instant::now(),
        }
    }

    /// True while the entry is younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// In-memory symbol → quote map.
///
/// Expired entries are never purged here: once past the TTL they are only
/// consulted as a fallback when a refetch fails. Entries go away only through
/// [`QuoteCache::remove`] / [`QuoteCache::clear`].
#[derive(Debug, Default)]
pub struct QuoteCache {
    entries: HashMap<String, CachedQuote>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&CachedQuote> {
        self.entries.get(symbol)
    }

    /// Return the entry only if it is still fresh.
    pub fn get_fresh(&self, symbol: &str, ttl: Duration) -> Option<&CachedQuote> {
        self.entries.get(symbol).filter(|entry| entry.is_fresh(ttl))
    }

    /// Store a quote, overwriting any previous entry for the symbol.
    pub fn insert(&mut self, quote: Quote) {
        self.entries
            .insert(quote.symbol.clone(), CachedQuote::new(quote));
    }

    pub fn remove(&mut self, symbol: &str) -> bool {
        self.entries.remove(symbol).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot of cache population, reported by `/api/cache/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub stock_cache_size: usize,
    pub holdings_cached: bool,
}

/// A symbol that could not be quoted in a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolError {
    pub symbol: String,
    pub message: String,
}

/// Result of a batch quote request: successes and failures, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchQuotes {
    pub quotes: Vec<Quote>,
    pub errors: Vec<SymbolError>,
}

impl BatchQuotes {
    /// True when every requested symbol failed.
    pub fn all_failed(&self) -> bool {
        self.quotes.is_empty() && !self.errors.is_empty()
    }

    /// Index the successful quotes by symbol.
    pub fn by_symbol(&self) -> HashMap<&str, &Quote> {
        self.quotes
            .iter()
            .map(|q| (q.symbol.as_str(), q))
            .collect()
    }
}
