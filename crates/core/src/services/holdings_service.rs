use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::CoreError;
use crate::models::holding::HoldingsDocument;

/// Default lifetime of the cached holdings document.
pub const DEFAULT_HOLDINGS_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct HoldingsServiceConfig {
    /// Path of the JSON document produced by the spreadsheet importer.
    pub path: PathBuf,
    /// How long a loaded document is served before it is re-read from disk.
    pub ttl: Duration,
}

impl Default for HoldingsServiceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/holdings.json"),
            ttl: DEFAULT_HOLDINGS_TTL,
        }
    }
}

/// A holdings file as read from disk: the JSON exactly as written, and the
/// typed view used for enrichment.
#[derive(Debug, Clone)]
pub struct LoadedHoldings {
    pub raw: Arc<Value>,
    pub document: Arc<HoldingsDocument>,
}

struct CachedDocument {
    holdings: LoadedHoldings,
    loaded_at: Instant,
}

/// Read-only accessor for the precomputed holdings document.
///
/// Cache-aside: the first read loads the file, later reads within the TTL
/// share the same parsed document. Load failures are returned to the caller
/// and never retried here.
pub struct HoldingsService {
    config: HoldingsServiceConfig,
    cache: RwLock<Option<CachedDocument>>,
}

impl HoldingsService {
    pub fn new(config: HoldingsServiceConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The document exactly as stored on disk, keys and `null` cells intact.
    pub async fn get_holdings(&self) -> Result<Arc<Value>, CoreError> {
        Ok(self.load().await?.raw)
    }

    /// Typed view of the same cached document.
    pub async fn get_document(&self) -> Result<Arc<HoldingsDocument>, CoreError> {
        Ok(self.load().await?.document)
    }

    async fn load(&self) -> Result<LoadedHoldings, CoreError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.loaded_at.elapsed() < self.config.ttl {
                    return Ok(cached.holdings.clone());
                }
            }
        }

        let holdings = load_document(&self.config.path).await?;
        *self.cache.write().await = Some(CachedDocument {
            holdings: holdings.clone(),
            loaded_at: Instant::now(),
        });
        tracing::debug!(
            path = %self.config.path.display(),
            sectors = holdings.document.sectors.len(),
            holdings = holdings.document.holding_count(),
            "holdings document loaded"
        );
        Ok(holdings)
    }

    /// True when a document is currently held in the cache slot.
    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.is_some()
    }

    pub async fn clear_cache(&self) {
        *self.cache.write().await = None;
        tracing::info!("holdings cache cleared");
    }
}

/// Read a holdings document from disk. The file must be JSON and must fit
/// the holdings layout; the raw value is kept alongside the typed view.
pub async fn load_document(path: &Path) -> Result<LoadedHoldings, CoreError> {
    let load_error = |e: &dyn std::fmt::Display| {
        tracing::error!(path = %path.display(), error = %e, "error loading holdings data");
        CoreError::HoldingsLoad(format!("{}: {e}", path.display()))
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| load_error(&e))?;
    let raw: Value = serde_json::from_str(&text).map_err(|e| load_error(&e))?;
    let document = HoldingsDocument::deserialize(&raw).map_err(|e| load_error(&e))?;

    Ok(LoadedHoldings {
        raw: Arc::new(raw),
        document: Arc::new(document),
    })
}
