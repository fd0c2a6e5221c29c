use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use portfolio_dashboard_core::PortfolioDashboard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub dashboard: Arc<PortfolioDashboard>,
    pub environment: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(dashboard: PortfolioDashboard, environment: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            dashboard: Arc::new(dashboard),
            environment: environment.into(),
            started_at: Instant::now(),
        })
    }

    /// Seconds since the state was built.
    pub fn uptime(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

/// JSON lines in production, human-readable output otherwise.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let dashboard = PortfolioDashboard::new(config.dashboard.clone());
    tracing::info!(
        holdings = %config.dashboard.holdings.path.display(),
        providers = ?dashboard.quote_service().provider_names(),
        fundamentals = config.dashboard.fundamentals_enabled,
        "dashboard initialised"
    );
    if !config.dashboard.holdings.path.exists() {
        tracing::warn!(
            path = %config.dashboard.holdings.path.display(),
            "holdings document not found; /api/holdings will fail until it is created"
        );
    }
    Ok(AppState::new(dashboard, config.environment.clone()))
}
