use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context};
use axum::http::HeaderValue;
use portfolio_dashboard_core::{
    services::{holdings_service::HoldingsServiceConfig, quote_service::QuoteServiceConfig},
    DashboardConfig,
};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_HOLDINGS_PATH: &str = "data/holdings.json";

pub struct Config {
    pub listen_addr: SocketAddr,
    /// Deployment name reported by `/health`; `production` hides panic details.
    pub environment: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Read the process environment, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank variables take
    /// their defaults; malformed values are an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port: u16 = parse_or(&var, "PORT", DEFAULT_PORT)?;
        let bind = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let listen_addr: SocketAddr = format!("{bind}:{port}")
            .parse()
            .with_context(|| format!("Invalid BIND_ADDR {bind:?}"))?;

        let environment = var("APP_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let cors_allow: Vec<String> = match var("CORS_ORIGIN") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => vec![var("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string())],
        };
        for origin in &cors_allow {
            HeaderValue::from_str(origin).map_err(|_| anyhow!("Invalid CORS origin {origin:?}"))?;
        }

        let request_timeout = Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?);
        let quote_ttl = Duration::from_secs(parse_or(&var, "QUOTE_CACHE_TTL_SECS", 60)?);
        let holdings_ttl = Duration::from_secs(parse_or(&var, "HOLDINGS_CACHE_TTL_SECS", 300)?);
        let provider_timeout = Duration::from_secs(parse_or(&var, "PROVIDER_TIMEOUT_SECS", 10)?);
        if provider_timeout.is_zero() || request_timeout.is_zero() {
            bail!("Timeouts must be at least one second");
        }
        let fundamentals_enabled = parse_bool(&var, "FUNDAMENTALS_ENABLED", true)?;
        let holdings_path =
            PathBuf::from(var("HOLDINGS_PATH").unwrap_or_else(|| DEFAULT_HOLDINGS_PATH.to_string()));

        Ok(Self {
            listen_addr,
            environment,
            cors_allow,
            request_timeout,
            dashboard: DashboardConfig {
                quotes: QuoteServiceConfig { ttl: quote_ttl },
                holdings: HoldingsServiceConfig {
                    path: holdings_path,
                    ttl: holdings_ttl,
                },
                provider_timeout,
                fundamentals_enabled,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Invalid {key} {raw:?}: {e}")),
        None => Ok(default),
    }
}

fn parse_bool<F>(var: &F, key: &str, default: bool) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => bail!("Invalid {key} {v:?}: expected true or false"),
    }
}
