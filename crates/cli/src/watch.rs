use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use portfolio_dashboard_core::models::portfolio::LivePortfolio;
use serde::Deserialize;
use tokio::time::MissedTickBehavior;

use crate::render::render_portfolio;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

pub struct PortfolioClient {
    client: reqwest::Client,
    url: String,
}

impl PortfolioClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}/api/portfolio", api_url.trim_end_matches('/')),
        })
    }

    pub async fn fetch(&self) -> Result<LivePortfolio> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {} returned {status}", self.url);
        }
        let envelope: Envelope<LivePortfolio> = response
            .json()
            .await
            .context("Unexpected portfolio response")?;
        Ok(envelope.data)
    }
}

pub async fn run_once(client: &PortfolioClient) -> Result<()> {
    let portfolio = client.fetch().await?;
    print!("{}", render_portfolio(&portfolio));
    Ok(())
}

/// Redraw on every tick until Ctrl-C. A failed refresh keeps the previous
/// screen and appends a warning line.
pub async fn run_loop(client: &PortfolioClient, every: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last: Option<LivePortfolio> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }

        match client.fetch().await {
            Ok(portfolio) => {
                print!("{CLEAR_SCREEN}{}", render_portfolio(&portfolio));
                last = Some(portfolio);
            }
            Err(e) => {
                tracing::warn!(error = %e, "portfolio refresh failed");
                print!("{CLEAR_SCREEN}");
                if let Some(portfolio) = &last {
                    print!("{}", render_portfolio(portfolio));
                }
                println!(
                    "\n! refresh failed at {}: {e:#}",
                    Utc::now().format("%H:%M:%S UTC")
                );
            }
        }
    }
}
