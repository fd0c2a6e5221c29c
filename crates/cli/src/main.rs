//! Portfolio CLI: worksheet import and a polling terminal dashboard.
//!
//! Commands:
//! - `import`: convert a CSV export of the brokerage worksheet into the
//!   holdings JSON document the server reads
//! - `watch`: poll the server's live portfolio and redraw a summary table

mod render;
mod watch;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portfolio_dashboard_core::import::convert_file;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portfolio", about = "Portfolio dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a worksheet CSV export into a holdings JSON document.
    Import {
        /// CSV export of the portfolio worksheet.
        #[arg(long)]
        input: PathBuf,

        /// Destination JSON file.
        #[arg(long, default_value = "data/holdings.json")]
        output: PathBuf,
    },
    /// Poll the API and render the live portfolio.
    Watch {
        /// Base URL of the dashboard server.
        #[arg(long, env = "PORTFOLIO_API_URL", default_value = "http://localhost:5000")]
        api_url: String,

        /// Refresh interval in seconds.
        #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Render a single refresh and exit.
        #[arg(long, default_value_t = false)]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { input, output } => run_import(input, output),
        Commands::Watch {
            api_url,
            interval,
            once,
        } => {
            let client = watch::PortfolioClient::new(&api_url)?;
            if once {
                watch::run_once(&client).await
            } else {
                watch::run_loop(&client, Duration::from_secs(interval)).await
            }
        }
    }
}

fn run_import(input: PathBuf, output: PathBuf) -> Result<()> {
    let document = convert_file(&input, &output)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!(
        "Wrote {} holdings in {} sectors to {}",
        document.holding_count(),
        document.sectors.len(),
        output.display()
    );
    for sector in &document.sectors {
        println!("  {:<32} {:>3} holdings", sector.sector_name, sector.holdings.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn watch_defaults() {
        let cli = Cli::try_parse_from(["portfolio", "watch", "--api-url", "http://api:5000"]).unwrap();
        match cli.command {
            Commands::Watch {
                api_url,
                interval,
                once,
            } => {
                assert_eq!(api_url, "http://api:5000");
                assert_eq!(interval, 15);
                assert!(!once);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["portfolio", "watch", "--interval", "0"]).is_err());
    }

    #[test]
    fn import_requires_input() {
        assert!(Cli::try_parse_from(["portfolio", "import"]).is_err());
    }
}
