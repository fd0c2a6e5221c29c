use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use super::symbols::to_google_symbol;
use super::traits::SupplementaryQuoteFetcher;
use crate::errors::CoreError;
use crate::models::quote::Fundamentals;

const PROVIDER: &str = "Google Finance";
const BASE_URL: &str = "https://www.google.com/finance/quote";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const PE_LABEL: &str = "P/E ratio";
const EPS_LABEL: &str = "EPS (TTM)";

/// Row container and value cell classes on the quote page's "about" panel.
const ROW_CLASS: &str = "gyFHrc";
const VALUE_SELECTOR: &str = ".P6K39c";

/// Scrapes P/E and EPS from the Google Finance quote page.
///
/// - **Free**, no key, but the page markup is not an API: values are located
///   by their label text and the layout may change at any time.
/// - Pinned to the row/value classes above; anything unexpected yields `0`.
pub struct GoogleFinanceScraper {
    client: Client,
    base_url: String,
}

impl GoogleFinanceScraper {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, timeout)
    }

    /// Point the scraper at another host (used by tests and mirrors).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SupplementaryQuoteFetcher for GoogleFinanceScraper {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_fundamentals(
        &self,
        symbol: &str,
        exchange_symbol: &str,
    ) -> Result<Fundamentals, CoreError> {
        let google_symbol = to_google_symbol(exchange_symbol);
        let url = format!("{}/{google_symbol}", self.base_url);

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let fundamentals = parse_fundamentals(&body)?;
        tracing::debug!(
            symbol,
            pe_ratio = fundamentals.pe_ratio,
            latest_earnings = fundamentals.latest_earnings,
            "Google Finance fundamentals"
        );
        Ok(fundamentals)
    }
}

/// Extract P/E and EPS from a quote page. Missing or unparseable values are `0`.
pub fn parse_fundamentals(html: &str) -> Result<Fundamentals, CoreError> {
    let document = Html::parse_document(html);
    let div = selector("div")?;
    let value_cell = selector(VALUE_SELECTOR)?;

    let pe_text = labelled_value(&document, &div, &value_cell, PE_LABEL);
    let eps_text = labelled_value(&document, &div, &value_cell, EPS_LABEL);

    Ok(Fundamentals {
        pe_ratio: parse_number(&pe_text),
        latest_earnings: parse_number(&eps_text),
    })
}

fn selector(css: &str) -> Result<Selector, CoreError> {
    Selector::parse(css).map_err(|e| CoreError::Scrape {
        provider: PROVIDER.into(),
        message: format!("Invalid selector {css:?}: {e}"),
    })
}

/// Find the last `<div>` whose whole text is `label`, then read the value
/// cell of its row; if the row layout is missing, fall back to the last
/// sibling element of the label.
fn labelled_value(document: &Html, div: &Selector, value_cell: &Selector, label: &str) -> String {
    let Some(label_el) = document
        .select(div)
        .filter(|el| text_of(el).trim() == label)
        .last()
    else {
        return String::new();
    };

    let row = std::iter::once(label_el)
        .chain(label_el.ancestors().filter_map(ElementRef::wrap))
        .find(|el| el.value().classes().any(|c| c == ROW_CLASS));

    if let Some(row) = row {
        let value: String = row.select(value_cell).map(|el| text_of(&el)).collect();
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }

    label_el
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(|parent| parent.children().filter_map(ElementRef::wrap).last())
        .map(|el| text_of(&el).trim().to_string())
        .unwrap_or_default()
}

fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// Parse the leading number of a display string ("1,234.5", "28.50x").
/// Anything without a leading number is `0`.
fn parse_number(text: &str) -> f64 {
    let cleaned = text.trim().replace(',', "");
    let numeric: String = cleaned
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+')))
        .map(|(_, c)| c)
        .collect();
    numeric
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}
