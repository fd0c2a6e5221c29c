use std::collections::HashSet;
use std::fmt::Write;

use portfolio_dashboard_core::models::holding::{Holding, Sector};
use portfolio_dashboard_core::models::portfolio::LivePortfolio;

const RULE_WIDTH: usize = 112;

/// Group the integer part in thousands: `1234567.891` → `1,234,567.89`.
pub fn money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn signed_money(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", money(value))
    } else {
        money(value)
    }
}

pub fn percent(value: f64) -> String {
    format!("{value:+.2}%")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn holding_line(h: &Holding, unpriced: bool) -> String {
    format!(
        "{:>3} {:<24} {:<12} {:>6} {:>11} {:>11} {:>13} {:>13} {:>8} {:>7} {:>8}{}",
        h.no,
        truncate(&h.particulars, 24),
        truncate(&h.symbol, 12),
        h.qty,
        money(h.purchase_price),
        money(h.cmp),
        money(h.present_value),
        signed_money(h.gain_loss),
        percent(h.gain_loss_percent),
        format!("{:.2}", h.pe_ratio),
        format!("{:.2}", h.latest_earnings),
        if unpriced { " *" } else { "" },
    )
}

fn sector_block(out: &mut String, sector: &Sector, unpriced: &HashSet<&str>) {
    let _ = writeln!(
        out,
        "\n{}  ({:.2}% of portfolio)  invested {}  value {}  {} ({})",
        sector.sector_name,
        sector.portfolio_percent,
        money(sector.investment),
        money(sector.present_value),
        signed_money(sector.gain_loss),
        percent(sector.gain_loss_percent),
    );
    let _ = writeln!(
        out,
        "{:>3} {:<24} {:<12} {:>6} {:>11} {:>11} {:>13} {:>13} {:>8} {:>7} {:>8}",
        "No", "Particulars", "Symbol", "Qty", "Purchase", "CMP", "Present", "Gain/Loss", "G/L %",
        "P/E", "EPS"
    );
    for holding in &sector.holdings {
        let missing = unpriced.contains(holding.symbol.as_str());
        let _ = writeln!(out, "{}", holding_line(holding, missing));
    }
}

/// Full dashboard text for one refresh.
pub fn render_portfolio(portfolio: &LivePortfolio) -> String {
    let total = &portfolio.grand_total;
    let unpriced: HashSet<&str> = portfolio.unpriced_symbols.iter().map(String::as_str).collect();
    let mut out = String::new();

    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "Portfolio  invested {}  value {}  {} ({})",
        money(total.investment),
        money(total.present_value),
        signed_money(total.gain_loss),
        percent(total.gain_loss_percent),
    );
    let _ = writeln!(
        out,
        "Updated {}  ·  {} sectors",
        portfolio.last_updated.format("%Y-%m-%d %H:%M:%S UTC"),
        portfolio.sectors.len()
    );
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));

    for sector in &portfolio.sectors {
        sector_block(&mut out, sector, &unpriced);
    }

    if !portfolio.unpriced_symbols.is_empty() {
        let _ = writeln!(
            out,
            "\n* no live quote, showing sheet price: {}",
            portfolio.unpriced_symbols.join(", ")
        );
    }
    out
}
