// ═══════════════════════════════════════════════════════════════════
// Model Tests — Holding/Sector documents, Metric, Quote, QuoteCache
// ═══════════════════════════════════════════════════════════════════

use chrono::{TimeZone, Utc};
use std::time::Duration;

use portfolio_dashboard_core::models::holding::{
    percent_of, GrandTotal, Holding, HoldingsDocument, Metric, Sector,
};
use portfolio_dashboard_core::models::quote::{
    BatchQuotes, CacheStats, Quote, QuoteCache, QuoteSource, SymbolError,
};

fn sample_quote(symbol: &str, cmp: f64) -> Quote {
    Quote {
        symbol: symbol.into(),
        cmp,
        pe_ratio: 28.5,
        latest_earnings: 52.3,
        source: QuoteSource::Yahoo,
        timestamp: Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
    }
}

// ── Metric ──────────────────────────────────────────────────────────

mod metric {
    use super::*;

    #[test]
    fn number_and_text_round_trip_untagged() {
        let n: Metric = serde_json::from_str("0.25").unwrap();
        let t: Metric = serde_json::from_str("\"NA\"").unwrap();
        assert_eq!(n, Metric::Number(0.25));
        assert_eq!(t, Metric::Text("NA".into()));
        assert_eq!(serde_json::to_string(&n).unwrap(), "0.25");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"NA\"");
    }

    #[test]
    fn as_f64_only_for_numbers() {
        assert_eq!(Metric::Number(3.0).as_f64(), Some(3.0));
        assert_eq!(Metric::Text("12%".into()).as_f64(), None);
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Metric::default(), Metric::Number(0.0));
    }

    #[test]
    fn display() {
        assert_eq!(Metric::Number(1.5).to_string(), "1.5");
        assert_eq!(Metric::Text("-".into()).to_string(), "-");
    }
}

// ── Holding ─────────────────────────────────────────────────────────

mod holding {
    use super::*;

    #[test]
    fn serializes_with_document_field_names() {
        let h = Holding {
            symbol: "INFY".into(),
            revenue_ttm: 1.0,
            ebitda_ttm: 2.0,
            cfo_5_years: 3.0,
            cfo_march24: 4.0,
            market_cap2: 5.0,
            ..Holding::default()
        };
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["revenueTTM"], 1.0);
        assert_eq!(json["ebitdaTTM"], 2.0);
        assert_eq!(json["cfo5Years"], 3.0);
        assert_eq!(json["cfoMarch24"], 4.0);
        assert_eq!(json["marketCap2"], 5.0);
        assert_eq!(json["purchasePrice"], 0.0);
        assert_eq!(json["gainLossPercent"], 0.0);
    }

    #[test]
    fn commentary_uses_document_key() {
        let h: Holding =
            serde_json::from_str(r#"{"symbol": "TCS", "abhishek": "hold"}"#).unwrap();
        assert_eq!(h.commentary, "hold");
        assert_eq!(h.symbol, "TCS");

        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["abhishek"], "hold");
        assert!(json.get("commentary").is_none());
    }

    #[test]
    fn accepts_commentary_key_as_alias() {
        let h: Holding = serde_json::from_str(r#"{"commentary": "sell"}"#).unwrap();
        assert_eq!(h.commentary, "sell");
    }

    #[test]
    fn null_cells_read_as_defaults() {
        let h: Holding = serde_json::from_str(
            r#"{"no": 3, "symbol": "HDFCBANK", "qty": 5, "peRatio": null, "marketCap": null,
                "gainLossPercent": null, "revenueGrowth": null, "stage2": null, "abhishek": null}"#,
        )
        .unwrap();
        assert_eq!(h.no, 3.0);
        assert_eq!(h.qty, 5.0);
        assert_eq!(h.pe_ratio, 0.0);
        assert_eq!(h.market_cap, 0.0);
        assert_eq!(h.gain_loss_percent, 0.0);
        assert_eq!(h.revenue_growth, Metric::default());
        assert_eq!(h.stage2, "");
        assert_eq!(h.commentary, "");
    }

    #[test]
    fn null_rollups_read_as_defaults() {
        let doc: HoldingsDocument = serde_json::from_str(
            r#"{"grandTotal": {"investment": 10, "gainLossPercent": null},
                "sectors": [{"sectorName": "Misc", "portfolioPercent": null, "holdings": null}]}"#,
        )
        .unwrap();
        assert_eq!(doc.grand_total.investment, 10.0);
        assert_eq!(doc.grand_total.gain_loss_percent, 0.0);
        assert_eq!(doc.sectors[0].portfolio_percent, 0.0);
        assert!(doc.sectors[0].holdings.is_empty());
    }

    #[test]
    fn missing_fields_default() {
        let h: Holding = serde_json::from_str("{}").unwrap();
        assert_eq!(h, Holding::default());
    }

    #[test]
    fn reprice_recomputes_derived_values() {
        let mut h = Holding {
            qty: 10.0,
            investment: 1000.0,
            ..Holding::default()
        };
        h.reprice(90.0);
        assert_eq!(h.cmp, 90.0);
        assert_eq!(h.present_value, 900.0);
        assert_eq!(h.gain_loss, -100.0);
        assert_eq!(h.gain_loss_percent, -10.0);
    }

    #[test]
    fn reprice_is_not_cumulative() {
        let mut h = Holding {
            qty: 2.0,
            investment: 100.0,
            ..Holding::default()
        };
        h.reprice(60.0);
        h.reprice(60.0);
        assert_eq!(h.present_value, 120.0);
        assert_eq!(h.gain_loss, 20.0);
    }
}

// ── Sector / document ───────────────────────────────────────────────

mod document {
    use super::*;

    fn priced(symbol: &str, qty: f64, investment: f64, cmp: f64) -> Holding {
        let mut h = Holding {
            symbol: symbol.into(),
            qty,
            investment,
            ..Holding::default()
        };
        h.reprice(cmp);
        h
    }

    #[test]
    fn sector_totals_sum_holdings() {
        let mut s = Sector::new("Tech");
        s.holdings = vec![priced("A", 1.0, 100.0, 150.0), priced("B", 2.0, 100.0, 25.0)];
        s.recompute_totals();
        assert_eq!(s.investment, 200.0);
        assert_eq!(s.present_value, 200.0);
        assert_eq!(s.gain_loss, 0.0);
        assert_eq!(s.gain_loss_percent, 0.0);
    }

    #[test]
    fn symbols_are_distinct_and_ordered() {
        let mut a = Sector::new("A");
        a.holdings = vec![priced("INFY", 1.0, 1.0, 1.0), priced("TCS", 1.0, 1.0, 1.0)];
        let mut b = Sector::new("B");
        b.holdings = vec![priced("INFY", 1.0, 1.0, 1.0), priced("", 1.0, 1.0, 1.0)];
        let doc = HoldingsDocument {
            sectors: vec![a, b],
            ..HoldingsDocument::default()
        };
        assert_eq!(doc.symbols(), vec!["INFY", "TCS"]);
        assert_eq!(doc.holding_count(), 4);
    }

    #[test]
    fn grand_total_omits_absent_sale_price() {
        let gt = GrandTotal::default();
        let json = serde_json::to_value(&gt).unwrap();
        assert!(json.get("totalSalePrice").is_none());

        let gt = GrandTotal {
            total_sale_price: Some(12.5),
            ..GrandTotal::default()
        };
        assert_eq!(serde_json::to_value(&gt).unwrap()["totalSalePrice"], 12.5);
    }

    #[test]
    fn percent_of_guards_zero() {
        assert_eq!(percent_of(5.0, 0.0), 0.0);
        assert_eq!(percent_of(5.0, 20.0), 25.0);
    }
}

// ── Quote ───────────────────────────────────────────────────────────

mod quote {
    use super::*;

    #[test]
    fn serializes_camel_case_with_lowercase_source() {
        let json = serde_json::to_value(sample_quote("INFY", 1500.0)).unwrap();
        assert_eq!(json["symbol"], "INFY");
        assert_eq!(json["cmp"], 1500.0);
        assert_eq!(json["peRatio"], 28.5);
        assert_eq!(json["latestEarnings"], 52.3);
        assert_eq!(json["source"], "yahoo");
        assert_eq!(json["timestamp"], "2025-01-15T09:30:00Z");
    }

    #[test]
    fn as_cached_only_changes_source() {
        let q = sample_quote("INFY", 1500.0);
        let cached = q.as_cached();
        assert_eq!(cached.source, QuoteSource::Cache);
        assert_eq!(cached.cmp, q.cmp);
        assert_eq!(cached.timestamp, q.timestamp);
        assert_eq!(QuoteSource::Cache.to_string(), "cache");
    }

    #[test]
    fn cache_stats_json_shape() {
        let stats = CacheStats {
            stock_cache_size: 3,
            holdings_cached: true,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["stockCacheSize"], 3);
        assert_eq!(json["holdingsCached"], true);
    }

    #[test]
    fn batch_indexes_by_symbol() {
        let batch = BatchQuotes {
            quotes: vec![sample_quote("INFY", 1.0), sample_quote("TCS", 2.0)],
            errors: vec![SymbolError {
                symbol: "X".into(),
                message: "down".into(),
            }],
        };
        let index = batch.by_symbol();
        assert_eq!(index["TCS"].cmp, 2.0);
        assert!(!batch.all_failed());
    }
}

// ── QuoteCache ──────────────────────────────────────────────────────

mod cache {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fresh_until_ttl_then_stale_but_retained() {
        let mut cache = QuoteCache::new();
        cache.insert(sample_quote("INFY", 1.0));
        let ttl = Duration::from_secs(60);

        assert!(cache.get_fresh("INFY", ttl).is_some());
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(cache.get_fresh("INFY", ttl).is_none());
        assert!(cache.get("INFY").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn insert_overwrites() {
        let mut cache = QuoteCache::new();
        cache.insert(sample_quote("INFY", 1.0));
        cache.insert(sample_quote("INFY", 2.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("INFY").unwrap().quote.cmp, 2.0);
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let mut cache = QuoteCache::new();
        cache.insert(sample_quote("INFY", 1.0));
        cache.insert(sample_quote("TCS", 1.0));
        assert!(cache.remove("INFY"));
        assert!(!cache.remove("INFY"));
        assert!(cache.get("TCS").is_some());
        cache.clear();
        assert!(cache.is_empty());
    }
}
