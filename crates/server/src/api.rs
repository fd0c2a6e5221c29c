use std::{any::Any, sync::Arc};

use axum::{
    error_handling::HandleErrorLayer,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use portfolio_dashboard_core::models::{
    portfolio::LivePortfolio,
    quote::{CacheStats, Quote, SymbolError},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::{
    timeout::{error::Elapsed, TimeoutLayer},
    BoxError, ServiceBuilder,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

// ── Envelopes ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> DataResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            timestamp: Utc::now(),
        })
    }
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub data: Vec<Quote>,
    pub errors: Vec<SymbolError>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            timestamp: Utc::now(),
        })
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime: f64,
    pub environment: String,
}

#[derive(Deserialize)]
struct StocksQuery {
    symbols: Option<String>,
}

fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Split a comma-separated symbol list; blanks are dropped.
fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_symbol)
        .filter(|s| !s.is_empty())
        .collect()
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        uptime: state.uptime(),
        environment: state.environment.clone(),
    })
}

async fn get_holdings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DataResponse<Arc<Value>>>> {
    let holdings = state
        .dashboard
        .get_holdings()
        .await
        .map_err(ApiError::Holdings)?;
    Ok(DataResponse::ok(holdings))
}

async fn get_portfolio(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DataResponse<LivePortfolio>>> {
    let portfolio = state
        .dashboard
        .get_live_portfolio()
        .await
        .map_err(ApiError::Holdings)?;
    Ok(DataResponse::ok(portfolio))
}

async fn get_stock(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DataResponse<Quote>>> {
    let quote = state.dashboard.get_quote(&normalize_symbol(&symbol)).await?;
    Ok(DataResponse::ok(quote))
}

async fn get_stocks(
    Query(query): Query<StocksQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BatchResponse>> {
    let symbols = query
        .symbols
        .as_deref()
        .map(parse_symbol_list)
        .unwrap_or_default();
    if symbols.is_empty() {
        return Err(ApiError::InvalidParams(
            "symbols query parameter is required (comma-separated)".into(),
        ));
    }

    let batch = state.dashboard.get_quotes(&symbols).await;
    if batch.all_failed() {
        return Err(ApiError::StocksFetch(format!(
            "Failed to fetch stock data for {}",
            symbols.join(", ")
        )));
    }
    Ok(Json(BatchResponse {
        success: true,
        data: batch.quotes,
        errors: batch.errors,
        timestamp: Utc::now(),
    }))
}

async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<DataResponse<CacheStats>> {
    DataResponse::ok(state.dashboard.cache_stats().await)
}

async fn clear_caches(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.dashboard.clear_all_caches().await;
    tracing::info!("all caches cleared");
    MessageResponse::ok("All caches cleared")
}

async fn clear_stock_cache(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<MessageResponse> {
    let symbol = normalize_symbol(&symbol);
    let existed = state.dashboard.clear_quote(&symbol).await;
    tracing::info!(symbol = %symbol, existed, "quote cache cleared");
    MessageResponse::ok(format!("Cache cleared for {symbol}"))
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

// ── Router ──────────────────────────────────────────────────────────

async fn middleware_error(method: Method, uri: Uri, err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout {
            method: method.to_string(),
            path: uri.path().to_string(),
        }
    } else {
        ApiError::Internal(format!("Unhandled middleware error: {err}"))
    }
}

fn panic_response(expose: bool) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |panic: Box<dyn Any + Send + 'static>| {
        let detail = panic
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(panic = %detail, "handler panicked");
        let message = if expose {
            detail
        } else {
            "Internal server error".to_string()
        };
        ApiError::Internal(message).into_response()
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allow
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new()
        .route("/holdings", get(get_holdings))
        .route("/portfolio", get(get_portfolio))
        .route("/stocks", get(get_stocks))
        .route("/stocks/{symbol}", get(get_stock))
        .route("/cache/stats", get(cache_stats))
        .route("/cache", delete(clear_caches))
        .route("/cache/stocks/{symbol}", delete(clear_stock_cache));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response(!config.is_production())))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(middleware_error))
                .layer(TimeoutLayer::new(config.request_timeout)),
        )
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}
