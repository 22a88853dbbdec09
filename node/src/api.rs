//! # REST API
//!
//! Builds the axum router that exposes the vault service's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                               | Description                         |
//! |--------|------------------------------------|-------------------------------------|
//! | GET    | `/`                                | Service banner and endpoint map     |
//! | GET    | `/health`                          | Liveness probe                      |
//! | GET    | `/vaults`                          | Vault summaries                     |
//! | GET    | `/vaults/:vault_id/bars`           | Filtered, paginated bar records     |
//! | GET    | `/vaults/:vault_id/vault_reserve`  | Reserve summary with fallback       |
//! | GET    | `/contract/vault-ounces`           | `vaultOunces()`                     |
//! | GET    | `/contract/current-rate`           | `currentRate()`                     |
//! | GET    | `/contract/fee-accumulator`        | `feeAccumulator()`                  |
//! | GET    | `/contract/collected-fees`         | All three fee counters              |
//! | GET    | `/contract/info`                   | Configured contract parameters      |
//! | GET    | `/api-docs`                        | OpenAPI 3.0 document                |

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    handler::Handler,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use aurum_contracts::{
    CollectedFees, ContractConfig, ContractError, FeeAccumulator, TokenAmount, VaultFaucet,
};
use aurum_ledger::{query, BarDataset, BarPage, BarQuery, LedgerError, OunceFeed};
use aurum_ledger::{ReserveAggregator, VaultReserve, VaultSummary};

use crate::metrics::SharedMetrics;
use crate::openapi;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Built-in bar records, immutable after startup.
    pub dataset: Arc<BarDataset>,
    /// Reserve summaries and their placeholder randomness.
    pub reserves: Arc<ReserveAggregator>,
    /// Reader for the reserve contract.
    pub faucet: Arc<VaultFaucet>,
    /// Echoed by `/contract/info`.
    pub contract: Arc<ContractConfig>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, tracing and
/// panic recovery.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get_only(banner_handler))
        .route("/health", get_only(health_handler))
        .route("/vaults", get_only(vaults_handler))
        .route("/vaults/:vault_id/bars", get_only(vault_bars_handler))
        .route("/vaults/:vault_id/vault_reserve", get_only(vault_reserve_handler))
        .route("/contract/vault-ounces", get_only(vault_ounces_handler))
        .route("/contract/current-rate", get_only(current_rate_handler))
        .route("/contract/fee-accumulator", get_only(fee_accumulator_handler))
        .route("/contract/collected-fees", get_only(collected_fees_handler))
        .route("/contract/info", get_only(contract_info_handler))
        .route("/api-docs", get_only(api_docs_handler))
        .fallback(route_not_found)
        .with_state(state);

    with_middleware(router)
}

/// A GET route whose other methods fall through to the 404 handler instead
/// of axum's empty 405.
fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).fallback(route_not_found)
}

/// Wraps `router` in the CORS, trace and catch-panic layers.
fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(AnyOrigin);

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures a handler can surface to the client.
#[derive(Debug)]
pub enum ApiError {
    /// Unknown vault. 404 with the id echoed.
    VaultNotFound(String),
    /// A contract read failed. 500 with a per-endpoint message and the
    /// underlying error text.
    ContractRead {
        context: &'static str,
        source: ContractError,
    },
    /// Anything else. 500 with a generic body; details only go to the log.
    Internal(String),
}

impl ApiError {
    fn contract(context: &'static str) -> impl FnOnce(ContractError) -> ApiError {
        move |source| ApiError::ContractRead { context, source }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::VaultNotFound(id) => ApiError::VaultNotFound(id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::VaultNotFound(vault_id) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Vault not found", "vault_id": vault_id })),
            )
                .into_response(),
            ApiError::ContractRead { context, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": context, "message": source.to_string() })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "unhandled error");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Something went wrong!" })),
    )
        .into_response()
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    internal_error()
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response for `GET /vaults`.
#[derive(Debug, Serialize)]
pub struct VaultListResponse {
    pub total_vaults: usize,
    pub vaults: Vec<VaultSummary>,
}

// ---------------------------------------------------------------------------
// Metered Feed
// ---------------------------------------------------------------------------

/// Feeds the reserve aggregator from the contract while recording the read
/// in the service metrics.
struct MeteredFeed<'a> {
    faucet: &'a VaultFaucet,
    metrics: &'a SharedMetrics,
}

#[async_trait]
impl OunceFeed for MeteredFeed<'_> {
    async fn total_ounces(&self) -> anyhow::Result<String> {
        self.metrics
            .observe_contract_read(self.faucet.total_ounces())
            .await
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /`: service banner with a map of the main endpoints.
async fn banner_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to Mock Vault API",
        "status": "running",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "endpoints": {
            "vaults": "/vaults",
            "vault_bars": "/vaults/:vault_id/bars",
            "vault_reserve": "/vaults/:vault_id/vault_reserve",
            "contract_vault_ounces": "/contract/vault-ounces",
            "contract_info": "/contract/info",
            "health": "/health",
            "swagger": "/api-docs"
        }
    }))
}

/// `GET /health`: returns 200 while the process is serving.
///
/// Does not touch the contract; an unreachable RPC endpoint is not a
/// liveness failure.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

async fn vaults_handler(State(state): State<AppState>) -> Json<VaultListResponse> {
    let vaults = query::list_vaults(&state.dataset);
    Json(VaultListResponse {
        total_vaults: vaults.len(),
        vaults,
    })
}

/// `GET /vaults/:vault_id/bars`: bars passing every supplied filter.
///
/// The query string is read as raw pairs so an odd or repeated key only
/// affects itself.
async fn vault_bars_handler(
    Path(vault_id): Path<String>,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BarPage>, ApiError> {
    state.metrics.bar_queries_total.inc();
    let params = BarQuery::from_pairs(pairs);
    let page = query::vault_bars(&state.dataset, &vault_id, &params)?;
    Ok(Json(page))
}

/// `GET /vaults/:vault_id/vault_reserve`: reserve summary, synthesized when
/// the contract cannot be read.
async fn vault_reserve_handler(
    Path(vault_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<VaultReserve>, ApiError> {
    let feed = MeteredFeed {
        faucet: &state.faucet,
        metrics: &state.metrics,
    };
    let summary = state.reserves.vault_reserve(&vault_id, &feed).await?;
    if !summary.reserve.is_live() {
        state.metrics.reserve_fallbacks_total.inc();
    }
    Ok(Json(summary))
}

async fn vault_ounces_handler(State(state): State<AppState>) -> Result<Json<TokenAmount>, ApiError> {
    let amount = state
        .metrics
        .observe_contract_read(state.faucet.vault_ounces())
        .await
        .map_err(ApiError::contract("Failed to read vault ounces from contract"))?;
    Ok(Json(amount))
}

async fn current_rate_handler(State(state): State<AppState>) -> Result<Json<TokenAmount>, ApiError> {
    let rate = state
        .metrics
        .observe_contract_read(state.faucet.current_rate())
        .await
        .map_err(ApiError::contract("Failed to read current rate from contract"))?;
    Ok(Json(rate))
}

async fn fee_accumulator_handler(
    State(state): State<AppState>,
) -> Result<Json<FeeAccumulator>, ApiError> {
    let accumulator = state
        .metrics
        .observe_contract_read(state.faucet.fee_accumulator())
        .await
        .map_err(ApiError::contract("Failed to read fee accumulator from contract"))?;
    Ok(Json(accumulator))
}

async fn collected_fees_handler(
    State(state): State<AppState>,
) -> Result<Json<CollectedFees>, ApiError> {
    let fees = state
        .metrics
        .observe_contract_read(state.faucet.collected_fees())
        .await
        .map_err(ApiError::contract("Failed to read collected fees from contract"))?;
    Ok(Json(fees))
}

/// `GET /contract/info`: static configuration, no chain access.
async fn contract_info_handler(State(state): State<AppState>) -> Json<ContractConfig> {
    Json(state.contract.as_ref().clone())
}

async fn api_docs_handler() -> Json<serde_json::Value> {
    Json(openapi::document())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
