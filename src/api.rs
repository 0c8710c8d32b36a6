//! REST API for a hashledger node
//!
//! Exposes the chain queries and the two submission paths (blocks and
//! transactions) over HTTP. All routes live under `/api`.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::blockchain::{BlockHeader, BlockRecord, ChainHead, GenesisScan, GrossReceipts};
use crate::error::{LedgerError, Result};
use crate::mempool::Mempool;
use crate::transaction::{validate_funds, Transaction};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub chain: Arc<ChainHead>,
    pub mempool: Arc<RwLock<Mempool>>,
    pub genesis_scan: GenesisScan,
}

impl ApiState {
    pub fn new_shared(chain: Arc<ChainHead>, mempool: Arc<RwLock<Mempool>>, genesis_scan: GenesisScan) -> Self {
        ApiState {
            chain,
            mempool,
            genesis_scan,
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Ledger(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct BlockSubmission {
    pub block: BlockPayload,
}

/// Transactions stay untyped until each one is checked, so a bad record is
/// reported with its position instead of as a generic body rejection.
#[derive(Deserialize)]
pub struct BlockPayload {
    pub header: BlockHeader,
    #[serde(default)]
    pub transactions: Vec<Value>,
}

#[derive(Deserialize)]
pub struct TransactionSubmission {
    pub transaction: Value,
}

#[derive(Serialize)]
pub struct BlockAccepted {
    pub message: String,
    pub hash: String,
    pub chain_length: usize,
}

#[derive(Serialize)]
pub struct TransactionAccepted {
    pub message: String,
    pub transaction_hash: String,
}

// ============================================================================
// Middleware
// ============================================================================

async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

pub fn build_api_router(state: Arc<ApiState>) -> Router {
    let api_routes = Router::new()
        .route("/block", get(get_chain).post(submit_block))
        .route("/transactions", post(submit_transaction))
        .route("/transactions/:hash", get(get_transaction))
        .route("/utxos/:identity", get(get_gross_receipts))
        .route("/mempool", get(get_mempool))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

pub async fn run_api_server(state: Arc<ApiState>, addr: SocketAddr) -> Result<()> {
    let app = build_api_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let head = state.chain.head();
    Json(serde_json::json!({
        "status": "healthy",
        "chain_length": head.chain_length(),
        "head_hash": head.hash(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_chain(State(state): State<Arc<ApiState>>) -> Json<Vec<BlockRecord>> {
    Json(state.chain.head().to_chain_export())
}

async fn submit_block(
    State(state): State<Arc<ApiState>>,
    Json(submission): Json<BlockSubmission>,
) -> std::result::Result<Json<BlockAccepted>, ApiError> {
    let BlockPayload { header, transactions } = submission.block;
    let transactions = transactions
        .into_iter()
        .enumerate()
        .map(|(index, record)| Transaction::from_record(index, record))
        .collect::<Result<Vec<_>>>()?;

    let block = state
        .chain
        .submit(BlockRecord { header, transactions })
        .map_err(|e| {
            warn!(error = %e, "Rejected block");
            e
        })?;

    let pruned = state.mempool.write().await.remove_included(&block);
    if pruned > 0 {
        info!(hash = %block.hash(), pruned, "Removed included transactions from mempool");
    }

    Ok(Json(BlockAccepted {
        message: "Block accepted".to_string(),
        hash: block.hash().to_string(),
        chain_length: block.chain_length(),
    }))
}

async fn submit_transaction(
    State(state): State<Arc<ApiState>>,
    Json(submission): Json<TransactionSubmission>,
) -> std::result::Result<Json<TransactionAccepted>, ApiError> {
    let tx = Transaction::from_record(0, submission.transaction)?;
    let head = state.chain.head();
    if let Err(e) = validate_funds(&head, &tx) {
        warn!(error = %e, "Rejected transaction");
        return Err(e.into());
    }

    let transaction_hash = state.mempool.write().await.add(tx)?;
    info!(%transaction_hash, "Transaction admitted to mempool");

    Ok(Json(TransactionAccepted {
        message: "Transaction accepted".to_string(),
        transaction_hash,
    }))
}

async fn get_transaction(
    State(state): State<Arc<ApiState>>,
    Path(hash): Path<String>,
) -> std::result::Result<Json<Transaction>, ApiError> {
    let head = state.chain.head();
    if let Some(tx) = head.find_transaction_with(&hash, state.genesis_scan) {
        return Ok(Json(tx.clone()));
    }

    if let Some(tx) = state.mempool.read().await.get(&hash) {
        return Ok(Json(tx.clone()));
    }

    Err(ApiError::NotFound(format!("Transaction {} not found", hash)))
}

async fn get_gross_receipts(State(state): State<Arc<ApiState>>, Path(identity): Path<String>) -> Json<GrossReceipts> {
    Json(state.chain.head().gross_receipts_with(&identity, state.genesis_scan))
}

async fn get_mempool(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let mempool = state.mempool.read().await;
    Json(serde_json::json!({
        "count": mempool.len(),
        "transactions": mempool.transactions()
    }))
}
