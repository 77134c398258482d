//! Transaction listing and manual entry handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use thinktwice_core::import::{build_record, ManualEntry};
use thinktwice_core::models::{Transaction, TransactionSource};

use super::audit_committed;
use crate::{AppError, AppState, AuthUser, MAX_PAGE_LIMIT};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/transactions - the caller's transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, AppError> {
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let transactions = state.db.list_transactions(&user.id, limit, offset)?;
    let total = state.db.count_transactions(&user.id)?;

    Ok(Json(TransactionListResponse {
        transactions,
        total,
        limit,
        offset,
    }))
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

/// POST /api/transactions/manual
///
/// Runs the same coercions as an uploaded row, with source MANUAL.
pub async fn add_manual_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(entry): Json<ManualEntry>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let record = build_record(
        &entry.into_row(),
        &user.id,
        TransactionSource::Manual,
        Utc::now(),
    )
    .map_err(|e| AppError::bad_request(&format!("Invalid transaction: {}", e)))?;

    let id = state.db.insert_transaction(&record)?;

    audit_committed(
        &state.db,
        &user.id,
        "create",
        "transaction",
        Some(&id),
        Some(&format!("source=MANUAL category={}", record.category)),
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Transaction added".to_string(),
            id,
        }),
    ))
}
