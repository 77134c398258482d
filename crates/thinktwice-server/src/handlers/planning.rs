//! Bills, cards and budgets handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use thinktwice_core::models::{Bill, Budget, Card, NewBill, NewBudget, NewCard};

use super::audit_committed;
use crate::{AppError, AppState, AuthUser};

/// GET /api/bills
pub async fn list_bills(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Bill>>, AppError> {
    Ok(Json(state.db.list_bills(&user.id)?))
}

/// POST /api/bills
pub async fn create_bill(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewBill>,
) -> Result<(StatusCode, Json<Bill>), AppError> {
    let bill = state
        .db
        .create_bill(&user.id, &body)
        .map_err(AppError::from_core)?;

    audit_committed(&state.db, &user.id, "create", "bill", Some(&bill.id), None);

    Ok((StatusCode::CREATED, Json(bill)))
}

/// GET /api/cards
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Card>>, AppError> {
    Ok(Json(state.db.list_cards(&user.id)?))
}

/// POST /api/cards
pub async fn create_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewCard>,
) -> Result<(StatusCode, Json<Card>), AppError> {
    let card = state
        .db
        .create_card(&user.id, &body)
        .map_err(AppError::from_core)?;

    audit_committed(&state.db, &user.id, "create", "card", Some(&card.id), None);

    Ok((StatusCode::CREATED, Json(card)))
}

/// GET /api/budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Budget>>, AppError> {
    Ok(Json(state.db.list_budgets(&user.id)?))
}

/// POST /api/budgets
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewBudget>,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let budget = state
        .db
        .create_budget(&user.id, &body)
        .map_err(AppError::from_core)?;

    audit_committed(
        &state.db,
        &user.id,
        "create",
        "budget",
        Some(&budget.id),
        Some(&format!("category={}", budget.category)),
    );

    Ok((StatusCode::CREATED, Json(budget)))
}
