//! Signup, login and current-user handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use thinktwice_core::auth::{hash_password, verify_password};
use thinktwice_core::models::NewUser;

use super::audit_committed;
use crate::{issue_token, AppError, AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub monthly_income: f64,
    #[serde(default = "default_income_type")]
    pub income_type: String,
}

fn default_income_type() -> String {
    "salaried".to_string()
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub id: String,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    if !body.email.contains('@') {
        return Err(AppError::bad_request("A valid email is required"));
    }
    if !body.monthly_income.is_finite() || body.monthly_income < 0.0 {
        return Err(AppError::bad_request("monthly_income must be a non-negative number"));
    }

    let password_hash = hash_password(&body.password).map_err(AppError::from_core)?;

    let user = state
        .db
        .create_user(&NewUser {
            name: body.name.trim().to_string(),
            email: body.email,
            password_hash,
            monthly_income: body.monthly_income,
            income_type: body.income_type,
        })
        .map_err(AppError::from_core)?;

    audit_committed(&state.db, &user.id, "signup", "user", Some(&user.id), None);
    info!(user = %user.email, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created".to_string(),
            id: user.id,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: LoginUser,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .db
        .get_user_by_email(&body.email)?
        .filter(|user| verify_password(&body.password, &user.password_hash))
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let access_token = issue_token(
        &user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;

    state
        .db
        .log_audit(Some(&user.id), "login", Some("user"), Some(&user.id), None)?;

    Ok(Json(LoginResponse {
        access_token,
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub monthly_income: f64,
    pub income_type: String,
}

/// GET /api/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state
        .db
        .get_user(&auth.id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(MeResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        monthly_income: user.monthly_income,
        income_type: user.income_type,
    }))
}
