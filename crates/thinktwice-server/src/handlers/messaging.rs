//! WhatsApp alert handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use thinktwice_core::messaging::{
    validate_message, validate_phone_number, whatsapp_address, Messenger,
};

use super::audit_committed;
use crate::{AppError, AppState, AuthUser};

fn messenger(state: &AppState) -> Result<&Arc<dyn Messenger>, AppError> {
    state
        .messenger
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("WhatsApp service is not available"))
}

#[derive(Serialize)]
pub struct WhatsappStatusResponse {
    pub available: bool,
    pub configured: bool,
    pub whatsapp_from: Option<String>,
}

/// GET /api/messaging/whatsapp/status
pub async fn whatsapp_status(State(state): State<Arc<AppState>>) -> Json<WhatsappStatusResponse> {
    let sender = state.messenger.as_ref().map(|m| m.sender().to_string());
    Json(WhatsappStatusResponse {
        available: sender.is_some(),
        configured: sender.is_some(),
        whatsapp_from: sender,
    })
}

#[derive(Debug, Deserialize)]
pub struct SendWhatsappRequest {
    #[serde(alias = "phoneNumber")]
    pub phone_number: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct SendWhatsappResponse {
    pub success: bool,
    pub message_sid: String,
    pub status: String,
    pub message: String,
}

/// POST /api/messaging/whatsapp
pub async fn send_whatsapp(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SendWhatsappRequest>,
) -> Result<Json<SendWhatsappResponse>, AppError> {
    let messenger = messenger(&state)?;

    let phone = body.phone_number.trim();
    if phone.is_empty() {
        return Err(AppError::bad_request("Phone number is required"));
    }
    validate_message(&body.message).map_err(|msg| AppError::bad_request(&msg))?;
    if !validate_phone_number(phone) {
        return Err(AppError::bad_request(
            "Phone number must include country code (e.g., +919876543210)",
        ));
    }

    let to = whatsapp_address(phone);
    let sent = messenger
        .send_whatsapp(&to, body.message.trim())
        .await
        .map_err(AppError::from_core)?;

    audit_committed(&state.db, &user.id, "send", "whatsapp", Some(&sent.sid), None);
    info!(user = %user.email, sid = %sent.sid, "WhatsApp message sent");

    Ok(Json(SendWhatsappResponse {
        success: true,
        message_sid: sent.sid,
        status: sent.status,
        message: "WhatsApp message sent successfully".to_string(),
    }))
}

#[derive(Serialize)]
pub struct TestWhatsappResponse {
    pub success: bool,
    pub message: String,
    pub account_status: String,
    pub whatsapp_from: String,
}

/// POST /api/messaging/whatsapp/test - provider connectivity check
pub async fn test_whatsapp(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<TestWhatsappResponse>, AppError> {
    let messenger = messenger(&state)?;

    let account = messenger
        .account_status()
        .await
        .map_err(|e| AppError::internal_with("Twilio connection failed", e))?;

    Ok(Json(TestWhatsappResponse {
        success: true,
        message: "Twilio connection successful".to_string(),
        account_status: account.status,
        whatsapp_from: messenger.sender().to_string(),
    }))
}
