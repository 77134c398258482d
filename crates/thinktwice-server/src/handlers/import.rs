//! CSV and XLSX upload handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use thinktwice_core::import::{ingest, FileFormat};

use super::audit_committed;
use crate::{AppError, AppState, AuthUser, MAX_UPLOAD_SIZE};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub created: usize,
    pub failed: usize,
}

/// Client-facing messages for one upload route
struct UploadMessages {
    missing: &'static str,
    wrong_extension: &'static str,
    done: &'static str,
}

const CSV_MESSAGES: UploadMessages = UploadMessages {
    missing: "CSV file is required",
    wrong_extension: "Only CSV files allowed",
    done: "CSV processed",
};

const EXCEL_MESSAGES: UploadMessages = UploadMessages {
    missing: "Excel file is required",
    wrong_extension: "Only .xlsx files are supported",
    done: "Excel processed",
};

/// POST /api/transactions/upload
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    upload(&state, &user, multipart, FileFormat::Csv, &CSV_MESSAGES).await
}

/// POST /api/transactions/upload-excel
pub async fn upload_excel(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    upload(&state, &user, multipart, FileFormat::Xlsx, &EXCEL_MESSAGES).await
}

/// Read the `file` part of a multipart form as (filename, bytes).
///
/// Other parts are drained and ignored.
async fn read_file_part(
    multipart: &mut Multipart,
) -> Result<Option<(String, Vec<u8>)>, AppError> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") || file.is_some() {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        file = Some((filename, bytes.to_vec()));
    }

    Ok(file)
}

async fn upload(
    state: &AppState,
    user: &AuthUser,
    mut multipart: Multipart,
    format: FileFormat,
    messages: &UploadMessages,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let (filename, bytes) = read_file_part(&mut multipart)
        .await?
        .ok_or_else(|| AppError::bad_request(messages.missing))?;

    if filename.trim().is_empty() {
        return Err(AppError::bad_request("No selected file"));
    }
    if !format.matches_filename(&filename) {
        return Err(AppError::bad_request(messages.wrong_extension));
    }

    let result = ingest(&state.db, bytes, format, &user.id).map_err(|e| {
        if e.is_storage() {
            AppError::internal_with("Upload failed: storage error", e)
        } else {
            AppError::from_core(e)
        }
    })?;

    audit_committed(
        &state.db,
        &user.id,
        "upload",
        "transactions",
        None,
        Some(&format!(
            "file={} format={} created={} failed={}",
            filename, format, result.created, result.failed
        )),
    );
    info!(
        user = %user.email,
        file = %filename,
        created = result.created,
        failed = result.failed,
        "Processed upload"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: messages.done.to_string(),
            created: result.created,
            failed: result.failed,
        }),
    ))
}
