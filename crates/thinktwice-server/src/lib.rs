//! ThinkTwice Web Server
//!
//! Axum-based REST API for the ThinkTwice personal finance tracker.
//!
//! Security features:
//! - Bearer token (JWT) authentication on every route except health, signup,
//!   login and the messaging status check
//! - Restrictive CORS policy
//! - Input validation (pagination limits, file size limits)
//! - Audit logging for writes
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use thinktwice_core::db::Database;
use thinktwice_core::messaging::{classify_provider_error, Messenger, ProviderFailure};

pub mod auth;
mod handlers;

pub use auth::{issue_token, verify_token, AuthUser, Claims};

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// HMAC secret for signing bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    /// Random per-process secret. Tokens stop validating after a restart.
    pub fn ephemeral_secret() -> String {
        format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            jwt_secret: Self::ephemeral_secret(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// WhatsApp sender; `None` when credentials are not configured
    pub messenger: Option<Arc<dyn Messenger>>,
}

/// Create the application router
pub fn create_router(
    db: Database,
    config: ServerConfig,
    messenger: Option<Arc<dyn Messenger>>,
) -> Router {
    if messenger.is_none() {
        info!("ℹ️  WhatsApp messaging not configured (set TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN)");
    }

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        messenger,
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route(
            "/messaging/whatsapp/status",
            get(handlers::whatsapp_status),
        );

    let upload_routes = Router::new()
        .route("/transactions/upload", post(handlers::upload_csv))
        .route("/transactions/upload-excel", post(handlers::upload_excel))
        // room for multipart framing around a max-size file
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024));

    let protected_routes = Router::new()
        .route("/me", get(handlers::get_me))
        // Transactions
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/manual", post(handlers::add_manual_transaction))
        .merge(upload_routes)
        // Planning
        .route(
            "/bills",
            get(handlers::list_bills).post(handlers::create_bill),
        )
        .route(
            "/cards",
            get(handlers::list_cards).post(handlers::create_card),
        )
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        // Audit
        .route("/audit", get(handlers::list_audit_log))
        // Messaging
        .route("/messaging/whatsapp", post(handlers::send_whatsapp))
        .route("/messaging/whatsapp/test", post(handlers::test_whatsapp))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
    messenger: Option<Arc<dyn Messenger>>,
) -> anyhow::Result<()> {
    if let Some(ref m) = messenger {
        match m.account_status().await {
            Ok(status) => info!("✅ Twilio connected (account status: {})", status.status),
            Err(e) => warn!("⚠️  Twilio configured but not responding: {}", e),
        }
    }

    let app = create_router(db, config, messenger);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: &str) -> Self {
        Self::with_status(StatusCode::CONFLICT, msg)
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self::with_status(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Map a core error to a status. Storage and other server faults keep a
    /// generic public message and log the detail.
    pub fn from_core(err: thinktwice_core::Error) -> Self {
        use thinktwice_core::Error;

        match err {
            Error::Format(msg) | Error::InvalidData(msg) => Self::bad_request(&msg),
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::Conflict(msg) => Self::conflict(&msg),
            Error::Auth(msg) => Self::unauthorized(&msg),
            Error::Messaging(msg) => match classify_provider_error(&msg) {
                ProviderFailure::InvalidRecipient => Self::bad_request(
                    "The phone number is not registered for WhatsApp. Please verify the number.",
                ),
                ProviderFailure::NotAuthorized => {
                    Self::forbidden("Twilio account is not authorized for this operation")
                }
                ProviderFailure::Other => Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("Twilio error: {}", msg),
                    internal: None,
                },
            },
            other => Self::from(other),
        }
    }

    /// Attach a public message to a server-side failure, logging the cause
    pub fn internal_with(msg: &str, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: Some(err.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
