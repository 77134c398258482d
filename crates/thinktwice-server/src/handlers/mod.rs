//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

use thinktwice_core::db::Database;
use tracing::warn;

pub mod audit;
pub mod auth;
pub mod import;
pub mod messaging;
pub mod planning;
pub mod transactions;

// Re-export all handlers for use in router
pub use audit::*;
pub use auth::*;
pub use import::*;
pub use messaging::*;
pub use planning::*;
pub use transactions::*;

/// GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

/// Audit a write that has already committed.
///
/// The write stands even if the audit insert fails, so the failure is only logged.
fn audit_committed(
    db: &Database,
    user_id: &str,
    action: &str,
    entity_type: &str,
    entity_id: Option<&str>,
    details: Option<&str>,
) {
    if let Err(e) = db.log_audit(Some(user_id), action, Some(entity_type), entity_id, details) {
        warn!(
            error = %e,
            action = action,
            entity_type = entity_type,
            "Failed to write audit entry"
        );
    }
}
