//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database setup (init) and shared utilities (open_db)
//! - `import` - Statement import (CSV, XLSX)
//! - `serve` - Web server command
//! - `transactions` - Transaction listing
//! - `users` - User registration and listing

pub mod core;
pub mod import;
pub mod serve;
pub mod transactions;
pub mod users;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use serve::*;
pub use transactions::*;
pub use users::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Look up a user by email, failing with a hint when they do not exist
pub fn require_user(
    db: &thinktwice_core::db::Database,
    email: &str,
) -> anyhow::Result<thinktwice_core::models::User> {
    db.get_user_by_email(email)?.ok_or_else(|| {
        anyhow::anyhow!(
            "No user with email {}. Register one with: thinktwice users add",
            email
        )
    })
}
