//! ThinkTwice Core Library
//!
//! Shared functionality for the ThinkTwice personal finance tracker:
//! - Database access and migrations
//! - Batch ingestion of CSV and XLSX transaction uploads
//! - Keyword-based expense categorization
//! - Password hashing
//! - WhatsApp alerts behind an injectable messenger

pub mod auth;
pub mod categorizer;
pub mod db;
pub mod error;
pub mod import;
pub mod messaging;
pub mod models;

/// Test utilities including a recording messenger
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorizer::{categorize, CATEGORY_RULES, OTHER, UNCATEGORIZED};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use import::{ingest, FileFormat, ManualEntry, RawRow, RowError};
pub use messaging::{Messenger, TwilioMessenger};
pub use models::{BatchOutcome, BatchResult};
