//! Batch ingestion of uploaded transaction files
//!
//! One call reads a whole upload and runs every row through
//! parse → validate → build, then commits the built records in a single
//! database transaction:
//!
//! - [`parser`] turns CSV or XLSX bytes into [`RawRow`]s
//! - [`validate_row`] checks required columns are present
//! - [`builder`] coerces values and fills defaults (category via the categorizer)
//! - [`Database::commit_batch`] stores everything or nothing
//!
//! Bad rows never abort the batch. They are only counted in
//! [`BatchResult::failed`]; callers learn aggregate counts, not per-row detail.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::Result;
use crate::models::{BatchResult, NewTransaction, TransactionSource};

pub mod builder;
pub mod parser;

pub use builder::{build_record, parse_amount, parse_timestamp, ManualEntry};
pub use parser::{parse_rows, RowSource, EXCEL_HEADERS_MESSAGE};

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Xlsx => ".xlsx",
        }
    }

    /// Detect the format from a filename suffix (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        [Self::Csv, Self::Xlsx]
            .into_iter()
            .find(|format| format.matches_filename(filename))
    }

    pub fn matches_filename(&self, filename: &str) -> bool {
        filename.to_lowercase().ends_with(self.extension())
    }

    /// Columns a row must carry to be processed
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Csv => &["amount", "merchant"],
            Self::Xlsx => &["amount", "type", "merchant", "mode"],
        }
    }

    /// Source stamped on records ingested in this format
    pub fn source(&self) -> TransactionSource {
        match self {
            Self::Csv => TransactionSource::Csv,
            Self::Xlsx => TransactionSource::Excel,
        }
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            _ => Err(format!("Unsupported file format: {}", s)),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Xlsx => write!(f, "Excel"),
        }
    }
}

/// One parsed, unvalidated row keyed by column header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Why a single row was rejected. Counted, never returned to the uploader.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid transaction type: {0:?}")]
    InvalidType(String),

    #[error("invalid date: {0:?}")]
    InvalidDate(String),
}

/// Structural check: every required column must be a key of the row.
/// Values are checked later by the builder.
pub fn validate_row(row: &RawRow, required: &[&str]) -> std::result::Result<(), RowError> {
    match required.iter().find(|field| !row.contains(field)) {
        Some(field) => Err(RowError::MissingField(field.to_string())),
        None => Ok(()),
    }
}

/// Validate and build every row, keeping input order.
///
/// Returns the built records and the number of rejected rows.
pub fn prepare_batch<I>(
    rows: I,
    format: FileFormat,
    owner: &str,
    ingested_at: DateTime<Utc>,
) -> (Vec<NewTransaction>, usize)
where
    I: IntoIterator<Item = std::result::Result<RawRow, RowError>>,
{
    let required = format.required_fields();
    let source = format.source();

    let mut records = Vec::new();
    let mut failed = 0;

    for (index, row) in rows.into_iter().enumerate() {
        let built = row.and_then(|row| {
            validate_row(&row, required)?;
            build_record(&row, owner, source, ingested_at)
        });

        match built {
            Ok(record) => records.push(record),
            Err(e) => {
                // data rows start on line 2
                debug!(row = index + 2, error = %e, "Skipping row");
                failed += 1;
            }
        }
    }

    (records, failed)
}

/// Ingest an uploaded file for `owner`.
///
/// Fails with [`Error::Format`](crate::Error::Format) before any row is
/// processed when the file itself is unreadable, and with a storage error when
/// the commit fails, in which case nothing is persisted.
pub fn ingest(db: &Database, bytes: Vec<u8>, format: FileFormat, owner: &str) -> Result<BatchResult> {
    let ingested_at = Utc::now();
    let rows = parse_rows(bytes, format)?;
    let (records, failed) = prepare_batch(rows, format, owner, ingested_at);

    let created = db.commit_batch(&records)?;

    let result = BatchResult { created, failed };
    info!(
        format = %format,
        owner = owner,
        created = result.created,
        failed = result.failed,
        outcome = ?result.outcome(),
        "Ingestion complete"
    );

    Ok(result)
}
