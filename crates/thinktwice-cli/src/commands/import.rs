//! Statement import command

use std::path::Path;

use anyhow::{Context, Result};
use thinktwice_core::db::Database;
use thinktwice_core::import::{ingest, FileFormat};
use thinktwice_core::BatchOutcome;
use tracing::warn;

use super::require_user;

pub fn cmd_import(db: &Database, file: &Path, email: &str, format: Option<&str>) -> Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let format: FileFormat = match format {
        Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => FileFormat::from_filename(filename).ok_or_else(|| {
            anyhow::anyhow!(
                "Could not detect file format from {}.\n\
                 Use a .csv or .xlsx file, or pass --format csv|xlsx",
                file.display()
            )
        })?,
    };

    let user = require_user(db, email)?;
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;

    println!("📥 Importing {} from {}...", format, file.display());

    let result = ingest(db, bytes, format, &user.id)?;

    // rows are already committed; a failed audit write must not report the import as failed
    if let Err(e) = db.log_audit(
        Some(&user.id),
        "import",
        Some("transactions"),
        None,
        Some(&format!(
            "file={} format={} created={} failed={}",
            filename, format, result.created, result.failed
        )),
    ) {
        warn!("Failed to log import to audit: {}", e);
    }

    println!("   ✓ Created: {}", result.created);
    if result.failed > 0 {
        println!("   ✗ Failed:  {} (rows with missing or invalid values)", result.failed);
    }

    match result.outcome() {
        BatchOutcome::FullSuccess => println!("✅ Import complete!"),
        BatchOutcome::PartialSuccess => println!("⚠️  Import finished with rejected rows"),
        BatchOutcome::AllFailed => println!("❌ No rows could be imported"),
    }

    Ok(())
}
