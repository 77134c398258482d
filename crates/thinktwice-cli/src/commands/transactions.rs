//! Transaction command implementations

use anyhow::Result;
use thinktwice_core::db::Database;
use thinktwice_core::models::TransactionType;

use super::{require_user, truncate};

pub fn cmd_transactions_list(db: &Database, email: &str, limit: i64) -> Result<()> {
    let user = require_user(db, email)?;
    let transactions = db.list_transactions(&user.id, limit.max(1), 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  thinktwice import --file statement.csv --user {}", user.email);
        return Ok(());
    }

    let total = db.count_transactions(&user.id)?;

    println!();
    println!("📝 Recent Transactions ({} total)", total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.txn_type {
            TransactionType::Debit => format!("\x1b[31m-{:.2}\x1b[0m", tx.amount), // Red for debits
            TransactionType::Credit => format!("\x1b[32m+{:.2}\x1b[0m", tx.amount), // Green for credits
        };

        println!(
            "   {} │ {:>12} │ {:<14} │ {:<7} │ {}",
            tx.date.format("%Y-%m-%d"),
            amount_str,
            truncate(&tx.category, 14),
            tx.mode,
            truncate(&tx.merchant, 36)
        );
    }

    Ok(())
}
