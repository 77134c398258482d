//! Transaction operations

use rusqlite::params;
use tracing::debug;

use super::{format_datetime, parse_column, parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

const INSERT_SQL: &str = r#"
    INSERT INTO transactions (id, user_id, amount, txn_type, category, merchant, mode, source, date)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

fn insert(conn: &rusqlite::Connection, tx: &NewTransaction) -> rusqlite::Result<usize> {
    conn.execute(
        INSERT_SQL,
        params![
            tx.id,
            tx.user_id,
            tx.amount,
            tx.txn_type.as_str(),
            tx.category,
            tx.merchant,
            tx.mode.as_str(),
            tx.source.as_str(),
            format_datetime(&tx.date),
        ],
    )
}

impl Database {
    /// Insert a single transaction
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<String> {
        let conn = self.conn()?;
        insert(&conn, tx)?;
        Ok(tx.id.clone())
    }

    /// Persist a batch of built records as one unit.
    ///
    /// All rows are staged in a single SQLite transaction. If any insert or the
    /// commit fails the transaction rolls back on drop and nothing is visible.
    pub fn commit_batch(&self, records: &[NewTransaction]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for record in records {
            insert(&tx, record)?;
        }

        tx.commit()?;
        debug!(count = records.len(), "Committed transaction batch");
        Ok(records.len())
    }

    /// List a user's transactions, newest first
    pub fn list_transactions(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, amount, txn_type, category, merchant, mode, source, date, created_at
            FROM transactions
            WHERE user_id = ?
            ORDER BY date DESC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )?;

        let transactions = stmt
            .query_map(params![user_id, limit, offset], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count a user's transactions
    pub fn count_transactions(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let txn_type: String = row.get(3)?;
        let mode: String = row.get(6)?;
        let source: String = row.get(7)?;
        let date: String = row.get(8)?;
        let created_at: String = row.get(9)?;
        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            txn_type: parse_column(3, &txn_type)?,
            category: row.get(4)?,
            merchant: row.get(5)?,
            mode: parse_column(6, &mode)?,
            source: parse_column(7, &source)?,
            date: parse_datetime(&date),
            created_at: parse_datetime(&created_at),
        })
    }
}
