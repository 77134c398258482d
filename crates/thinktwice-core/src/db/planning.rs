//! Bills, cards and budgets

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::{parse_column, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Bill, Budget, Card, NewBill, NewBudget, NewCard};

impl Database {
    pub fn create_bill(&self, user_id: &str, bill: &NewBill) -> Result<Bill> {
        bill.validate().map_err(Error::InvalidData)?;

        let id = Uuid::new_v4().to_string();
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO bills (id, user_id, name, amount, due_day, frequency, category, status, last_paid_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id,
                user_id,
                bill.name.trim(),
                bill.amount,
                bill.due_day,
                bill.frequency.as_str(),
                bill.category,
                bill.status.as_str(),
                bill.last_paid_date.map(|d| d.to_string()),
            ],
        )?;

        conn.query_row(
            &format!("SELECT {} FROM bills WHERE id = ?", BILL_COLUMNS),
            params![id],
            Self::row_to_bill,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Bill {}", id)))
    }

    pub fn list_bills(&self, user_id: &str) -> Result<Vec<Bill>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bills WHERE user_id = ? ORDER BY due_day, name",
            BILL_COLUMNS
        ))?;

        let bills = stmt
            .query_map(params![user_id], Self::row_to_bill)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bills)
    }

    fn row_to_bill(row: &rusqlite::Row) -> rusqlite::Result<Bill> {
        let frequency: String = row.get(5)?;
        let status: String = row.get(7)?;
        let last_paid: Option<String> = row.get(8)?;
        let created_at: String = row.get(9)?;
        Ok(Bill {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            amount: row.get(3)?,
            due_day: row.get(4)?,
            frequency: parse_column(5, &frequency)?,
            category: row.get(6)?,
            status: parse_column(7, &status)?,
            last_paid_date: last_paid
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            created_at: parse_datetime(&created_at),
        })
    }

    pub fn create_card(&self, user_id: &str, card: &NewCard) -> Result<Card> {
        card.validate().map_err(Error::InvalidData)?;

        let id = Uuid::new_v4().to_string();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // At most one primary card per user
        if card.is_primary {
            tx.execute(
                "UPDATE cards SET is_primary = 0 WHERE user_id = ?",
                params![user_id],
            )?;
        }

        tx.execute(
            r#"
            INSERT INTO cards (id, user_id, card_name, card_type, last_four_digits, bank_name,
                               credit_limit, expiry_date, is_primary, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id,
                user_id,
                card.card_name.trim(),
                card.card_type.as_str(),
                card.last_four_digits,
                card.bank_name,
                card.credit_limit,
                card.expiry_date,
                card.is_primary,
                card.status.as_str(),
            ],
        )?;

        let created = tx
            .query_row(
                &format!("SELECT {} FROM cards WHERE id = ?", CARD_COLUMNS),
                params![id],
                Self::row_to_card,
            )
            .optional()?;

        tx.commit()?;
        created.ok_or_else(|| Error::NotFound(format!("Card {}", id)))
    }

    pub fn list_cards(&self, user_id: &str) -> Result<Vec<Card>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM cards WHERE user_id = ? ORDER BY is_primary DESC, card_name",
            CARD_COLUMNS
        ))?;

        let cards = stmt
            .query_map(params![user_id], Self::row_to_card)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(cards)
    }

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let card_type: String = row.get(3)?;
        let status: String = row.get(9)?;
        let created_at: String = row.get(10)?;
        Ok(Card {
            id: row.get(0)?,
            user_id: row.get(1)?,
            card_name: row.get(2)?,
            card_type: parse_column(3, &card_type)?,
            last_four_digits: row.get(4)?,
            bank_name: row.get(5)?,
            credit_limit: row.get(6)?,
            expiry_date: row.get(7)?,
            is_primary: row.get(8)?,
            status: parse_column(9, &status)?,
            created_at: parse_datetime(&created_at),
        })
    }

    pub fn create_budget(&self, user_id: &str, budget: &NewBudget) -> Result<Budget> {
        budget.validate().map_err(Error::InvalidData)?;

        let id = Uuid::new_v4().to_string();
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (id, user_id, category, monthly_limit, alert_threshold, is_active)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                id,
                user_id,
                budget.category.trim(),
                budget.monthly_limit,
                budget.alert_threshold,
                budget.is_active,
            ],
        )?;

        conn.query_row(
            &format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS),
            params![id],
            Self::row_to_budget,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))
    }

    pub fn list_budgets(&self, user_id: &str) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_id = ? ORDER BY category",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![user_id], Self::row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
        let created_at: String = row.get(6)?;
        let updated_at: String = row.get(7)?;
        Ok(Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category: row.get(2)?,
            monthly_limit: row.get(3)?,
            alert_threshold: row.get(4)?,
            is_active: row.get(5)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }
}

const BILL_COLUMNS: &str = "id, user_id, name, amount, due_day, frequency, category, status, \
                            last_paid_date, created_at";

const CARD_COLUMNS: &str = "id, user_id, card_name, card_type, last_four_digits, bank_name, \
                            credit_limit, expiry_date, is_primary, status, created_at";

const BUDGET_COLUMNS: &str =
    "id, user_id, category, monthly_limit, alert_threshold, is_active, created_at, updated_at";
