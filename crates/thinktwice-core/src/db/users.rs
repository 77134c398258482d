//! User account operations

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, monthly_income, income_type, created_at";

impl Database {
    /// Register a user. Emails are stored lower-cased and must be unique.
    pub fn create_user(&self, user: &NewUser) -> Result<User> {
        let email = user.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(Error::InvalidData("Email is required".into()));
        }

        if self.get_user_by_email(&email)?.is_some() {
            return Err(Error::Conflict(format!("User {} already exists", email)));
        }

        let id = Uuid::new_v4().to_string();
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO users (id, name, email, password_hash, monthly_income, income_type)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                id,
                user.name,
                email,
                user.password_hash,
                user.monthly_income,
                user.income_type,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Conflict(format!("User {} already exists", email))
            }
            other => Error::Database(other),
        })?;

        self.get_user(&id)?
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))
    }

    /// Look up a user by email (case-insensitive)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![email.trim().to_lowercase()], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![id], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM users ORDER BY created_at, email", USER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(6)?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            monthly_income: row.get(4)?,
            income_type: row.get(5)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
