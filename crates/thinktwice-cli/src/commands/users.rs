//! User command implementations

use anyhow::{Context, Result};
use thinktwice_core::auth::hash_password;
use thinktwice_core::db::Database;
use thinktwice_core::models::NewUser;
use tracing::warn;

pub fn cmd_users_add(
    db: &Database,
    name: &str,
    email: &str,
    password: &str,
    monthly_income: f64,
    income_type: &str,
) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Name is required");
    }
    if !email.contains('@') {
        anyhow::bail!("A valid email is required");
    }
    if !monthly_income.is_finite() || monthly_income < 0.0 {
        anyhow::bail!("--monthly-income must be a non-negative number");
    }

    let password_hash = hash_password(password)?;
    let user = db
        .create_user(&NewUser {
            name: name.trim().to_string(),
            email: email.to_string(),
            password_hash,
            monthly_income,
            income_type: income_type.to_string(),
        })
        .context("Failed to create user")?;

    if let Err(e) = db.log_audit(Some(&user.id), "signup", Some("user"), Some(&user.id), Some("cli")) {
        warn!("Failed to log user creation to audit: {}", e);
    }

    println!("✅ Created user {} <{}>", user.name, user.email);
    println!("   ID: {}", user.id);

    Ok(())
}

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with:");
        println!("  thinktwice users add --name Asha --email asha@example.com --password ...");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────────────────────────────────────");

    for user in users {
        let count = db.count_transactions(&user.id)?;
        println!(
            "   {:<28} │ {:<20} │ {:>6} transactions",
            user.email, user.name, count
        );
    }

    Ok(())
}
