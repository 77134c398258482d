//! Server command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use thinktwice_core::messaging::{Messenger, TwilioMessenger};
use thinktwice_server::{ServerConfig, DEFAULT_TOKEN_TTL_HOURS};
use tracing::warn;

use super::open_db;

/// Build the server configuration from raw environment values.
///
/// An unset or empty secret falls back to a per-process random one.
pub fn server_config_from(
    jwt_secret: Option<String>,
    token_ttl_hours: Option<String>,
    allowed_origins: Option<String>,
) -> Result<ServerConfig> {
    let jwt_secret = match jwt_secret.filter(|s| !s.trim().is_empty()) {
        Some(secret) => secret,
        None => {
            warn!("THINKTWICE_JWT_SECRET not set; using a random secret, tokens will not survive a restart");
            ServerConfig::ephemeral_secret()
        }
    };

    let token_ttl_hours = match token_ttl_hours.filter(|s| !s.trim().is_empty()) {
        Some(raw) => {
            let hours: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid THINKTWICE_TOKEN_TTL_HOURS: {}", raw))?;
            if hours <= 0 {
                anyhow::bail!("THINKTWICE_TOKEN_TTL_HOURS must be positive");
            }
            hours
        }
        None => DEFAULT_TOKEN_TTL_HOURS,
    };

    let allowed_origins = allowed_origins
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(ServerConfig {
        allowed_origins,
        jwt_secret,
        token_ttl_hours,
    })
}

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, no_encrypt: bool) -> Result<()> {
    println!("🚀 Starting ThinkTwice web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let config = server_config_from(
        std::env::var("THINKTWICE_JWT_SECRET").ok(),
        std::env::var("THINKTWICE_TOKEN_TTL_HOURS").ok(),
        std::env::var("THINKTWICE_ALLOWED_ORIGINS").ok(),
    )?;

    println!(
        "   🔐 Authentication: bearer tokens ({}h lifetime)",
        config.token_ttl_hours
    );
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} (THINKTWICE_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }

    let messenger: Option<Arc<dyn Messenger>> = match TwilioMessenger::from_env() {
        Some(twilio) => {
            println!("   💬 WhatsApp alerts: enabled (from {})", twilio.sender());
            Some(Arc::new(twilio))
        }
        None => {
            println!("   💡 Tip: Set TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN for WhatsApp alerts");
            None
        }
    };

    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    thinktwice_server::serve_with_config(db, host, port, config, messenger).await?;

    Ok(())
}
