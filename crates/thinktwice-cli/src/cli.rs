//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ThinkTwice - Track where your money goes
#[derive(Parser)]
#[command(name = "thinktwice")]
#[command(about = "Personal finance tracker with statement import and WhatsApp alerts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "thinktwice.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set THINKTWICE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a CSV or XLSX statement for a user
    Import {
        /// Statement file (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Email of the user who owns the imported transactions
        #[arg(short, long)]
        user: String,

        /// File format: csv or xlsx (detected from the extension if not specified)
        #[arg(long)]
        format: Option<String>,
    },

    /// List a user's most recent transactions
    Transactions {
        /// Email of the user
        #[arg(short, long)]
        user: String,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List registered users
    List,

    /// Register a user
    Add {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login email
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Monthly income
        #[arg(long, default_value = "0")]
        monthly_income: f64,

        /// Income type (salaried, freelance, business...)
        #[arg(long, default_value = "salaried")]
        income_type: String,
    },
}
