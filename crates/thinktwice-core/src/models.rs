//! Domain models for ThinkTwice

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Credit,
    #[default]
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    Upi,
    Card,
    Cash,
    #[default]
    Unknown,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Card => "CARD",
            Self::Cash => "CASH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UPI" => Ok(Self::Upi),
            "CARD" => Ok(Self::Card),
            "CASH" => Ok(Self::Cash),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(format!("Unknown payment mode: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ingestion path a transaction came through. Set by the caller, never read from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionSource {
    Manual,
    Csv,
    Excel,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Csv => "CSV",
            Self::Excel => "EXCEL",
        }
    }
}

impl std::str::FromStr for TransactionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MANUAL" => Ok(Self::Manual),
            "CSV" => Ok(Self::Csv),
            "EXCEL" => Ok(Self::Excel),
            _ => Err(format!("Unknown transaction source: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub txn_type: TransactionType,
    pub category: String,
    pub merchant: String,
    pub mode: PaymentMode,
    pub source: TransactionSource,
    /// When the money moved (defaults to ingestion time)
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A fully built transaction waiting to be committed
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub txn_type: TransactionType,
    pub category: String,
    pub merchant: String,
    pub mode: PaymentMode,
    pub source: TransactionSource,
    pub date: DateTime<Utc>,
}

/// Aggregate counts for one ingestion call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchResult {
    pub created: usize,
    pub failed: usize,
}

/// Terminal state of an ingestion call that reached the commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    AllFailed,
    PartialSuccess,
    FullSuccess,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.created + self.failed
    }

    /// An empty batch counts as a full success since nothing failed
    pub fn outcome(&self) -> BatchOutcome {
        if self.failed == 0 {
            BatchOutcome::FullSuccess
        } else if self.created == 0 {
            BatchOutcome::AllFailed
        } else {
            BatchOutcome::PartialSuccess
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub monthly_income: f64,
    pub income_type: String,
    pub created_at: DateTime<Utc>,
}

/// A user about to be created
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub monthly_income: f64,
    pub income_type: String,
}

/// How often a bill recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillFrequency {
    #[default]
    Monthly,
    Quarterly,
    Annual,
}

impl BillFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

impl std::str::FromStr for BillFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(format!("Unknown bill frequency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl std::str::FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            _ => Err(format!("Unknown bill status: {}", s)),
        }
    }
}

/// A recurring bill (electricity, water, insurance...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    /// Day of month the bill is due (1-31)
    pub due_day: u32,
    pub frequency: BillFrequency,
    pub category: Option<String>,
    pub status: BillStatus,
    pub last_paid_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBill {
    pub name: String,
    pub amount: f64,
    pub due_day: u32,
    #[serde(default)]
    pub frequency: BillFrequency,
    pub category: Option<String>,
    #[serde(default)]
    pub status: BillStatus,
    pub last_paid_date: Option<NaiveDate>,
}

impl NewBill {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Bill name is required".to_string());
        }
        if !self.amount.is_finite() {
            return Err("Bill amount must be a number".to_string());
        }
        if !(1..=31).contains(&self.due_day) {
            return Err("due_day must be between 1 and 31".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardType {
    Credit,
    Debit,
    Prepaid,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
            Self::Prepaid => "PREPAID",
        }
    }
}

impl std::str::FromStr for CardType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            "PREPAID" => Ok(Self::Prepaid),
            _ => Err(format!("Unknown card type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Active,
    Inactive,
    Blocked,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Blocked => "blocked",
        }
    }
}

impl std::str::FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "blocked" => Ok(Self::Blocked),
            _ => Err(format!("Unknown card status: {}", s)),
        }
    }
}

/// A payment card the user holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub user_id: String,
    /// "Personal Visa", "Corporate Amex"
    pub card_name: String,
    pub card_type: CardType,
    pub last_four_digits: Option<String>,
    pub bank_name: Option<String>,
    pub credit_limit: Option<f64>,
    /// MM/YY
    pub expiry_date: Option<String>,
    pub is_primary: bool,
    pub status: CardStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub card_name: String,
    pub card_type: CardType,
    pub last_four_digits: Option<String>,
    pub bank_name: Option<String>,
    pub credit_limit: Option<f64>,
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub status: CardStatus,
}

impl NewCard {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.card_name.trim().is_empty() {
            return Err("Card name is required".to_string());
        }
        if let Some(ref digits) = self.last_four_digits {
            if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err("last_four_digits must be exactly 4 digits".to_string());
            }
        }
        if let Some(ref expiry) = self.expiry_date {
            if !is_valid_expiry(expiry) {
                return Err("expiry_date must be in MM/YY format".to_string());
            }
        }
        if let Some(limit) = self.credit_limit {
            if !limit.is_finite() || limit < 0.0 {
                return Err("credit_limit must be a non-negative number".to_string());
            }
        }
        Ok(())
    }
}

fn is_valid_expiry(s: &str) -> bool {
    let Some((month, year)) = s.split_once('/') else {
        return false;
    };
    let month_ok = month.len() == 2 && matches!(month.parse::<u32>(), Ok(1..=12));
    let year_ok = year.len() == 2 && year.chars().all(|c| c.is_ascii_digit());
    month_ok && year_ok
}

/// A monthly spending limit for a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub monthly_limit: f64,
    /// Percent of the limit at which the user wants to be warned
    pub alert_threshold: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBudget {
    pub category: String,
    pub monthly_limit: f64,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_alert_threshold() -> f64 {
    80.0
}

fn default_true() -> bool {
    true
}

impl NewBudget {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("Budget category is required".to_string());
        }
        if !self.monthly_limit.is_finite() || self.monthly_limit <= 0.0 {
            return Err("monthly_limit must be greater than zero".to_string());
        }
        if !(0.0..=100.0).contains(&self.alert_threshold) {
            return Err("alert_threshold must be between 0 and 100".to_string());
        }
        Ok(())
    }
}
