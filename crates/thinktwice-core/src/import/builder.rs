//! Coerce validated rows into transaction records

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::{RawRow, RowError};
use crate::categorizer::categorize;
use crate::models::{NewTransaction, PaymentMode, TransactionSource, TransactionType};

const TYPE_COLUMNS: &[&str] = &["type", "txn_type"];
const DATE_COLUMNS: &[&str] = &["date", "txn_date"];

/// Build a transaction from a validated row.
///
/// `source` and `owner` come from the caller, never from the row. Rows without
/// a date column are stamped with `ingested_at`.
pub fn build_record(
    row: &RawRow,
    owner: &str,
    source: TransactionSource,
    ingested_at: DateTime<Utc>,
) -> Result<NewTransaction, RowError> {
    let amount = parse_amount(row.get("amount").unwrap_or_default())?;

    let txn_type = match first_present(row, TYPE_COLUMNS) {
        Some(value) => value
            .parse::<TransactionType>()
            .map_err(|_| RowError::InvalidType(value.to_string()))?,
        None => TransactionType::Debit,
    };

    let merchant = row.get("merchant").unwrap_or_default().to_string();

    let category = match non_empty(row.get("category")) {
        Some(value) => value.to_string(),
        None => categorize(&merchant),
    };

    // unlisted modes (NEFT, cheque) are stored as UNKNOWN
    let mode = match non_empty(row.get("mode")) {
        Some(value) => value.parse::<PaymentMode>().unwrap_or_else(|_| {
            debug!(mode = value, "Unrecognized payment mode, storing UNKNOWN");
            PaymentMode::Unknown
        }),
        None => PaymentMode::Unknown,
    };

    let date = match first_present(row, DATE_COLUMNS) {
        Some(value) => parse_timestamp(value)?,
        None => ingested_at,
    };

    Ok(NewTransaction {
        id: Uuid::new_v4().to_string(),
        user_id: owner.to_string(),
        amount,
        txn_type,
        category,
        merchant,
        mode,
        source,
        date,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_present<'a>(row: &'a RawRow, columns: &[&str]) -> Option<&'a str> {
    columns.iter().find_map(|col| non_empty(row.get(col)))
}

/// Parse an amount as a finite decimal
pub fn parse_amount(s: &str) -> Result<f64, RowError> {
    let trimmed = s.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RowError::InvalidAmount(s.to_string())),
    }
}

/// Parse a transaction timestamp in any of the accepted layouts
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RowError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%d/%m/%Y", // 15/01/2024
        "%m/%d/%Y", // 01/15/2024 when the day is above 12
        "%d-%m-%Y", // 15-01-2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
    }

    Err(RowError::InvalidDate(s.to_string()))
}

/// A single transaction entered by hand
#[derive(Debug, Clone, Deserialize)]
pub struct ManualEntry {
    /// Number or numeric string
    pub amount: serde_json::Value,
    #[serde(alias = "type")]
    pub txn_type: Option<String>,
    pub merchant: String,
    pub mode: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl ManualEntry {
    /// Express the entry as a row so it goes through the same coercions as uploads
    pub fn into_row(self) -> RawRow {
        let amount = match self.amount {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };

        let mut row = RawRow::default();
        row.insert("amount", amount);
        row.insert("merchant", self.merchant);
        if let Some(t) = self.txn_type {
            row.insert("type", t);
        }
        if let Some(mode) = self.mode {
            row.insert("mode", mode);
        }
        if let Some(category) = self.category {
            row.insert("category", category);
        }
        if let Some(date) = self.date {
            row.insert("date", date);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_defaults_and_categorizer_fallback() {
        let record = build_record(
            &row(&[("amount", "150.50"), ("merchant", "Zomato Order")]),
            "user-1",
            TransactionSource::Csv,
            now(),
        )
        .unwrap();

        assert_eq!(record.amount, 150.50);
        assert_eq!(record.category, "Food");
        assert_eq!(record.mode, PaymentMode::Unknown);
        assert_eq!(record.txn_type, TransactionType::Debit);
        assert_eq!(record.source, TransactionSource::Csv);
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.date, now());
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_row_values_override_defaults() {
        let record = build_record(
            &row(&[
                ("amount", " -42 "),
                ("merchant", "Zomato Order"),
                ("txn_type", "credit"),
                ("category", "Refunds"),
                ("mode", "upi"),
            ]),
            "user-1",
            TransactionSource::Excel,
            now(),
        )
        .unwrap();

        assert_eq!(record.amount, -42.0);
        assert_eq!(record.txn_type, TransactionType::Credit);
        assert_eq!(record.category, "Refunds");
        assert_eq!(record.mode, PaymentMode::Upi);
        assert_eq!(record.source, TransactionSource::Excel);
    }

    #[test]
    fn test_type_alias_precedence() {
        let record = build_record(
            &row(&[
                ("amount", "1"),
                ("merchant", "x"),
                ("type", "CREDIT"),
                ("txn_type", "DEBIT"),
            ]),
            "u",
            TransactionSource::Csv,
            now(),
        )
        .unwrap();
        assert_eq!(record.txn_type, TransactionType::Credit);
    }

    #[test]
    fn test_empty_optional_values_count_as_absent() {
        let record = build_record(
            &row(&[
                ("amount", "12"),
                ("merchant", "Netflix"),
                ("type", ""),
                ("category", " "),
                ("mode", ""),
            ]),
            "u",
            TransactionSource::Csv,
            now(),
        )
        .unwrap();
        assert_eq!(record.txn_type, TransactionType::Debit);
        assert_eq!(record.category, "Entertainment");
        assert_eq!(record.mode, PaymentMode::Unknown);
    }

    #[test]
    fn test_empty_merchant_is_uncategorized() {
        let record = build_record(
            &row(&[("amount", "5"), ("merchant", "")]),
            "u",
            TransactionSource::Csv,
            now(),
        )
        .unwrap();
        assert_eq!(record.category, "Uncategorized");
        assert_eq!(record.merchant, "");
    }

    #[test]
    fn test_coercion_failures() {
        let bad_amount = row(&[("amount", "abc"), ("merchant", "x")]);
        assert!(matches!(
            build_record(&bad_amount, "u", TransactionSource::Csv, now()),
            Err(RowError::InvalidAmount(_))
        ));

        let infinite = row(&[("amount", "inf"), ("merchant", "x")]);
        assert!(matches!(
            build_record(&infinite, "u", TransactionSource::Csv, now()),
            Err(RowError::InvalidAmount(_))
        ));

        let bad_type = row(&[("amount", "1"), ("merchant", "x"), ("type", "refund")]);
        assert!(matches!(
            build_record(&bad_type, "u", TransactionSource::Csv, now()),
            Err(RowError::InvalidType(_))
        ));

        let bad_date = row(&[("amount", "1"), ("merchant", "x"), ("date", "yesterday")]);
        assert!(matches!(
            build_record(&bad_date, "u", TransactionSource::Csv, now()),
            Err(RowError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_unlisted_mode_stored_as_unknown() {
        for mode in ["NEFT", "netbanking", "Cheque"] {
            let r = row(&[("amount", "5"), ("merchant", "Uber"), ("mode", mode)]);
            let record = build_record(&r, "u", TransactionSource::Excel, now()).unwrap();
            assert_eq!(record.mode, PaymentMode::Unknown);
            assert_eq!(record.category, "Transport");
        }
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), expected);
        assert_eq!(parse_timestamp("15/01/2024").unwrap(), expected);
        assert_eq!(parse_timestamp("01/15/2024").unwrap(), expected);
        assert_eq!(parse_timestamp("15-01-2024").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-15 18:45:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 18, 45, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-01-15T18:45:00+05:30").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 13, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_manual_entry_row() {
        let entry: ManualEntry = serde_json::from_value(serde_json::json!({
            "amount": 250.75,
            "txn_type": "DEBIT",
            "merchant": "Swiggy",
            "mode": "CARD"
        }))
        .unwrap();

        let record =
            build_record(&entry.into_row(), "u", TransactionSource::Manual, now()).unwrap();
        assert_eq!(record.amount, 250.75);
        assert_eq!(record.category, "Food");
        assert_eq!(record.mode, PaymentMode::Card);
        assert_eq!(record.source, TransactionSource::Manual);
    }
}
