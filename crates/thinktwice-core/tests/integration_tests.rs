//! Integration tests for thinktwice-core
//!
//! These tests exercise the full upload → categorize → commit workflow.

use thinktwice_core::{
    auth::{hash_password, verify_password},
    db::Database,
    import::{ingest, FileFormat, EXCEL_HEADERS_MESSAGE},
    models::{BatchOutcome, NewUser, PaymentMode, TransactionSource, TransactionType, User},
    Error,
};

fn setup() -> (Database, User) {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let user = db
        .create_user(&NewUser {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            password_hash: hash_password("hunter2hunter2").unwrap(),
            monthly_income: 60000.0,
            income_type: "salaried".to_string(),
        })
        .expect("Failed to create user");
    (db, user)
}

/// Statement export with a mix of good and bad rows
fn mixed_statement_csv() -> &'static str {
    "amount,merchant,type,category,mode\n\
     450.00,Swiggy Dinner,DEBIT,,UPI\n\
     62000,ACME Salary,CREDIT,,\n\
     not-a-number,Amazon,DEBIT,,CARD\n\
     1299,Amazon,DEBIT,Gifts,CARD\n\
     200,BookMyShow,DEBIT,,CHEQUE\n"
}

// =============================================================================
// Ingestion Workflow
// =============================================================================

#[test]
fn test_csv_one_good_one_bad_row() {
    let (db, user) = setup();
    let csv = "amount,merchant\n150.50,Zomato Order\nabc,Uber\n";

    let result = ingest(&db, csv.as_bytes().to_vec(), FileFormat::Csv, &user.id).unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.outcome(), BatchOutcome::PartialSuccess);
    assert_eq!(db.count_transactions(&user.id).unwrap(), 1);
}

#[test]
fn test_round_trip_defaults() {
    let (db, user) = setup();
    let csv = "amount,merchant\n150.50,Zomato Order\n";

    ingest(&db, csv.as_bytes().to_vec(), FileFormat::Csv, &user.id).unwrap();

    let stored = db.list_transactions(&user.id, 10, 0).unwrap();
    assert_eq!(stored.len(), 1);
    let tx = &stored[0];
    assert_eq!(tx.amount, 150.50);
    assert_eq!(tx.category, "Food");
    assert_eq!(tx.mode, PaymentMode::Unknown);
    assert_eq!(tx.txn_type, TransactionType::Debit);
    assert_eq!(tx.source, TransactionSource::Csv);
    assert_eq!(tx.merchant, "Zomato Order");
    assert_eq!(tx.user_id, user.id);
}

#[test]
fn test_mixed_statement() {
    let (db, user) = setup();

    let result = ingest(
        &db,
        mixed_statement_csv().as_bytes().to_vec(),
        FileFormat::Csv,
        &user.id,
    )
    .unwrap();

    // only the bad amount is rejected; the cheque row is kept with mode UNKNOWN
    assert_eq!(result.created, 4);
    assert_eq!(result.failed, 1);
    assert_eq!(result.total(), 5);

    let stored = db.list_transactions(&user.id, 10, 0).unwrap();
    let summary: Vec<(&str, &str)> = stored
        .iter()
        .map(|t| (t.merchant.as_str(), t.category.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Swiggy Dinner", "Food"),
            ("ACME Salary", "Income"),
            ("Amazon", "Gifts"),
            ("BookMyShow", "Entertainment"),
        ]
    );
    assert_eq!(stored[1].txn_type, TransactionType::Credit);
    assert_eq!(stored[3].mode, PaymentMode::Unknown);
}

#[test]
fn test_duplicate_ingestion_doubles_count() {
    let (db, user) = setup();
    let csv = "amount,merchant\n10,Netflix\n20,Spotify\n";

    let first = ingest(&db, csv.as_bytes().to_vec(), FileFormat::Csv, &user.id).unwrap();
    let second = ingest(&db, csv.as_bytes().to_vec(), FileFormat::Csv, &user.id).unwrap();

    assert_eq!(first.created, 2);
    assert_eq!(second.created, 2);
    assert_eq!(db.count_transactions(&user.id).unwrap(), 4);

    let ids: std::collections::HashSet<String> = db
        .list_transactions(&user.id, 10, 0)
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_missing_required_column_fails_every_row() {
    let (db, user) = setup();
    let csv = "amount,description\n10,Netflix\n20,Spotify\n";

    let result = ingest(&db, csv.as_bytes().to_vec(), FileFormat::Csv, &user.id).unwrap();

    assert_eq!(result.created, 0);
    assert_eq!(result.failed, 2);
    assert_eq!(result.outcome(), BatchOutcome::AllFailed);
}

#[test]
fn test_header_only_file_is_full_success() {
    let (db, user) = setup();

    let result = ingest(
        &db,
        b"amount,merchant\n".to_vec(),
        FileFormat::Csv,
        &user.id,
    )
    .unwrap();

    assert_eq!(result.created, 0);
    assert_eq!(result.failed, 0);
    assert_eq!(result.outcome(), BatchOutcome::FullSuccess);
}

#[test]
fn test_empty_file_is_format_error() {
    let (db, user) = setup();

    let result = ingest(&db, Vec::new(), FileFormat::Csv, &user.id);
    assert!(matches!(result, Err(Error::Format(_))));
    assert_eq!(db.count_transactions(&user.id).unwrap(), 0);
}

#[test]
fn test_unreadable_workbook_is_format_error() {
    let (db, user) = setup();

    let result = ingest(
        &db,
        b"amount,type,merchant,mode\n1,DEBIT,x,UPI\n".to_vec(),
        FileFormat::Xlsx,
        &user.id,
    );
    assert!(matches!(result, Err(Error::Format(_))));
    assert_eq!(db.count_transactions(&user.id).unwrap(), 0);
}

/// Two-sheet workbook: a statement first, then an unrelated "Notes" sheet
const STATEMENT_XLSX: &[u8] = include_bytes!("fixtures/statement.xlsx");

/// Workbook whose header row lacks the mode column
const MISSING_MODE_XLSX: &[u8] = include_bytes!("fixtures/missing_mode.xlsx");

#[test]
fn test_workbook_statement() {
    let (db, user) = setup();

    let result = ingest(&db, STATEMENT_XLSX.to_vec(), FileFormat::Xlsx, &user.id).unwrap();

    assert_eq!(result.created, 4);
    assert_eq!(result.failed, 0);
    assert_eq!(result.outcome(), BatchOutcome::FullSuccess);

    // undated rows share the ingestion time and list first, in sheet order
    let stored = db.list_transactions(&user.id, 10, 0).unwrap();
    let summary: Vec<(&str, &str, PaymentMode)> = stored
        .iter()
        .map(|t| (t.merchant.as_str(), t.category.as_str(), t.mode))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ACME Salary", "Income", PaymentMode::Unknown),
            ("Uber", "Transport", PaymentMode::Unknown),
            ("Netflix", "Subscriptions", PaymentMode::Card),
            ("Zomato Order", "Food", PaymentMode::Upi),
        ]
    );
    assert!(stored.iter().all(|t| t.source == TransactionSource::Excel));
    assert_eq!(stored[0].txn_type, TransactionType::Credit);
    assert_eq!(stored[0].amount, 62000.0);

    let zomato = &stored[3];
    assert_eq!(zomato.amount, 150.5);
    assert_eq!(zomato.txn_type, TransactionType::Debit);
    assert_eq!(zomato.date.format("%Y-%m-%d").to_string(), "2024-03-15");
}

#[test]
fn test_workbook_missing_mode_header_rejected() {
    let (db, user) = setup();

    match ingest(&db, MISSING_MODE_XLSX.to_vec(), FileFormat::Xlsx, &user.id) {
        Err(Error::Format(msg)) => assert_eq!(msg, EXCEL_HEADERS_MESSAGE),
        other => panic!("expected format error, got {:?}", other),
    }
    assert_eq!(db.count_transactions(&user.id).unwrap(), 0);
}

#[test]
fn test_dated_rows_keep_their_dates() {
    let (db, user) = setup();
    let csv = "date,amount,merchant\n2024-01-05,10,Jio Recharge\n2024-01-20,20,Apollo Pharmacy\n";

    ingest(&db, csv.as_bytes().to_vec(), FileFormat::Csv, &user.id).unwrap();

    let stored = db.list_transactions(&user.id, 10, 0).unwrap();
    assert_eq!(stored[0].merchant, "Apollo Pharmacy");
    assert_eq!(stored[0].category, "Health");
    assert_eq!(
        stored[1].date.format("%Y-%m-%d").to_string(),
        "2024-01-05"
    );
    assert_eq!(stored[1].category, "Utilities");
}

// =============================================================================
// Accounts
// =============================================================================

#[test]
fn test_stored_password_hash_verifies() {
    let (db, user) = setup();

    let stored = db.get_user_by_email("RAVI@example.com").unwrap().unwrap();
    assert_eq!(stored.id, user.id);
    assert!(verify_password("hunter2hunter2", &stored.password_hash));
    assert!(!verify_password("wrong", &stored.password_hash));
}

#[test]
fn test_encrypted_database_reopens_with_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encrypted.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new_with_key(path, Some("correct horse")).unwrap();
        db.create_user(&NewUser {
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            password_hash: "x".to_string(),
            monthly_income: 0.0,
            income_type: "freelance".to_string(),
        })
        .unwrap();
    }

    let reopened = Database::new_with_key(path, Some("correct horse")).unwrap();
    assert_eq!(reopened.list_users().unwrap().len(), 1);
}
