//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Asha".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            monthly_income: 85000.0,
            income_type: "salaried".to_string(),
        }
    }

    fn record(user_id: &str, merchant: &str, amount: f64) -> NewTransaction {
        NewTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount,
            txn_type: TransactionType::Debit,
            category: "Food".to_string(),
            merchant: merchant.to_string(),
            mode: PaymentMode::Upi,
            source: TransactionSource::Csv,
            date: Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        for table in ["users", "transactions", "bills", "cards", "budgets", "audit_log"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();

        let user = db.create_user(&new_user("Asha@Example.com")).unwrap();
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.monthly_income, 85000.0);

        let found = db.get_user_by_email("ASHA@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let by_id = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(by_id.name, "Asha");

        assert!(db.get_user("missing").unwrap().is_none());
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_email_conflict() {
        let db = Database::in_memory().unwrap();
        db.create_user(&new_user("asha@example.com")).unwrap();

        let result = db.create_user(&new_user("ASHA@example.com"));
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn test_commit_batch_and_list() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user(&new_user("a@example.com")).unwrap();

        let batch = vec![
            record(&user.id, "first", 10.0),
            record(&user.id, "second", 20.0),
            record(&user.id, "third", 30.0),
        ];
        assert_eq!(db.commit_batch(&batch).unwrap(), 3);
        assert_eq!(db.count_transactions(&user.id).unwrap(), 3);

        // same timestamp: insertion order is kept
        let listed = db.list_transactions(&user.id, 10, 0).unwrap();
        let merchants: Vec<&str> = listed.iter().map(|t| t.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["first", "second", "third"]);
        assert_eq!(listed[0].mode, PaymentMode::Upi);
        assert_eq!(listed[0].source, TransactionSource::Csv);
        assert_eq!(listed[0].date, batch[0].date);

        let page = db.list_transactions(&user.id, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].merchant, "second");
    }

    #[test]
    fn test_commit_batch_is_atomic() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user(&new_user("a@example.com")).unwrap();

        let first = record(&user.id, "ok", 10.0);
        let mut clash = record(&user.id, "clash", 20.0);
        clash.id = first.id.clone();

        let result = db.commit_batch(&[first, clash]);
        assert!(result.as_ref().err().map(Error::is_storage).unwrap_or(false));
        assert_eq!(db.count_transactions(&user.id).unwrap(), 0);
    }

    #[test]
    fn test_empty_batch() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.commit_batch(&[]).unwrap(), 0);
    }

    #[test]
    fn test_transactions_scoped_to_user() {
        let db = Database::in_memory().unwrap();
        let a = db.create_user(&new_user("a@example.com")).unwrap();
        let b = db.create_user(&new_user("b@example.com")).unwrap();

        db.insert_transaction(&record(&a.id, "mine", 1.0)).unwrap();
        db.insert_transaction(&record(&b.id, "theirs", 2.0)).unwrap();

        let listed = db.list_transactions(&a.id, 50, 0).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].merchant, "mine");
    }

    #[test]
    fn test_planning_entities() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user(&new_user("a@example.com")).unwrap();

        let bill = db
            .create_bill(
                &user.id,
                &NewBill {
                    name: "Electricity".to_string(),
                    amount: 1450.0,
                    due_day: 5,
                    frequency: BillFrequency::Monthly,
                    category: Some("Utilities".to_string()),
                    status: BillStatus::Pending,
                    last_paid_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 5),
                },
            )
            .unwrap();
        assert_eq!(bill.due_day, 5);
        assert_eq!(db.list_bills(&user.id).unwrap().len(), 1);

        let card = NewCard {
            card_name: "Personal Visa".to_string(),
            card_type: CardType::Credit,
            last_four_digits: Some("4242".to_string()),
            bank_name: Some("HDFC".to_string()),
            credit_limit: Some(100000.0),
            expiry_date: Some("08/28".to_string()),
            is_primary: true,
            status: CardStatus::Active,
        };
        db.create_card(&user.id, &card).unwrap();
        let second = NewCard {
            card_name: "Travel Amex".to_string(),
            ..card.clone()
        };
        db.create_card(&user.id, &second).unwrap();

        let cards = db.list_cards(&user.id).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards.iter().filter(|c| c.is_primary).count(), 1);
        assert_eq!(cards[0].card_name, "Travel Amex");

        let budget = db
            .create_budget(
                &user.id,
                &NewBudget {
                    category: "Food".to_string(),
                    monthly_limit: 8000.0,
                    alert_threshold: 75.0,
                    is_active: true,
                },
            )
            .unwrap();
        assert_eq!(budget.alert_threshold, 75.0);
        assert_eq!(db.list_budgets(&user.id).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_planning_entity_rejected() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user(&new_user("a@example.com")).unwrap();

        let result = db.create_budget(
            &user.id,
            &NewBudget {
                category: "Food".to_string(),
                monthly_limit: 0.0,
                alert_threshold: 80.0,
                is_active: true,
            },
        );
        assert!(matches!(result, Err(Error::InvalidData(_))));
        assert!(db.list_budgets(&user.id).unwrap().is_empty());
    }

    #[test]
    fn test_audit_log_per_user() {
        let db = Database::in_memory().unwrap();

        db.log_audit(Some("u1"), "upload", Some("transactions"), None, Some("created=3"))
            .unwrap();
        db.log_audit(Some("u1"), "login", None, None, None).unwrap();
        db.log_audit(Some("u2"), "login", None, None, None).unwrap();

        let entries = db.list_audit_log("u1", 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "login");
        assert_eq!(entries[1].details.as_deref(), Some("created=3"));

        assert_eq!(db.list_audit_log("u1", 1).unwrap().len(), 1);
    }
}
