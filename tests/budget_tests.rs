// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use spendlens::budget::{BudgetStore, BudgetTracker, MemoryBudgetStore};
use spendlens::db::{self, SqliteBudgetStore};
use spendlens::models::{BudgetSnapshot, BudgetStatus};
use spendlens::Error;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn snapshot(amount: i64, spent: i64) -> BudgetSnapshot {
    BudgetSnapshot {
        year: 2025,
        month: 3,
        amount: Decimal::from(amount),
        spent: Decimal::from(spent),
    }
}

#[test]
fn status_thresholds() {
    assert_eq!(snapshot(1000, 0).status(), BudgetStatus::Under);
    assert_eq!(snapshot(1000, 750).status(), BudgetStatus::Under);
    assert_eq!(snapshot(1000, 751).status(), BudgetStatus::Near);
    assert_eq!(snapshot(1000, 1000).status(), BudgetStatus::Near);
    assert_eq!(snapshot(1000, 1001).status(), BudgetStatus::Over);
}

#[test]
fn zero_budget_ratio() {
    let idle = snapshot(0, 0);
    assert_eq!(idle.ratio(), 0.0);
    assert_eq!(idle.status(), BudgetStatus::Under);

    let spending = snapshot(0, 5);
    assert!(spending.ratio().is_infinite());
    assert_eq!(spending.ratio_decimal(), None);
    assert_eq!(spending.status(), BudgetStatus::Over);
}

#[test]
fn snapshot_json_carries_derived_fields() {
    let v = serde_json::to_value(snapshot(1000, 800)).unwrap();
    assert_eq!(v["status"], "NEAR");
    assert_eq!(v["ratio"], 0.8);
    assert_eq!(v["remaining"], "200");

    let v = serde_json::to_value(snapshot(0, 5)).unwrap();
    assert!(v["ratio"].is_null());
    assert_eq!(v["status"], "OVER");
}

#[test]
fn negative_budget_rejected_and_previous_kept() {
    let mut tracker = BudgetTracker::new(MemoryBudgetStore::new());
    tracker.set_budget(2025, 3, Decimal::from(500)).unwrap();

    let err = tracker.set_budget(2025, 3, Decimal::from(-1)).unwrap_err();
    assert!(matches!(err, Error::InvalidBudgetAmount(_)));
    assert_eq!(
        tracker.store().get_budget(2025, 3).unwrap(),
        Some(Decimal::from(500))
    );
}

#[test]
fn invalid_month_rejected() {
    let mut tracker = BudgetTracker::new(MemoryBudgetStore::new());
    let err = tracker.set_budget(2025, 13, Decimal::from(10)).unwrap_err();
    assert!(matches!(err, Error::InvalidMonth(13)));
    assert!(tracker.snapshot(2025, 0, || Decimal::ZERO).is_err());
}

#[test]
fn no_budget_skips_spend_lookup() {
    let tracker = BudgetTracker::new(MemoryBudgetStore::new());
    let mut asked = false;
    let snap = tracker
        .snapshot(2025, 3, || {
            asked = true;
            Decimal::ZERO
        })
        .unwrap();
    assert!(snap.is_none());
    assert!(!asked);
}

#[test]
fn zero_budget_is_allowed() {
    let mut tracker = BudgetTracker::new(MemoryBudgetStore::new());
    tracker.set_budget(2025, 3, Decimal::ZERO).unwrap();
    let snap = tracker.snapshot(2025, 3, || Decimal::ZERO).unwrap().unwrap();
    assert_eq!(snap.amount, Decimal::ZERO);
    assert_eq!(snap.status(), BudgetStatus::Under);
}

#[test]
fn snapshot_uses_supplied_spend() {
    let mut tracker = BudgetTracker::new(MemoryBudgetStore::new());
    tracker.set_budget(2025, 3, Decimal::from(1000)).unwrap();
    let snap = tracker
        .snapshot(2025, 3, || Decimal::new(75050, 2))
        .unwrap()
        .unwrap();
    assert_eq!(snap.spent, Decimal::new(75050, 2));
    assert_eq!(snap.remaining(), Decimal::new(24950, 2));
    assert_eq!(snap.status(), BudgetStatus::Near);
}

#[test]
fn sqlite_store_upserts_per_month() {
    let conn = setup();
    let mut tracker = BudgetTracker::new(SqliteBudgetStore::new(&conn));
    tracker.set_budget(2025, 3, Decimal::new(100050, 2)).unwrap();
    tracker.set_budget(2025, 3, Decimal::from(1200)).unwrap();
    tracker.set_budget(2025, 4, Decimal::from(900)).unwrap();

    let store = tracker.into_store();
    assert_eq!(store.get_budget(2025, 3).unwrap(), Some(Decimal::from(1200)));
    assert_eq!(store.get_budget(2025, 5).unwrap(), None);

    let all = store.list().unwrap();
    assert_eq!(
        all,
        vec![(2025, 4, Decimal::from(900)), (2025, 3, Decimal::from(1200))]
    );
}

#[test]
fn sqlite_store_keeps_decimal_precision() {
    let conn = setup();
    let mut store = SqliteBudgetStore::new(&conn);
    store.set_budget(2025, 1, "1234.5678".parse().unwrap()).unwrap();
    let stored: String = conn
        .query_row("SELECT amount FROM budgets WHERE year=2025 AND month=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(stored, "1234.5678");
    assert_eq!(
        store.get_budget(2025, 1).unwrap(),
        Some("1234.5678".parse().unwrap())
    );
}
