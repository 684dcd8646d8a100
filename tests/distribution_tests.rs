// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendlens::distribution::distribute;
use spendlens::models::{CategoryRef, ExpenseRecord, UNCATEGORIZED_ID};

fn rec(id: i64, amount: &str, date: (i32, u32, u32), category: Option<CategoryRef>) -> ExpenseRecord {
    ExpenseRecord {
        id,
        amount: amount.parse().unwrap(),
        transaction_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
        category,
        tags: vec![],
        description: None,
    }
}

fn food() -> CategoryRef {
    CategoryRef::top_level(1, "Food")
}

fn groceries() -> CategoryRef {
    CategoryRef::sub(11, "Groceries", 1, "Food")
}

fn rent() -> CategoryRef {
    CategoryRef::top_level(2, "Rent")
}

#[test]
fn groups_by_top_level_and_sorts_descending() {
    let records = vec![
        rec(1, "20.00", (2025, 3, 2), Some(food())),
        rec(2, "30.00", (2025, 3, 3), Some(groceries())),
        rec(3, "950.00", (2025, 3, 1), Some(rent())),
        rec(4, "12.50", (2025, 3, 9), None),
    ];
    let dist = distribute(&records, 2025, 3);

    let ids: Vec<i64> = dist.entries.iter().map(|e| e.category_id).collect();
    assert_eq!(ids, vec![2, 1, UNCATEGORIZED_ID]);
    assert_eq!(dist.entry(1).unwrap().total, Decimal::new(5000, 2));
    assert_eq!(dist.entry(1).unwrap().category_name, "Food");
    assert_eq!(dist.entry(UNCATEGORIZED_ID).unwrap().category_name, "Uncategorized");
    assert_eq!(dist.total_sum, Decimal::new(103250, 2));
}

#[test]
fn sub_category_spend_rolls_into_parent() {
    let records = vec![rec(1, "30.00", (2025, 3, 3), Some(groceries()))];
    let dist = distribute(&records, 2025, 3);

    assert_eq!(dist.entries.len(), 1);
    assert_eq!(dist.entries[0].category_id, 1);
    assert_eq!(dist.entries[0].category_name, "Food");
    assert!((dist.entries[0].percentage - 100.0).abs() < 1e-9);
}

#[test]
fn percentages_sum_to_one_hundred() {
    let records = vec![
        rec(1, "10", (2025, 3, 1), Some(food())),
        rec(2, "10", (2025, 3, 1), Some(rent())),
        rec(3, "10", (2025, 3, 1), None),
    ];
    let dist = distribute(&records, 2025, 3);

    let sum: f64 = dist.entries.iter().map(|e| e.percentage).sum();
    assert!((sum - 100.0).abs() < 1e-6);
    for e in &dist.entries {
        assert!((e.percentage - 100.0 / 3.0).abs() < 1e-6);
    }
}

#[test]
fn equal_totals_keep_first_seen_order() {
    let records = vec![
        rec(1, "40", (2025, 3, 5), Some(rent())),
        rec(2, "40", (2025, 3, 4), Some(food())),
        rec(3, "40", (2025, 3, 3), None),
    ];
    let dist = distribute(&records, 2025, 3);

    let ids: Vec<i64> = dist.entries.iter().map(|e| e.category_id).collect();
    assert_eq!(ids, vec![2, 1, UNCATEGORIZED_ID]);
}

#[test]
fn records_outside_month_are_ignored() {
    let records = vec![
        rec(1, "10", (2025, 2, 28), Some(food())),
        rec(2, "15", (2025, 3, 31), Some(food())),
        rec(3, "99", (2025, 4, 1), Some(rent())),
        rec(4, "5", (2024, 3, 15), Some(rent())),
    ];
    let dist = distribute(&records, 2025, 3);

    assert_eq!(dist.entries.len(), 1);
    assert_eq!(dist.total_sum, Decimal::from(15));
}

#[test]
fn empty_month_yields_empty_distribution() {
    let records = vec![rec(1, "10", (2025, 2, 1), Some(food()))];
    let dist = distribute(&records, 2025, 3);

    assert!(dist.is_empty());
    assert!(dist.entries.is_empty());
    assert_eq!(dist.total_sum, Decimal::ZERO);
}

#[test]
fn bucket_totals_match_direct_sum() {
    let records: Vec<ExpenseRecord> = (0..50)
        .map(|i| {
            let cat = match i % 3 {
                0 => Some(food()),
                1 => Some(groceries()),
                _ => Some(rent()),
            };
            rec(i, &format!("{}.{:02}", i, i % 100), (2025, 3, 1 + (i as u32 % 28)), cat)
        })
        .collect();
    let dist = distribute(&records, 2025, 3);

    let direct: Decimal = records.iter().map(|r| r.amount).sum();
    assert_eq!(dist.total_sum, direct);
    let bucketed: Decimal = dist.entries.iter().map(|e| e.total).sum();
    assert_eq!(bucketed, direct);
}

#[test]
fn negative_amounts_are_summed_as_given() {
    let records = vec![
        rec(1, "50", (2025, 3, 1), Some(food())),
        rec(2, "-20", (2025, 3, 2), Some(food())),
    ];
    let dist = distribute(&records, 2025, 3);
    assert_eq!(dist.entry(1).unwrap().total, Decimal::from(30));
}
