// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{DistributionEntry, ExpenseRecord, UNCATEGORIZED_ID, UNCATEGORIZED_NAME};

/// Spend per top-level category for one month, largest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub entries: Vec<DistributionEntry>,
    pub total_sum: Decimal,
}

impl Distribution {
    /// Nothing to chart: no matching spend at all.
    pub fn is_empty(&self) -> bool {
        self.total_sum.is_zero()
    }

    pub fn entry(&self, category_id: i64) -> Option<&DistributionEntry> {
        self.entries.iter().find(|e| e.category_id == category_id)
    }
}

/// Bucket key and display name. Sub-categories roll up into their parent.
fn bucket_of(record: &ExpenseRecord) -> (i64, &str) {
    match &record.category {
        Some(c) => (
            c.parent_id.unwrap_or(c.id),
            c.parent_name.as_deref().unwrap_or(&c.name),
        ),
        None => (UNCATEGORIZED_ID, UNCATEGORIZED_NAME),
    }
}

/// Group the records dated in local month `(year, month)` by top-level category.
///
/// Entries are sorted by total descending; equal totals keep the order in which
/// their category was first seen. The bucket name is taken from the first record
/// of each bucket.
pub fn distribute(records: &[ExpenseRecord], year: i32, month: u32) -> Distribution {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut entries: Vec<DistributionEntry> = Vec::new();

    for record in records.iter().filter(|r| r.in_month(year, month)) {
        let (key, name) = bucket_of(record);
        let slot = *index.entry(key).or_insert_with(|| {
            entries.push(DistributionEntry {
                category_id: key,
                category_name: name.to_string(),
                total: Decimal::ZERO,
                percentage: 0.0,
            });
            entries.len() - 1
        });
        entries[slot].total += record.amount;
    }

    // sort_by is stable, which keeps first-seen order among equal totals
    entries.sort_by(|a, b| b.total.cmp(&a.total));

    let total_sum: Decimal = entries.iter().map(|e| e.total).sum();
    for e in &mut entries {
        e.percentage = percent_of(e.total, total_sum);
    }

    Distribution { entries, total_sum }
}

fn percent_of(value: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    value
        .checked_div(total)
        .and_then(|r| (r * Decimal::ONE_HUNDRED).to_f64())
        .unwrap_or(0.0)
}
