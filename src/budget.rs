// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::BudgetSnapshot;

/// Per-(year, month) budget amounts.
pub trait BudgetStore {
    fn get_budget(&self, year: i32, month: u32) -> Result<Option<Decimal>>;

    fn set_budget(&mut self, year: i32, month: u32, amount: Decimal) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBudgetStore {
    budgets: BTreeMap<(i32, u32), Decimal>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BudgetStore for MemoryBudgetStore {
    fn get_budget(&self, year: i32, month: u32) -> Result<Option<Decimal>> {
        Ok(self.budgets.get(&(year, month)).copied())
    }

    fn set_budget(&mut self, year: i32, month: u32, amount: Decimal) -> Result<()> {
        self.budgets.insert((year, month), amount);
        Ok(())
    }
}

/// Validates budget input and classifies spend against stored budgets.
#[derive(Debug)]
pub struct BudgetTracker<S> {
    store: S,
}

impl<S: BudgetStore> BudgetTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Create or replace the budget for `(year, month)`.
    ///
    /// Negative amounts and months outside 1-12 are rejected before the store is
    /// touched.
    pub fn set_budget(&mut self, year: i32, month: u32, amount: Decimal) -> Result<()> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth(month));
        }
        if amount < Decimal::ZERO {
            return Err(Error::InvalidBudgetAmount(amount));
        }
        self.store.set_budget(year, month, amount)?;
        info!(year, month, %amount, "budget set");
        Ok(())
    }

    /// Snapshot of `(year, month)`, or `None` when no budget was ever set.
    ///
    /// `spent` is only asked for when a budget exists.
    pub fn snapshot<F>(&self, year: i32, month: u32, spent: F) -> Result<Option<BudgetSnapshot>>
    where
        F: FnOnce() -> Decimal,
    {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth(month));
        }
        let Some(amount) = self.store.get_budget(year, month)? else {
            return Ok(None);
        };
        Ok(Some(BudgetSnapshot {
            year,
            month,
            amount,
            spent: spent(),
        }))
    }
}
