// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Library error type.
//!
//! "No budget set" and "empty distribution" are not errors: they are modelled as
//! `Ok(None)` from [`crate::budget::BudgetTracker::snapshot`] and
//! [`crate::distribution::Distribution::is_empty`] respectively.

use rust_decimal::Decimal;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A page fetch failed because of a transport or server error.
    #[error("expense source unavailable: {0}")]
    SourceUnavailable(String),

    /// A budget amount below zero was supplied.
    #[error("invalid budget amount {0}: budgets must be zero or greater")]
    InvalidBudgetAmount(Decimal),

    #[error("invalid month {0}, expected 1-12")]
    InvalidMonth(u32),

    /// A record file entry could not be turned into an expense record.
    #[error("invalid expense record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// A stored or environment setting could not be parsed.
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },

    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
