// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{BudgetStore, BudgetTracker};
use crate::commands::reports::{month_total_from, open_source};
use crate::config::Settings;
use crate::db::SqliteBudgetStore;
use crate::models::{AggregationResult, BudgetSnapshot};
use crate::source::PagedExpenseSource;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, parse_month, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::warn;

pub async fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, settings, sub).await?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month_s = required(sub, "month")?;
    let (year, month) = parse_month(month_s)?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let mut tracker = BudgetTracker::new(SqliteBudgetStore::new(conn));
    tracker
        .set_budget(year, month, amount)
        .with_context(|| format!("Failed to set budget for {}", month_s))?;
    println!("Budget set for {} = {}", month_s, fmt_money(&amount));
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data: Vec<Vec<String>> = SqliteBudgetStore::new(conn)
        .list()?
        .into_iter()
        .map(|(y, m, amount)| vec![format!("{:04}-{:02}", y, m), fmt_money(&amount)])
        .collect();
    if !maybe_print_json(sub.get_flag("json"), false, &data)? {
        println!("{}", pretty_table(&["Month", "Budget"], data));
    }
    Ok(())
}

/// Snapshot of `(year, month)` together with the walk that measured its spend,
/// or `None` when no budget is set. The source is only walked when a budget
/// exists.
pub async fn month_status<S: BudgetStore>(
    tracker: &BudgetTracker<S>,
    source: &dyn PagedExpenseSource,
    page_size: u32,
    year: i32,
    month: u32,
) -> Result<Option<(BudgetSnapshot, AggregationResult)>> {
    if tracker.snapshot(year, month, || Decimal::ZERO)?.is_none() {
        return Ok(None);
    }
    let spent = month_total_from(source, page_size, year, month).await?;
    let snapshot = tracker.snapshot(year, month, || spent.total)?;
    Ok(snapshot.map(|s| (s, spent)))
}

/// JSON form of `budget status`. `complete` is false when `spent` is a partial
/// total.
pub fn status_json(snapshot: &BudgetSnapshot, spent: &AggregationResult) -> serde_json::Value {
    json!({
        "snapshot": snapshot,
        "complete": spent.complete,
        "lastPageProcessed": spent.last_page_processed,
        "totalPages": spent.total_pages,
        "drifted": spent.drifted,
    })
}

async fn status(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let month_s = required(sub, "month")?;
    let (year, month) = parse_month(month_s)?;
    let tracker = BudgetTracker::new(SqliteBudgetStore::new(conn));
    let source = open_source(settings, sub.get_one::<String>("file"))?;

    let Some((snapshot, spent)) =
        month_status(&tracker, source.as_ref(), settings.page_size, year, month).await?
    else {
        println!("No budget set for {}", month_s);
        return Ok(());
    };
    if spent.is_partial() {
        warn!(
            month = %month_s,
            last_page = ?spent.last_page_processed,
            total_pages = spent.total_pages,
            "budget status built from a partial total"
        );
        eprintln!("Warning: spent is a partial total; not every page could be fetched");
    }

    if maybe_print_json(sub.get_flag("json"), false, &status_json(&snapshot, &spent))? {
        return Ok(());
    }
    let ratio = snapshot.ratio();
    let used = if ratio.is_finite() {
        format!("{:.1}%", ratio * 100.0)
    } else {
        "∞".to_string()
    };
    let data = vec![vec![
        month_s.clone(),
        fmt_money(&snapshot.amount),
        fmt_money(&snapshot.spent),
        fmt_money(&snapshot.remaining()),
        used,
        snapshot.status().to_string(),
    ]];
    println!(
        "{}",
        pretty_table(&["Month", "Budget", "Spent", "Remaining", "Used", "Status"], data)
    );
    Ok(())
}
