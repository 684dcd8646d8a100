// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use crate::aggregate::{AggregationEngine, Outcome};
use crate::config::Settings;
use crate::distribution::{distribute, Distribution};
use crate::geometry::{build_arcs, hit_test};
use crate::models::{AggregationResult, FilterCriteria};
use crate::source::{HttpExpenseSource, InMemoryExpenseSource, PagedExpenseSource};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_month, pretty_table, required};
use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::warn;

pub async fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("total", sub)) => total(settings, sub).await?,
        Some(("distribution", sub)) => distribution(settings, sub).await?,
        Some(("chart", sub)) => chart(settings, sub).await?,
        _ => {}
    }
    Ok(())
}

/// The API from settings, or a record file when `--file` was given.
pub(crate) fn open_source(
    settings: &Settings,
    file: Option<&String>,
) -> Result<Box<dyn PagedExpenseSource>> {
    match file {
        Some(path) => {
            let src = InMemoryExpenseSource::from_path(Path::new(path))
                .with_context(|| format!("Failed to load expenses from {}", path))?;
            Ok(Box::new(src))
        }
        None => {
            let src = HttpExpenseSource::from_settings(settings)
                .context("Failed to set up the expense API client")?;
            Ok(Box::new(src))
        }
    }
}

/// Filter criteria for `report total`. Without dates this is the current month
/// to date.
pub fn criteria_from_args(sub: &clap::ArgMatches, today: chrono::NaiveDate) -> Result<FilterCriteria> {
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    let mut criteria = if from.is_none() && to.is_none() {
        FilterCriteria::current_month(today)
    } else {
        FilterCriteria {
            start_date: from,
            end_date: to,
            ..FilterCriteria::default()
        }
    };
    if let (Some(f), Some(t)) = (criteria.start_date, criteria.end_date) {
        if f > t {
            bail!("--from {} is after --to {}", f, t);
        }
    }
    if let Some(ids) = sub.get_many::<i64>("category") {
        criteria = criteria.with_categories(ids.copied());
    }
    if let Some(ids) = sub.get_many::<i64>("tag") {
        criteria = criteria.with_tags(ids.copied());
    }
    Ok(criteria)
}

/// Spend of one month, walked from the API or a record file.
pub async fn month_total(
    settings: &Settings,
    file: Option<&String>,
    year: i32,
    month: u32,
) -> Result<AggregationResult> {
    let source = open_source(settings, file)?;
    month_total_from(source.as_ref(), settings.page_size, year, month).await
}

pub async fn month_total_from(
    source: &dyn PagedExpenseSource,
    page_size: u32,
    year: i32,
    month: u32,
) -> Result<AggregationResult> {
    let criteria = FilterCriteria::for_month(year, month)?;
    let engine = AggregationEngine::new(page_size);
    match engine.aggregate(source, &criteria).await {
        Outcome::Finished(result) => Ok(result),
        Outcome::Superseded => bail!("Aggregation was superseded"),
    }
}

fn status_label(result: &AggregationResult) -> String {
    match (result.complete, result.drifted, result.last_page_processed) {
        (true, _, _) => "complete".to_string(),
        (false, true, _) => "partial total (data changed during fetch)".to_string(),
        (false, false, Some(p)) => format!("partial total ({} of {} pages)", p + 1, result.total_pages),
        (false, false, None) => "partial total (no pages fetched)".to_string(),
    }
}

async fn total(settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let criteria = criteria_from_args(sub, today)?;
    let source = open_source(settings, sub.get_one::<String>("file"))?;
    let engine = AggregationEngine::new(settings.page_size);
    let result = match engine.aggregate(source.as_ref(), &criteria).await {
        Outcome::Finished(result) => result,
        Outcome::Superseded => bail!("Aggregation was superseded"),
    };

    if !maybe_print_json(sub.get_flag("json"), false, &result)? {
        let range = format!(
            "{} .. {}",
            criteria.start_date.map(|d| d.to_string()).unwrap_or_else(|| "*".into()),
            criteria.end_date.map(|d| d.to_string()).unwrap_or_else(|| "*".into()),
        );
        let data = vec![vec![range, fmt_money(&result.total), status_label(&result)]];
        println!("{}", pretty_table(&["Range", "Total", "Status"], data));
    }
    Ok(())
}

/// Records of one month walked from the source and grouped by top-level category.
async fn month_distribution(
    settings: &Settings,
    sub: &clap::ArgMatches,
) -> Result<(String, Distribution)> {
    let month_s = required(sub, "month")?;
    let (year, month) = parse_month(month_s)?;
    let source = open_source(settings, sub.get_one::<String>("file"))?;
    let criteria = FilterCriteria::for_month(year, month)?;
    let engine = AggregationEngine::new(settings.page_size);
    let walk = match engine.collect(source.as_ref(), &criteria).await {
        Outcome::Finished(walk) => walk,
        Outcome::Superseded => bail!("Aggregation was superseded"),
    };
    if !walk.complete {
        warn!(
            month = %month_s,
            last_page = ?walk.last_page_processed,
            total_pages = walk.total_pages,
            "distribution built from partial data"
        );
        eprintln!("Warning: not every page could be fetched; figures are partial");
    }
    Ok((month_s.clone(), distribute(&walk.value, year, month)))
}

async fn distribution(settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (month, dist) = month_distribution(settings, sub).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &dist.entries)? {
        return Ok(());
    }
    if dist.is_empty() {
        println!("No expenses for {}", month);
        return Ok(());
    }
    let data = dist
        .entries
        .iter()
        .map(|e| {
            vec![
                e.category_name.clone(),
                fmt_money(&e.total),
                format!("{:.1}%", e.percentage),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Total", "Share"], data));
    println!("Total: {}", fmt_money(&dist.total_sum));
    Ok(())
}

async fn chart(settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let max_segments = sub
        .get_one::<usize>("max-segments")
        .copied()
        .unwrap_or(settings.max_segments);
    let palette_size = sub
        .get_one::<usize>("palette-size")
        .copied()
        .unwrap_or(settings.palette_size);
    let probe = sub.get_one::<f64>("probe").copied();

    let (month, dist) = month_distribution(settings, sub).await?;
    let arcs = build_arcs(&dist.entries, max_segments, palette_size);
    let hit = probe.and_then(|angle| hit_test(&arcs, angle));

    if sub.get_flag("json") {
        let v = json!({
            "month": month,
            "totalSum": dist.total_sum,
            "segments": arcs,
            "probe": probe.map(|angle| json!({ "angle": angle, "categoryId": hit })),
        });
        maybe_print_json(true, false, &v)?;
        return Ok(());
    }
    if arcs.is_empty() {
        println!("No expenses for {}", month);
        return Ok(());
    }

    let data = arcs
        .iter()
        .map(|a| {
            let name = dist
                .entry(a.category_id)
                .map(|e| e.category_name.clone())
                .unwrap_or_default();
            vec![
                name,
                format!("{:.2}", a.start_angle_deg),
                format!("{:.2}", a.end_angle_deg),
                format!("{:.2}", a.sweep()),
                a.color_index.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Start°", "End°", "Sweep°", "Color"], data)
    );
    if dist.entries.len() > arcs.len() {
        println!(
            "{} smaller categories not drawn",
            dist.entries.len() - arcs.len()
        );
    }
    if let Some(angle) = probe {
        match hit.and_then(|id| dist.entry(id)) {
            Some(e) => println!("{:.2}° -> {}", angle, e.category_name),
            None => println!("{:.2}° -> (no segment)", angle),
        }
    }
    Ok(())
}
