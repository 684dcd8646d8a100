// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendlens::aggregate::{AggregationEngine, Outcome, RecordCollector};
use spendlens::models::{ExpenseRecord, FilterCriteria, Page};
use spendlens::source::{InMemoryExpenseSource, PagedExpenseSource};
use spendlens::{Error, Result};
use tokio::sync::Notify;

fn rec(id: i64, amount: i64) -> ExpenseRecord {
    ExpenseRecord {
        id,
        amount: Decimal::from(amount),
        transaction_date: NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        category: None,
        tags: vec![],
        description: None,
    }
}

/// Pages of `count` records worth 10 each, in a result set of `total` records.
fn page(number: u32, count: usize, total: u64) -> Page<ExpenseRecord> {
    let content = (0..count).map(|i| rec(number as i64 * 100 + i as i64, 10)).collect();
    Page::new(content, number, 10, total)
}

/// Answers from a fixed script indexed by page number; `None` fails the fetch.
struct ScriptedSource {
    pages: Vec<Option<Page<ExpenseRecord>>>,
    requested: Mutex<Vec<u32>>,
}

impl ScriptedSource {
    fn new(pages: Vec<Option<Page<ExpenseRecord>>>) -> Self {
        Self {
            pages,
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PagedExpenseSource for ScriptedSource {
    async fn fetch_page(
        &self,
        _criteria: &FilterCriteria,
        page_number: u32,
        _page_size: u32,
    ) -> Result<Page<ExpenseRecord>> {
        self.requested.lock().unwrap().push(page_number);
        match self.pages.get(page_number as usize) {
            Some(Some(p)) => Ok(p.clone()),
            _ => Err(Error::SourceUnavailable("scripted failure".into())),
        }
    }
}

fn three_pages() -> ScriptedSource {
    ScriptedSource::new(vec![
        Some(page(0, 10, 24)),
        Some(page(1, 10, 24)),
        Some(page(2, 4, 24)),
    ])
}

#[tokio::test]
async fn walks_every_page_in_order() {
    let source = three_pages();
    let engine = AggregationEngine::default();
    let result = engine
        .aggregate(&source, &FilterCriteria::default())
        .await
        .finished()
        .unwrap();

    assert_eq!(result.total, Decimal::from(240));
    assert!(result.complete);
    assert!(!result.drifted);
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.last_page_processed, Some(2));
    assert_eq!(source.requested(), vec![0, 1, 2]);
}

#[tokio::test]
async fn failure_after_first_page_returns_partial_total() {
    let source = ScriptedSource::new(vec![Some(page(0, 10, 24)), None, Some(page(2, 4, 24))]);
    let engine = AggregationEngine::default();
    let result = engine
        .aggregate(&source, &FilterCriteria::default())
        .await
        .finished()
        .unwrap();

    assert_eq!(result.total, Decimal::from(100));
    assert!(!result.complete);
    assert!(result.is_partial());
    assert_eq!(result.last_page_processed, Some(0));
    // page 2 is never requested once page 1 failed
    assert_eq!(source.requested(), vec![0, 1]);
}

#[tokio::test]
async fn failure_on_first_page_processes_nothing() {
    let source = ScriptedSource::new(vec![None]);
    let engine = AggregationEngine::default();
    let result = engine
        .aggregate(&source, &FilterCriteria::default())
        .await
        .finished()
        .unwrap();

    assert_eq!(result.total, Decimal::ZERO);
    assert!(!result.complete);
    assert_eq!(result.last_page_processed, None);
    assert_eq!(source.requested(), vec![0]);
}

#[tokio::test]
async fn empty_result_set_is_complete_zero() {
    let source = ScriptedSource::new(vec![Some(Page::new(vec![], 0, 10, 0))]);
    let engine = AggregationEngine::default();
    let result = engine
        .aggregate(&source, &FilterCriteria::default())
        .await
        .finished()
        .unwrap();

    assert_eq!(result.total, Decimal::ZERO);
    assert!(result.complete);
    assert_eq!(result.total_pages, 0);
    assert_eq!(result.last_page_processed, None);
}

#[tokio::test]
async fn changed_page_count_stops_walk_as_drift() {
    let source = ScriptedSource::new(vec![
        Some(page(0, 10, 24)),
        Some(page(1, 10, 31)),
        Some(page(2, 4, 24)),
    ]);
    let engine = AggregationEngine::default();
    let result = engine
        .aggregate(&source, &FilterCriteria::default())
        .await
        .finished()
        .unwrap();

    assert!(result.drifted);
    assert!(!result.complete);
    assert_eq!(result.total, Decimal::from(100));
    assert_eq!(result.last_page_processed, Some(0));
    assert_eq!(source.requested(), vec![0, 1]);
}

#[tokio::test]
async fn wrong_page_number_stops_walk_as_drift() {
    // Second fetch answers with page 2 under an unchanged page count.
    let source = ScriptedSource::new(vec![
        Some(page(0, 10, 24)),
        Some(page(2, 4, 24)),
        Some(page(2, 4, 24)),
    ]);
    let engine = AggregationEngine::default();
    let result = engine
        .aggregate(&source, &FilterCriteria::default())
        .await
        .finished()
        .unwrap();

    assert!(result.drifted);
    assert!(!result.complete);
    assert_eq!(result.total, Decimal::from(100));
    assert_eq!(result.last_page_processed, Some(0));
    assert_eq!(result.total_pages, 3);
    assert_eq!(source.requested(), vec![0, 1]);
}

#[tokio::test]
async fn stale_token_never_fetches() {
    let source = three_pages();
    let engine = AggregationEngine::default();
    let stale = engine.begin();
    let fresh = engine.begin();
    assert!(!stale.is_current());
    assert!(fresh.is_current());
    assert!(fresh.generation() > stale.generation());

    let outcome = engine
        .walk_pages(&source, &FilterCriteria::default(), &stale, RecordCollector::default())
        .await;
    assert!(outcome.is_superseded());
    assert!(source.requested().is_empty());
}

/// Holds the first request until released; later requests pass straight through.
struct GatedSource {
    inner: InMemoryExpenseSource,
    gated: AtomicBool,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl PagedExpenseSource for GatedSource {
    async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<ExpenseRecord>> {
        if !self.gated.swap(true, Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        self.inner.fetch_page(criteria, page_number, page_size).await
    }
}

#[tokio::test]
async fn newer_run_supersedes_older_one() {
    let records: Vec<ExpenseRecord> = (0..24).map(|i| rec(i, 10)).collect();
    let source = GatedSource {
        inner: InMemoryExpenseSource::new(records),
        gated: AtomicBool::new(false),
        started: Notify::new(),
        release: Notify::new(),
    };
    let engine = AggregationEngine::default();
    let criteria = FilterCriteria::default();

    let older = engine.aggregate(&source, &criteria);
    let newer = async {
        source.started.notified().await;
        let out = engine.aggregate(&source, &criteria).await;
        source.release.notify_one();
        out
    };
    let (older, newer) = tokio::join!(older, newer);

    assert_eq!(older, Outcome::Superseded);
    let newer = newer.finished().unwrap();
    assert_eq!(newer.total, Decimal::from(240));
    assert!(newer.complete);
}

#[tokio::test]
async fn collect_gathers_records_page_by_page() {
    let records: Vec<ExpenseRecord> = (0..13).map(|i| rec(i, i + 1)).collect();
    let source = InMemoryExpenseSource::new(records);
    let engine = AggregationEngine::new(5);
    let walk = engine
        .collect(&source, &FilterCriteria::default())
        .await
        .finished()
        .unwrap();

    assert!(walk.complete);
    assert_eq!(walk.total_pages, 3);
    assert_eq!(walk.value.len(), 13);
    let sum: Decimal = walk.value.iter().map(|r| r.amount).sum();
    assert_eq!(sum, Decimal::from((1..=13).sum::<i64>()));
}

#[tokio::test]
async fn zero_page_size_is_clamped() {
    let engine = AggregationEngine::new(0);
    assert_eq!(engine.page_size(), 1);
}
