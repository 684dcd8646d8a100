// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Exact totals over every page of a filtered query.
//!
//! A run is a sequential fold over pages `0..total_pages`. The fold stops early on a
//! failed fetch (keeping what it has accumulated), on a source whose result set
//! shifts under it, or when a newer run supersedes it. Every run draws a
//! generation from the engine; a run whose generation is no longer current never
//! fetches again and its result is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::models::{AggregationResult, ExpenseRecord, FilterCriteria, Page};
use crate::source::PagedExpenseSource;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Folds page contents into a running value.
pub trait PageAccumulator {
    type Output;

    fn accept(&mut self, page: &Page<ExpenseRecord>);

    fn finish(self) -> Self::Output;
}

/// Sums record amounts.
#[derive(Debug, Default)]
pub struct TotalAccumulator {
    total: Decimal,
}

impl PageAccumulator for TotalAccumulator {
    type Output = Decimal;

    fn accept(&mut self, page: &Page<ExpenseRecord>) {
        self.total += page.content.iter().map(|r| r.amount).sum::<Decimal>();
    }

    fn finish(self) -> Decimal {
        self.total
    }
}

/// Keeps every record seen, in page order.
#[derive(Debug, Default)]
pub struct RecordCollector {
    records: Vec<ExpenseRecord>,
}

impl PageAccumulator for RecordCollector {
    type Output = Vec<ExpenseRecord>;

    fn accept(&mut self, page: &Page<ExpenseRecord>) {
        self.records.extend(page.content.iter().cloned());
    }

    fn finish(self) -> Vec<ExpenseRecord> {
        self.records
    }
}

/// Cancellation token of one run.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RunToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Accumulated value plus how far the walk got.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk<T> {
    pub value: T,
    pub complete: bool,
    pub last_page_processed: Option<u32>,
    pub total_pages: u32,
    pub drifted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Finished(T),
    /// A newer run started before this one finished.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn finished(self) -> Option<T> {
        match self {
            Outcome::Finished(w) => Some(w),
            Outcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Outcome::Superseded)
    }
}

pub type AggregationOutcome = Outcome<AggregationResult>;

/// Walks paged sources. Shared by reference between concurrent runs; each call
/// to [`AggregationEngine::aggregate`] or [`AggregationEngine::collect`]
/// supersedes the runs started before it.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    page_size: u32,
    generation: Arc<AtomicU64>,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl AggregationEngine {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Start a new run, invalidating every earlier token.
    pub fn begin(&self) -> RunToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken {
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// Total of `amount` across every page matching `criteria`.
    pub async fn aggregate<S>(&self, source: &S, criteria: &FilterCriteria) -> AggregationOutcome
    where
        S: PagedExpenseSource + ?Sized,
    {
        let token = self.begin();
        match self
            .walk_pages(source, criteria, &token, TotalAccumulator::default())
            .await
        {
            Outcome::Finished(w) => {
                info!(
                    total = %w.value,
                    complete = w.complete,
                    pages = w.total_pages,
                    "aggregation finished"
                );
                Outcome::Finished(AggregationResult {
                    total: w.value,
                    complete: w.complete,
                    last_page_processed: w.last_page_processed,
                    total_pages: w.total_pages,
                    drifted: w.drifted,
                })
            }
            Outcome::Superseded => Outcome::Superseded,
        }
    }

    /// Every record matching `criteria`, gathered with the same walk as
    /// [`AggregationEngine::aggregate`].
    pub async fn collect<S>(
        &self,
        source: &S,
        criteria: &FilterCriteria,
    ) -> Outcome<Walk<Vec<ExpenseRecord>>>
    where
        S: PagedExpenseSource + ?Sized,
    {
        let token = self.begin();
        self.walk_pages(source, criteria, &token, RecordCollector::default())
            .await
    }

    /// Fold pages `0..total_pages` of `criteria` into `acc`, in order.
    ///
    /// The token is checked before every request and again when a response
    /// arrives, so a superseded run neither issues further requests nor reports
    /// a result.
    pub async fn walk_pages<S, A>(
        &self,
        source: &S,
        criteria: &FilterCriteria,
        token: &RunToken,
        mut acc: A,
    ) -> Outcome<Walk<A::Output>>
    where
        S: PagedExpenseSource + ?Sized,
        A: PageAccumulator,
    {
        if !token.is_current() {
            return Outcome::Superseded;
        }
        let first = source.fetch_page(criteria, 0, self.page_size).await;
        if !token.is_current() {
            debug!(generation = token.generation(), "run superseded during page 0");
            return Outcome::Superseded;
        }
        let first = match first {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "page 0 fetch failed, nothing aggregated");
                return Outcome::Finished(Walk {
                    value: acc.finish(),
                    complete: false,
                    last_page_processed: None,
                    total_pages: 0,
                    drifted: false,
                });
            }
        };

        let total_pages = first.total_pages;
        if total_pages == 0 {
            return Outcome::Finished(Walk {
                value: acc.finish(),
                complete: true,
                last_page_processed: None,
                total_pages,
                drifted: false,
            });
        }
        acc.accept(&first);
        debug!(page = 0, total_pages, "page processed");
        let mut last = 0;

        for page_number in 1..total_pages {
            if !token.is_current() {
                debug!(generation = token.generation(), page_number, "run superseded");
                return Outcome::Superseded;
            }
            let fetched = source.fetch_page(criteria, page_number, self.page_size).await;
            if !token.is_current() {
                debug!(generation = token.generation(), page_number, "run superseded");
                return Outcome::Superseded;
            }
            let page = match fetched {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, page_number, last, "page fetch failed, returning partial result");
                    return Outcome::Finished(Walk {
                        value: acc.finish(),
                        complete: false,
                        last_page_processed: Some(last),
                        total_pages,
                        drifted: false,
                    });
                }
            };
            if page.total_pages != total_pages || page.page_number != page_number {
                warn!(
                    page_number,
                    reported_page = page.page_number,
                    reported_pages = page.total_pages,
                    total_pages,
                    "result set changed during walk, returning partial result"
                );
                return Outcome::Finished(Walk {
                    value: acc.finish(),
                    complete: false,
                    last_page_processed: Some(last),
                    total_pages,
                    drifted: true,
                });
            }
            acc.accept(&page);
            debug!(page = page_number, total_pages, "page processed");
            last = page_number;
        }

        Outcome::Finished(Walk {
            value: acc.finish(),
            complete: true,
            last_page_processed: Some(last),
            total_pages,
            drifted: false,
        })
    }
}
