// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::utils::month_bounds;

/// Bucket id for expenses that carry no category.
pub const UNCATEGORIZED_ID: i64 = -1;
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

/// Spend ratio above which a budget is reported as [`BudgetStatus::Near`].
const NEAR_RATIO: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

impl CategoryRef {
    pub fn top_level(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent_id: None,
            parent_name: None,
        }
    }

    pub fn sub(id: i64, name: &str, parent_id: i64, parent_name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent_id: Some(parent_id),
            parent_name: Some(parent_name.to_string()),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: i64,
    pub amount: Decimal,
    /// Local wall-clock time of the expense.
    #[serde(alias = "date", deserialize_with = "deserialize_local_datetime")]
    pub transaction_date: NaiveDateTime,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExpenseRecord {
    pub fn local_date(&self) -> NaiveDate {
        self.transaction_date.date()
    }

    pub fn in_month(&self, year: i32, month: u32) -> bool {
        self.transaction_date.year() == year && self.transaction_date.month() == month
    }
}

/// Parse a transaction timestamp into local wall-clock time.
///
/// Accepts an RFC 3339 timestamp (converted into the local zone), a naive
/// date-time, or a bare `YYYY-MM-DD` date (read as local midnight).
pub fn parse_local_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn deserialize_local_datetime<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_local_datetime(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid transaction date '{}'", s)))
}

/// Criteria for one aggregation run. Empty id sets do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub category_ids: BTreeSet<i64>,
    #[serde(default)]
    pub tag_ids: BTreeSet<i64>,
}

impl FilterCriteria {
    /// First day of the month containing `today` through `today`.
    pub fn current_month(today: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
        Self {
            start_date: Some(first),
            end_date: Some(today),
            ..Self::default()
        }
    }

    pub fn for_month(year: i32, month: u32) -> Result<Self> {
        let (first, last) = month_bounds(year, month).ok_or(Error::InvalidMonth(month))?;
        Ok(Self {
            start_date: Some(first),
            end_date: Some(last),
            ..Self::default()
        })
    }

    pub fn with_categories(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.category_ids.extend(ids);
        self
    }

    pub fn with_tags(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.tag_ids.extend(ids);
        self
    }

    /// Whether a record satisfies these criteria.
    ///
    /// Date bounds are inclusive and compared on the local date. The category
    /// filter matches the record's own (leaf) category id; the tag filter matches
    /// when any of the record's tags is listed.
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        let date = record.local_date();
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        if !self.category_ids.is_empty() {
            match &record.category {
                Some(c) if self.category_ids.contains(&c.id) => {}
                _ => return false,
            }
        }
        if !self.tag_ids.is_empty() && !record.tags.iter().any(|t| self.tag_ids.contains(&t.id)) {
            return false;
        }
        true
    }

    /// Query parameters for one page request, in the remote API's naming.
    pub fn to_query(&self, page: u32, size: u32) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(d) = self.start_date {
            q.push(("startDate", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(d) = self.end_date {
            q.push(("endDate", d.format("%Y-%m-%d").to_string()));
        }
        for id in &self.category_ids {
            q.push(("categoryIds", id.to_string()));
        }
        for id in &self.tag_ids {
            q.push(("tagIds", id.to_string()));
        }
        q.push(("page", page.to_string()));
        q.push(("size", size.to_string()));
        q
    }
}

/// One page of a paged query. Wire names follow the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    #[serde(rename = "number")]
    pub page_number: u32,
    #[serde(rename = "size")]
    pub page_size: u32,
    #[serde(rename = "first")]
    pub is_first: bool,
    #[serde(rename = "last")]
    pub is_last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page_number: u32, page_size: u32, total_elements: u64) -> Self {
        // Page counts past u32::MAX clamp rather than wrap.
        let total_pages = if page_size == 0 {
            0
        } else {
            u32::try_from(total_elements.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
        };
        Self {
            content,
            total_elements,
            total_pages,
            page_number,
            page_size,
            is_first: page_number == 0,
            is_last: page_number.saturating_add(1) >= total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub category_id: i64,
    pub category_name: String,
    pub total: Decimal,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetStatus {
    Under,
    Near,
    Over,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BudgetStatus::Under => "UNDER",
            BudgetStatus::Near => "NEAR",
            BudgetStatus::Over => "OVER",
        };
        write!(f, "{}", s)
    }
}

/// Budget ceiling and spend for one month. Ratio and status are derived on
/// every call.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSnapshot {
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
    pub spent: Decimal,
}

impl BudgetSnapshot {
    /// Exact spend ratio; `None` stands for an infinite ratio (spend against a
    /// zero budget).
    pub fn ratio_decimal(&self) -> Option<Decimal> {
        if self.amount > Decimal::ZERO {
            self.spent.checked_div(self.amount)
        } else if self.spent > Decimal::ZERO {
            None
        } else {
            Some(Decimal::ZERO)
        }
    }

    pub fn ratio(&self) -> f64 {
        match self.ratio_decimal() {
            Some(r) => r.to_f64().unwrap_or(0.0),
            None => f64::INFINITY,
        }
    }

    pub fn status(&self) -> BudgetStatus {
        match self.ratio_decimal() {
            None => BudgetStatus::Over,
            Some(r) if r > Decimal::ONE => BudgetStatus::Over,
            Some(r) if r > NEAR_RATIO => BudgetStatus::Near,
            Some(_) => BudgetStatus::Under,
        }
    }

    pub fn remaining(&self) -> Decimal {
        self.amount - self.spent
    }
}

impl Serialize for BudgetSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("BudgetSnapshot", 7)?;
        s.serialize_field("year", &self.year)?;
        s.serialize_field("month", &self.month)?;
        s.serialize_field("amount", &self.amount)?;
        s.serialize_field("spent", &self.spent)?;
        s.serialize_field("remaining", &self.remaining())?;
        // JSON has no infinity; an unbounded ratio is written as null.
        let ratio = self.ratio();
        s.serialize_field("ratio", &ratio.is_finite().then_some(ratio))?;
        s.serialize_field("status", &self.status())?;
        s.end()
    }
}

/// One pie slice. Angles are degrees, 0 at 12 o'clock, increasing clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcSegment {
    pub category_id: i64,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
    pub color_index: usize,
}

impl ArcSegment {
    pub fn sweep(&self) -> f64 {
        self.end_angle_deg - self.start_angle_deg
    }

    /// Half-open containment: the start angle belongs to this segment, the end
    /// angle to the next one.
    pub fn contains(&self, angle_deg: f64) -> bool {
        angle_deg >= self.start_angle_deg && angle_deg < self.end_angle_deg
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub total: Decimal,
    /// False when the walk stopped before the last page.
    pub complete: bool,
    /// `None` when not even page 0 could be processed.
    pub last_page_processed: Option<u32>,
    /// Page count announced by page 0.
    pub total_pages: u32,
    /// The source changed its result set mid-walk.
    #[serde(default)]
    pub drifted: bool,
}

impl AggregationResult {
    pub fn is_partial(&self) -> bool {
        !self.complete
    }
}
