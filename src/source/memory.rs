// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::PagedExpenseSource;
use crate::error::{Error, Result};
use crate::models::{
    parse_local_datetime, CategoryRef, ExpenseRecord, FilterCriteria, Page, TagRef,
};

/// Serves pages out of a record set held in memory, newest first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExpenseSource {
    records: Vec<ExpenseRecord>,
}

impl InMemoryExpenseSource {
    pub fn new(mut records: Vec<ExpenseRecord>) -> Self {
        records.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        Self { records }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    /// Load records from a `.csv` file, or from a JSON array for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_json_reader(file)
        }
    }

    pub fn from_json_reader<R: Read>(rdr: R) -> Result<Self> {
        let records: Vec<ExpenseRecord> = serde_json::from_reader(rdr)?;
        Ok(Self::new(records))
    }

    /// Read the flat CSV layout:
    /// `id,amount,transaction_date,category_id,category_name,parent_id,parent_name,tags,description`
    /// where `tags` is a `;` separated list of `id:name` pairs.
    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        let mut records = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            records.push(row?.into_record()?);
        }
        Ok(Self::new(records))
    }

    fn matching<'a>(&'a self, criteria: &'a FilterCriteria) -> impl Iterator<Item = &'a ExpenseRecord> + 'a {
        self.records.iter().filter(move |r| criteria.matches(r))
    }
}

#[async_trait]
impl PagedExpenseSource for InMemoryExpenseSource {
    async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<ExpenseRecord>> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        let total = self.matching(criteria).count();
        let skip = page_number as usize * page_size as usize;
        let content: Vec<ExpenseRecord> = self
            .matching(criteria)
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(Page::new(content, page_number, page_size, total as u64))
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: i64,
    amount: String,
    transaction_date: String,
    category_id: Option<i64>,
    category_name: Option<String>,
    parent_id: Option<i64>,
    parent_name: Option<String>,
    tags: Option<String>,
    description: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> Result<ExpenseRecord> {
        let invalid = |reason: String| Error::InvalidRecord {
            id: self.id.to_string(),
            reason,
        };
        let amount = self
            .amount
            .parse::<Decimal>()
            .map_err(|_| invalid(format!("invalid amount '{}'", self.amount)))?;
        let transaction_date = parse_local_datetime(&self.transaction_date)
            .ok_or_else(|| invalid(format!("invalid date '{}'", self.transaction_date)))?;
        let tags = match self.tags.as_deref() {
            Some(list) => parse_tags(list).map_err(invalid)?,
            None => Vec::new(),
        };
        let category = self.category_id.map(|id| CategoryRef {
            id,
            name: self.category_name.clone().unwrap_or_default(),
            parent_id: self.parent_id,
            parent_name: self.parent_name.clone(),
        });
        Ok(ExpenseRecord {
            id: self.id,
            amount,
            transaction_date,
            category,
            tags,
            description: self.description.filter(|d| !d.is_empty()),
        })
    }
}

fn parse_tags(list: &str) -> std::result::Result<Vec<TagRef>, String> {
    list.split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let (id, name) = t
                .split_once(':')
                .ok_or_else(|| format!("invalid tag '{}', expected id:name", t))?;
            let id = id
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid tag id '{}'", id))?;
            Ok(TagRef {
                id,
                name: name.trim().to_string(),
            })
        })
        .collect()
}
