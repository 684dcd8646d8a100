// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Paged expense sources.
//!
//! A source answers one page of expense records per call. The aggregation engine
//! only ever talks to the [`PagedExpenseSource`] trait; the remote API and local
//! record files are two implementations of it.

mod http;
mod memory;

pub use http::HttpExpenseSource;
pub use memory::InMemoryExpenseSource;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ExpenseRecord, FilterCriteria, Page};

#[async_trait]
pub trait PagedExpenseSource: Send + Sync {
    /// Fetch page `page_number` (zero based) of the records matching `criteria`.
    ///
    /// Transport and server failures are reported as
    /// [`crate::Error::SourceUnavailable`].
    async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<ExpenseRecord>>;
}
