// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use async_trait::async_trait;
use tracing::debug;

use super::PagedExpenseSource;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, FilterCriteria, Page};

const UA: &str = concat!(
    "spendlens/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/spendlens)"
);

/// `GET {base}/expenses/filter` against the expense API.
#[derive(Debug, Clone)]
pub struct HttpExpenseSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpExpenseSource {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(UA)
            .build()
            .map_err(unavailable)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.api_url, settings.api_token.clone())
    }

    pub fn endpoint(&self) -> String {
        format!("{}/expenses/filter", self.base_url)
    }
}

fn unavailable(e: reqwest::Error) -> Error {
    Error::SourceUnavailable(e.to_string())
}

#[async_trait]
impl PagedExpenseSource for HttpExpenseSource {
    async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<ExpenseRecord>> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        let url = self.endpoint();
        debug!(%url, page_number, page_size, "requesting expense page");
        let mut req = self
            .client
            .get(&url)
            .query(&criteria.to_query(page_number, page_size));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(unavailable)?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::SourceUnavailable(format!("{} {}", status, text)));
        }
        resp.json::<Page<ExpenseRecord>>().await.map_err(unavailable)
    }
}
