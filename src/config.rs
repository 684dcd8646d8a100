// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime settings.
//!
//! Values come from built-in defaults, then the `settings` table, then the
//! environment, later sources overriding earlier ones.

use rusqlite::Connection;
use serde::Serialize;

use crate::aggregate::DEFAULT_PAGE_SIZE;
use crate::db;
use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_MAX_SEGMENTS: usize = 8;
pub const DEFAULT_PALETTE_SIZE: usize = 8;

pub const KEYS: &[&str] = &["api_url", "api_token", "page_size", "max_segments", "palette_size"];

const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SPENDLENS_API_URL", "api_url"),
    ("SPENDLENS_API_TOKEN", "api_token"),
    ("SPENDLENS_PAGE_SIZE", "page_size"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub page_size: u32,
    pub max_segments: usize,
    pub palette_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_segments: DEFAULT_MAX_SEGMENTS,
            palette_size: DEFAULT_PALETTE_SIZE,
        }
    }
}

impl Settings {
    /// Resolve settings from the database and the process environment.
    pub fn load(conn: &Connection) -> Result<Self> {
        Self::resolve(conn, |var| std::env::var(var).ok())
    }

    /// Resolve settings with an injected environment lookup.
    pub fn resolve<F>(conn: &Connection, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Self::default();
        for (key, value) in db::settings_all(conn)? {
            // the table is shared with other key/value state
            if KEYS.contains(&key.as_str()) {
                s.apply(&key, &value)?;
            }
        }
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = env(var) {
                s.apply(key, &value)?;
            }
        }
        Ok(s)
    }

    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let invalid = || Error::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "api_url" => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "api_token" => {
                self.api_token = (!value.is_empty()).then(|| value.to_string());
            }
            "page_size" => {
                self.page_size = value
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(invalid)?;
            }
            "max_segments" => {
                self.max_segments = value.parse::<usize>().map_err(|_| invalid())?;
            }
            "palette_size" => {
                self.palette_size = value.parse::<usize>().map_err(|_| invalid())?;
            }
            other => return Err(Error::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    /// Key/value pairs for display; the token is masked.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_url", self.api_url.clone()),
            (
                "api_token",
                match &self.api_token {
                    Some(_) => "********".to_string(),
                    None => "(unset)".to_string(),
                },
            ),
            ("page_size", self.page_size.to_string()),
            ("max_segments", self.max_segments.to_string()),
            ("palette_size", self.palette_size.to_string()),
        ]
    }
}

/// Validate and persist one setting.
pub fn save(conn: &Connection, key: &str, value: &str) -> Result<()> {
    Settings::default().apply(key, value)?;
    db::setting_set(conn, key, value.trim())
}
