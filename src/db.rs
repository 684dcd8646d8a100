// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::budget::BudgetStore;
use crate::error::{Error, Result};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendlens", "spendlens"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not determine platform-specific data dir",
        )
    })?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("spendlens.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn = Connection::open(&path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year INTEGER NOT NULL,
        month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
        amount TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(year, month)
    );
    "#,
    )?;
    Ok(())
}

pub fn setting_get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn setting_set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn settings_all(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Budgets kept in the `budgets` table; amounts are stored as decimal text.
pub struct SqliteBudgetStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteBudgetStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// All stored budgets, newest month first.
    pub fn list(&self) -> Result<Vec<(i32, u32, Decimal)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT year, month, amount FROM budgets ORDER BY year DESC, month DESC")?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i32>(0)?,
                r.get::<_, u32>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (y, m, a) = row?;
            out.push((y, m, parse_amount(2, &a)?));
        }
        Ok(out)
    }
}

fn parse_amount(col: usize, s: &str) -> Result<Decimal> {
    s.parse::<Decimal>().map_err(|e| {
        Error::Storage(rusqlite::Error::FromSqlConversionFailure(
            col,
            Type::Text,
            Box::new(e),
        ))
    })
}

impl BudgetStore for SqliteBudgetStore<'_> {
    fn get_budget(&self, year: i32, month: u32) -> Result<Option<Decimal>> {
        let v: Option<String> = self
            .conn
            .query_row(
                "SELECT amount FROM budgets WHERE year=?1 AND month=?2",
                params![year, month],
                |r| r.get(0),
            )
            .optional()?;
        v.map(|s| parse_amount(0, &s)).transpose()
    }

    fn set_budget(&mut self, year: i32, month: u32, amount: Decimal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO budgets(year, month, amount) VALUES (?1, ?2, ?3)
             ON CONFLICT(year, month) DO UPDATE SET amount=excluded.amount, updated_at=datetime('now')",
            params![year, month, amount.to_string()],
        )?;
        Ok(())
    }
}
