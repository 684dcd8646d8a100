// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings};
use crate::utils::{maybe_print_json, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub)?,
        Some(("set", sub)) => set(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn).context("Failed to resolve settings")?;
    if !maybe_print_json(sub.get_flag("json"), false, &settings)? {
        let data = settings
            .entries()
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v])
            .collect();
        println!("{}", pretty_table(&["Key", "Value"], data));
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let key = required(sub, "key")?;
    let value = required(sub, "value")?;
    config::save(conn, key, value).with_context(|| format!("Failed to save setting '{}'", key))?;
    println!("Setting {} updated", key);
    Ok(())
}
