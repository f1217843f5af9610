// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::set_default_currency;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("currency", sub)) = m.subcommand() {
        let ccy = set_default_currency(conn, sub.get_one::<String>("currency").unwrap())?;
        println!("Default currency set to {}", ccy);
    }
    Ok(())
}
