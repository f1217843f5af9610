// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{principal, trimmed};
use crate::ledger::Ledger;
use crate::summary::{Range, summarize};
use crate::utils::{get_default_currency, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Utc;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    let user = principal(m)?;
    let range = trimmed(m, "range")
        .unwrap_or_else(|| "1M".to_string())
        .parse::<Range>()?;
    let s = summarize(ledger, &user, range, Utc::now().date_naive())?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let ccy = get_default_currency(ledger.connection())?;
    let money = |d: rust_decimal::Decimal| format!("{:.2} {}", d, ccy);
    let rows = vec![
        vec!["Wallets".to_string(), money(s.wallets_total)],
        vec!["Assets".to_string(), money(s.assets_total)],
        vec!["Net worth".to_string(), money(s.net_worth)],
        vec![format!("Income ({})", s.range), money(s.income)],
        vec![format!("Outcome ({})", s.range), money(s.outcome)],
        vec![format!("Profit ({})", s.range), money(s.profit)],
    ];
    let since = format!("Since {}", s.since);
    println!("{}", pretty_table(&["", since.as_str()], rows));
    Ok(())
}
