// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{principal, trimmed};
use crate::ledger::{Ledger, TransactionDraft, TransactionFilter};
use crate::models::{TransactionRow, TransactionType};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use chrono::Utc;

pub fn handle(ledger: &mut Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, sub)?,
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("edit", sub)) => edit(ledger, sub)?,
        Some(("rm", sub)) => rm(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let user = principal(sub)?;
    let amount = parse_decimal(&trimmed(sub, "amount").unwrap_or_default())?;
    let date = trimmed(sub, "date")
        .unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string());
    let draft = TransactionDraft {
        wallet_id: trimmed(sub, "wallet").unwrap_or_default(),
        amount,
        category: trimmed(sub, "category").unwrap_or_default(),
        description: trimmed(sub, "description"),
        date,
    };
    let txn = ledger.create_transaction(&user, &draft)?;
    println!(
        "Recorded {} {} on {} ({}) id {}",
        txn.kind.as_str(),
        txn.amount,
        txn.date,
        txn.category,
        txn.id
    );
    Ok(())
}

fn edit(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let user = principal(sub)?;
    let id = trimmed(sub, "id").unwrap_or_default();
    let current = ledger.get_transaction(&user, &id)?;
    let mut draft = TransactionDraft::from_transaction(&current);
    if let Some(w) = trimmed(sub, "wallet") {
        draft.wallet_id = w;
    }
    if let Some(a) = trimmed(sub, "amount") {
        draft.amount = parse_decimal(&a)?;
    }
    if let Some(c) = trimmed(sub, "category") {
        draft.category = c;
    }
    if let Some(d) = trimmed(sub, "description") {
        draft.description = Some(d);
    }
    if let Some(d) = trimmed(sub, "date") {
        draft.date = d;
    }
    let txn = ledger.edit_transaction(&user, &id, &draft)?;
    println!("Updated transaction {}: {} on {}", txn.id, txn.amount, txn.date);
    Ok(())
}

fn rm(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let user = principal(sub)?;
    let id = trimmed(sub, "id").unwrap_or_default();
    let txn = ledger.delete_transaction(&user, &id)?;
    println!("Removed transaction {} ({})", txn.id, txn.amount);
    Ok(())
}

fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ledger, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                let t = &r.transaction;
                vec![
                    t.date.to_string(),
                    r.wallet_name.clone(),
                    t.kind.as_str().to_string(),
                    t.amount.to_string(),
                    t.category.clone(),
                    t.description.clone().unwrap_or_default(),
                    t.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Wallet", "Type", "Amount", "Category", "Description", "ID"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn query_rows(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let user = principal(sub)?;
    let kind = match trimmed(sub, "type") {
        Some(t) => Some(t.parse::<TransactionType>()?),
        None => None,
    };
    let since = match trimmed(sub, "since") {
        Some(s) => Some(parse_date(&s)?),
        None => None,
    };
    let filter = TransactionFilter {
        wallet_id: trimmed(sub, "wallet"),
        kind,
        since,
        limit: sub.get_one::<usize>("limit").copied(),
    };
    Ok(ledger.list_transactions(&user, &filter)?)
}
