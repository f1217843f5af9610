// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{principal, trimmed};
use crate::ledger::{Ledger, NewWallet, WalletPatch};
use crate::models::WalletKind;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

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
    let kind = trimmed(sub, "kind").unwrap_or_default().parse::<WalletKind>()?;
    let wallet = ledger.create_wallet(
        &user,
        NewWallet {
            name: trimmed(sub, "name").unwrap_or_default(),
            kind,
            currency: trimmed(sub, "currency"),
            color: trimmed(sub, "color").unwrap_or_default(),
            icon: trimmed(sub, "icon").unwrap_or_default(),
        },
    )?;
    println!(
        "Added wallet '{}' ({}, {}) id {}",
        wallet.name, wallet.kind, wallet.currency, wallet.id
    );
    Ok(())
}

fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let user = principal(sub)?;
    let wallets = ledger.list_wallets(&user)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &wallets)? {
        let rows = wallets
            .iter()
            .map(|w| {
                vec![
                    w.id.clone(),
                    w.name.clone(),
                    w.kind.to_string(),
                    fmt_money(&w.balance, &w.currency),
                    w.created_at.format("%Y-%m-%d").to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Kind", "Balance", "Created"], rows)
        );
    }
    Ok(())
}

fn edit(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let user = principal(sub)?;
    let id = trimmed(sub, "id").unwrap_or_default();
    let kind = match trimmed(sub, "kind") {
        Some(k) => Some(k.parse::<WalletKind>()?),
        None => None,
    };
    let wallet = ledger.edit_wallet(
        &user,
        &id,
        WalletPatch {
            name: trimmed(sub, "name"),
            kind,
            color: trimmed(sub, "color"),
            icon: trimmed(sub, "icon"),
        },
    )?;
    println!("Updated wallet '{}' ({})", wallet.name, wallet.kind);
    Ok(())
}

fn rm(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let user = principal(sub)?;
    let id = trimmed(sub, "id").unwrap_or_default();
    let removal = ledger.delete_wallet(&user, &id)?;
    println!(
        "Removed wallet '{}' and {} transaction(s)",
        removal.wallet.name, removal.transactions_removed
    );
    Ok(())
}
