// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{principal, trimmed};
use crate::ledger::Ledger;
use crate::models::Audit;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &mut Ledger, m: &clap::ArgMatches) -> Result<()> {
    let audits = run(ledger, m)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &audits)? {
        return Ok(());
    }
    let drifted: Vec<&Audit> = audits.iter().filter(|a| !a.is_consistent()).collect();
    if drifted.is_empty() {
        println!("✅ audit: {} wallet(s), no drift", audits.len());
        return Ok(());
    }
    let rows = drifted
        .iter()
        .map(|a| {
            vec![
                a.wallet_id.clone(),
                a.actual.to_string(),
                a.expected.to_string(),
                a.drift.to_string(),
                if a.corrected { "fixed" } else { "" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Wallet", "Stored", "Expected", "Drift", ""], rows)
    );
    Ok(())
}

/// Audits the caller's wallets, or one wallet with `--wallet`. With `--fix`
/// drifted balances are reset to the sum of their transactions.
pub fn run(ledger: &mut Ledger, m: &clap::ArgMatches) -> Result<Vec<Audit>> {
    let user = principal(m)?;
    let fix = m.get_flag("fix");
    let ids: Vec<String> = match trimmed(m, "wallet") {
        Some(id) => vec![ledger.get_wallet(&user, &id)?.id],
        None => ledger
            .list_wallets(&user)?
            .into_iter()
            .map(|w| w.id)
            .collect(),
    };
    let mut audits = Vec::with_capacity(ids.len());
    for id in ids {
        let audit = if fix {
            ledger.reconcile_wallet(&id)?
        } else {
            ledger.audit_wallet(&id)?
        };
        audits.push(audit);
    }
    Ok(audits)
}
