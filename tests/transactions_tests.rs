// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use walletbook::commands::{audit, transactions, wallets};
use walletbook::ledger::{Ledger, NewWallet, TransactionDraft};
use walletbook::models::WalletKind;
use walletbook::{cli, db};

fn setup() -> (Ledger, String) {
    let mut ledger = Ledger::new(db::open_in_memory().unwrap());
    let w = ledger
        .create_wallet(
            "u1",
            NewWallet {
                name: "A1".into(),
                kind: WalletKind::Fiat,
                currency: Some("usd".into()),
                color: String::new(),
                icon: String::new(),
            },
        )
        .unwrap();
    for i in 1..=3 {
        ledger
            .create_transaction(
                "u1",
                &TransactionDraft {
                    wallet_id: w.id.clone(),
                    amount: Decimal::from(-10),
                    category: "Cat1".into(),
                    description: None,
                    date: format!("2025-01-0{}", i),
                },
            )
            .unwrap();
    }
    (ledger, w.id)
}

fn sub_matches(args: &[&str], noun: &str) -> clap::ArgMatches {
    let matches = cli::build_cli().get_matches_from(args.iter().copied());
    match matches.subcommand() {
        Some((name, m)) if name == noun => m.clone(),
        _ => panic!("no {} subcommand", noun),
    }
}

#[test]
fn list_limit_respected() {
    let (ledger, _) = setup();
    let tx_m = sub_matches(
        &["walletbook", "--user", "u1", "tx", "list", "--limit", "2"],
        "tx",
    );
    if let Some(("list", list_m)) = tx_m.subcommand() {
        let rows = transactions::query_rows(&ledger, list_m).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].transaction.date.to_string(), "2025-01-03");
        assert_eq!(rows[0].wallet_name, "A1");
    } else {
        panic!("no list subcommand");
    }
}

#[test]
fn tx_add_accepts_negative_amount_and_trims() {
    let (mut ledger, wallet_id) = setup();
    let tx_m = sub_matches(
        &[
            "walletbook",
            "--user",
            "u1",
            "tx",
            "add",
            "--wallet",
            &format!(" {} ", wallet_id),
            "--amount",
            "-2.75",
            "--category",
            " Coffee ",
            "--date",
            " 2025-01-04 ",
        ],
        "tx",
    );
    transactions::handle(&mut ledger, &tx_m).unwrap();

    let w = ledger.get_wallet("u1", &wallet_id).unwrap();
    assert_eq!(w.balance, "-32.75".parse::<Decimal>().unwrap());
    assert_eq!(w.currency, "USD");
}

#[test]
fn tx_edit_keeps_unspecified_fields() {
    let (mut ledger, wallet_id) = setup();
    let first = ledger
        .list_transactions("u1", &Default::default())
        .unwrap()
        .remove(0)
        .transaction;

    let tx_m = sub_matches(
        &[
            "walletbook", "--user", "u1", "tx", "edit", "--id", &first.id, "--amount", "-15",
        ],
        "tx",
    );
    transactions::handle(&mut ledger, &tx_m).unwrap();

    let edited = ledger.get_transaction("u1", &first.id).unwrap();
    assert_eq!(edited.amount, Decimal::from(-15));
    assert_eq!(edited.category, "Cat1");
    assert_eq!(edited.date, first.date);
    assert_eq!(
        ledger.get_wallet("u1", &wallet_id).unwrap().balance,
        Decimal::from(-35)
    );
}

#[test]
fn tx_commands_require_a_user() {
    let (mut ledger, _) = setup();
    let cmd = cli::build_cli();
    let matches = cmd
        .try_get_matches_from(["walletbook", "tx", "rm", "--id", "x"])
        .unwrap();
    if std::env::var_os("WALLETBOOK_USER").is_some() {
        return;
    }
    if let Some(("tx", tx_m)) = matches.subcommand() {
        let err = transactions::handle(&mut ledger, tx_m).unwrap_err();
        assert!(err.to_string().contains("No user given"));
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn wallet_rm_from_cli_cascades() {
    let (mut ledger, wallet_id) = setup();
    let wallet_m = sub_matches(
        &["walletbook", "--user", "u1", "wallet", "rm", "--id", &wallet_id],
        "wallet",
    );
    wallets::handle(&mut ledger, &wallet_m).unwrap();

    let left: i64 = ledger
        .connection()
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
}

#[test]
fn audit_fix_repairs_drift_for_callers_wallets() {
    let (mut ledger, wallet_id) = setup();
    ledger
        .connection()
        .execute("UPDATE wallets SET balance='999' WHERE id=?1", [&wallet_id])
        .unwrap();

    let audit_m = sub_matches(&["walletbook", "--user", "u1", "audit", "--fix"], "audit");
    let audits = audit::run(&mut ledger, &audit_m).unwrap();
    assert_eq!(audits.len(), 1);
    assert!(audits[0].corrected);
    assert_eq!(audits[0].drift, Decimal::from(1029));
    assert_eq!(
        ledger.get_wallet("u1", &wallet_id).unwrap().balance,
        Decimal::from(-30)
    );

    let other_m = sub_matches(&["walletbook", "--user", "u2", "audit"], "audit");
    assert!(audit::run(&mut ledger, &other_m).unwrap().is_empty());
}
