// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use walletbook::db;
use walletbook::ledger::{Ledger, NewWallet, TransactionDraft};
use walletbook::models::WalletKind;
use walletbook::portfolio::{NewAsset, create_asset};
use walletbook::summary::{Range, summarize};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (Ledger, String) {
    let mut ledger = Ledger::new(db::open_in_memory().unwrap());
    let w = ledger
        .create_wallet(
            "alice",
            NewWallet {
                name: "Main".into(),
                kind: WalletKind::Fiat,
                currency: None,
                color: String::new(),
                icon: String::new(),
            },
        )
        .unwrap();
    for (amount, date) in [
        ("5000", "2025-01-02"), // outside every range but 1Y
        ("3000", "2025-06-01"),
        ("-120.50", "2025-06-20"),
        ("-80", "2025-06-29"),
        ("200", "2025-06-30"),
    ] {
        ledger
            .create_transaction(
                "alice",
                &TransactionDraft {
                    wallet_id: w.id.clone(),
                    amount: dec(amount),
                    category: "x".into(),
                    description: None,
                    date: date.into(),
                },
            )
            .unwrap();
    }
    create_asset(
        ledger.connection(),
        "alice",
        NewAsset {
            name: "Gold".into(),
            symbol: "xau".into(),
            quantity: dec("2"),
            current_price: dec("1000.25"),
        },
    )
    .unwrap();
    (ledger, w.id)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

#[test]
fn week_range_counts_recent_cash_flow() {
    let (ledger, _) = setup();
    let s = summarize(&ledger, "alice", Range::Week, today()).unwrap();
    assert_eq!(s.since, NaiveDate::from_ymd_opt(2025, 6, 23).unwrap());
    assert_eq!(s.income, dec("200"));
    assert_eq!(s.outcome, dec("80"));
    assert_eq!(s.profit, dec("120"));
}

#[test]
fn net_worth_adds_wallets_and_assets() {
    let (ledger, _) = setup();
    let s = summarize(&ledger, "alice", Range::Month, today()).unwrap();
    assert_eq!(s.wallets_total, dec("7999.50"));
    assert_eq!(s.assets_total, dec("2000.50"));
    assert_eq!(s.net_worth, dec("10000.00"));
    assert_eq!(s.income, dec("3200"));
    assert_eq!(s.outcome, dec("200.50"));
    assert_eq!(s.profit, dec("2999.50"));
}

#[test]
fn year_range_includes_everything() {
    let (ledger, _) = setup();
    let s = summarize(&ledger, "alice", Range::Year, today()).unwrap();
    assert_eq!(s.income, dec("8200"));
}

#[test]
fn other_users_see_an_empty_summary() {
    let (ledger, _) = setup();
    let s = summarize(&ledger, "bob", Range::Quarter, today()).unwrap();
    assert!(s.net_worth.is_zero());
    assert!(s.income.is_zero());
    assert!(s.outcome.is_zero());
}

#[test]
fn range_parses_dashboard_labels() {
    assert_eq!(" 3m ".parse::<Range>().unwrap(), Range::Quarter);
    assert_eq!("1Y".parse::<Range>().unwrap().days(), 365);
    assert!("2W".parse::<Range>().is_err());
}
