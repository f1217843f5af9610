// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use walletbook::config::Config;
use walletbook::ledger::{Ledger, NewWallet, TransactionDraft};
use walletbook::models::WalletKind;
use walletbook::LedgerError;

const USER: &str = "tabs";

fn shared_db() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config::at(dir.path().join("walletbook.sqlite"));
    cfg.busy_timeout = Duration::from_secs(10);
    cfg.max_attempts = 10;
    (dir, cfg)
}

fn new_wallet(ledger: &mut Ledger) -> String {
    ledger
        .create_wallet(
            USER,
            NewWallet {
                name: "Shared".into(),
                kind: WalletKind::Fiat,
                currency: None,
                color: String::new(),
                icon: String::new(),
            },
        )
        .unwrap()
        .id
}

fn one(wallet_id: &str, amount: Decimal) -> TransactionDraft {
    TransactionDraft {
        wallet_id: wallet_id.to_string(),
        amount,
        category: "tab".into(),
        description: None,
        date: "2025-05-05".into(),
    }
}

#[test]
fn concurrent_creates_on_one_wallet_lose_no_updates() {
    let (_dir, cfg) = shared_db();
    let mut setup = Ledger::open(&cfg).unwrap();
    let wallet_id = new_wallet(&mut setup);

    let threads = 4;
    let per_thread = 25;
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cfg = cfg.clone();
            let wallet_id = wallet_id.clone();
            thread::spawn(move || {
                let mut ledger = Ledger::open(&cfg).unwrap();
                for _ in 0..per_thread {
                    ledger
                        .create_transaction(USER, &one(&wallet_id, Decimal::ONE))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let audit = setup.audit_wallet(&wallet_id).unwrap();
    assert_eq!(audit.actual, Decimal::from(threads * per_thread));
    assert!(audit.drift.is_zero());
}

#[test]
fn concurrent_mixed_operations_keep_balance_consistent() {
    let (_dir, cfg) = shared_db();
    let mut setup = Ledger::open(&cfg).unwrap();
    let a = new_wallet(&mut setup);
    let b = new_wallet(&mut setup);

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let cfg = cfg.clone();
            let (a, b) = (a.clone(), b.clone());
            thread::spawn(move || {
                let mut ledger = Ledger::open(&cfg).unwrap();
                for n in 0..15 {
                    let amount = Decimal::new(100 + i * 10 + n, 2);
                    let t = ledger.create_transaction(USER, &one(&a, amount)).unwrap();
                    if n % 2 == 0 {
                        ledger
                            .edit_transaction(USER, &t.id, &one(&b, -amount))
                            .unwrap();
                    }
                    if n % 5 == 0 {
                        ledger.delete_transaction(USER, &t.id).unwrap();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for id in [&a, &b] {
        assert!(setup.audit_wallet(id).unwrap().drift.is_zero());
    }
}

#[test]
fn locked_database_surfaces_conflict_without_partial_write() {
    let (_dir, mut cfg) = shared_db();
    cfg.busy_timeout = Duration::ZERO;
    cfg.max_attempts = 2;
    let mut ledger = Ledger::open(&cfg).unwrap();
    let wallet_id = new_wallet(&mut ledger);

    let holder = Connection::open(&cfg.db_path).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE").unwrap();

    let err = ledger
        .create_transaction(USER, &one(&wallet_id, Decimal::TEN))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)), "{:?}", err);
    assert!(err.is_retryable());

    holder.execute_batch("ROLLBACK").unwrap();
    let audit = ledger.audit_wallet(&wallet_id).unwrap();
    assert_eq!(audit.actual, Decimal::ZERO);
    assert_eq!(audit.expected, Decimal::ZERO);

    // Lock released: the same call now goes through.
    ledger
        .create_transaction(USER, &one(&wallet_id, Decimal::TEN))
        .unwrap();
    assert_eq!(
        ledger.get_wallet(USER, &wallet_id).unwrap().balance,
        Decimal::TEN
    );
}
