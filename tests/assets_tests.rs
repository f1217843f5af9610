// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use walletbook::db;
use walletbook::portfolio::{
    AssetPatch, NewAsset, create_asset, delete_asset, get_asset, list_assets, update_asset,
};
use walletbook::LedgerError;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn btc() -> NewAsset {
    NewAsset {
        name: " Bitcoin ".into(),
        symbol: "btc".into(),
        quantity: dec("0.5"),
        current_price: dec("250000"),
    }
}

#[test]
fn asset_symbol_uppercased_and_value_derived() {
    let conn = setup();
    let a = create_asset(&conn, "alice", btc()).unwrap();
    assert_eq!(a.symbol, "BTC");
    assert_eq!(a.name, "Bitcoin");
    assert_eq!(a.total_value(), dec("125000"));

    let stored = get_asset(&conn, "alice", &a.id).unwrap();
    assert_eq!(stored, a);
}

#[test]
fn assets_are_scoped_to_their_owner() {
    let conn = setup();
    let a = create_asset(&conn, "alice", btc()).unwrap();
    create_asset(
        &conn,
        "bob",
        NewAsset {
            name: "Apple".into(),
            symbol: "aapl".into(),
            quantity: dec("3"),
            current_price: dec("190.10"),
        },
    )
    .unwrap();

    assert_eq!(list_assets(&conn, "alice").unwrap().len(), 1);
    assert!(matches!(
        get_asset(&conn, "bob", &a.id),
        Err(LedgerError::Forbidden { .. })
    ));
    assert!(matches!(
        delete_asset(&conn, "bob", &a.id),
        Err(LedgerError::Forbidden { .. })
    ));
    assert!(matches!(
        get_asset(&conn, "alice", "missing"),
        Err(LedgerError::NotFound { .. })
    ));
    assert!(get_asset(&conn, "alice", &a.id).is_ok());
}

#[test]
fn update_changes_only_given_fields() {
    let conn = setup();
    let a = create_asset(&conn, "alice", btc()).unwrap();
    let updated = update_asset(
        &conn,
        "alice",
        &a.id,
        AssetPatch {
            current_price: Some(dec("260000")),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.quantity, dec("0.5"));
    assert_eq!(updated.total_value(), dec("130000"));
    assert_eq!(get_asset(&conn, "alice", &a.id).unwrap(), updated);
}

#[test]
fn negative_quantity_or_blank_symbol_rejected() {
    let conn = setup();
    let mut bad = btc();
    bad.quantity = dec("-1");
    assert!(matches!(
        create_asset(&conn, "alice", bad),
        Err(LedgerError::InvalidArgument(_))
    ));
    let mut blank = btc();
    blank.symbol = "  ".into();
    assert!(matches!(
        create_asset(&conn, "alice", blank),
        Err(LedgerError::InvalidArgument(_))
    ));
    assert!(list_assets(&conn, "alice").unwrap().is_empty());
}

#[test]
fn delete_removes_asset() {
    let conn = setup();
    let a = create_asset(&conn, "alice", btc()).unwrap();
    delete_asset(&conn, "alice", &a.id).unwrap();
    assert!(list_assets(&conn, "alice").unwrap().is_empty());
}

#[test]
fn unrepresentable_asset_value_rejected() {
    let conn = setup();
    let mut huge = btc();
    huge.quantity = Decimal::MAX;
    huge.current_price = dec("2");
    assert!(matches!(
        create_asset(&conn, "alice", huge),
        Err(LedgerError::InvalidArgument(_))
    ));

    let a = create_asset(&conn, "alice", btc()).unwrap();
    assert!(matches!(
        update_asset(
            &conn,
            "alice",
            &a.id,
            AssetPatch {
                quantity: Some(Decimal::MAX),
                ..Default::default()
            },
        ),
        Err(LedgerError::InvalidArgument(_))
    ));
    assert_eq!(get_asset(&conn, "alice", &a.id).unwrap(), a);
}
