// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{principal, trimmed};
use crate::portfolio::{AssetPatch, NewAsset, create_asset, delete_asset, list_assets, update_asset};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = principal(sub)?;
            let asset = create_asset(
                conn,
                &user,
                NewAsset {
                    name: trimmed(sub, "name").unwrap_or_default(),
                    symbol: trimmed(sub, "symbol").unwrap_or_default(),
                    quantity: parse_decimal(&trimmed(sub, "quantity").unwrap_or_default())?,
                    current_price: parse_decimal(&trimmed(sub, "price").unwrap_or_default())?,
                },
            )?;
            println!(
                "Added asset {} ({}) x {} @ {} id {}",
                asset.symbol, asset.name, asset.quantity, asset.current_price, asset.id
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => {
            let user = principal(sub)?;
            let id = trimmed(sub, "id").unwrap_or_default();
            let quantity = trimmed(sub, "quantity")
                .map(|q| parse_decimal(&q))
                .transpose()?;
            let current_price = trimmed(sub, "price").map(|p| parse_decimal(&p)).transpose()?;
            let asset = update_asset(
                conn,
                &user,
                &id,
                AssetPatch {
                    name: trimmed(sub, "name"),
                    symbol: trimmed(sub, "symbol"),
                    quantity,
                    current_price,
                },
            )?;
            println!(
                "Updated asset {}: {} x {} = {}",
                asset.symbol,
                asset.quantity,
                asset.current_price,
                asset.total_value().round_dp(2)
            );
        }
        Some(("rm", sub)) => {
            let user = principal(sub)?;
            let id = trimmed(sub, "id").unwrap_or_default();
            let asset = delete_asset(conn, &user, &id)?;
            println!("Removed asset {}", asset.symbol);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct AssetView {
    #[serde(flatten)]
    asset: crate::models::Asset,
    total_value: rust_decimal::Decimal,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = principal(sub)?;
    let views: Vec<AssetView> = list_assets(conn, &user)?
        .into_iter()
        .map(|a| AssetView {
            total_value: a.total_value(),
            asset: a,
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &views)? {
        let rows = views
            .iter()
            .map(|v| {
                vec![
                    v.asset.id.clone(),
                    v.asset.symbol.clone(),
                    v.asset.name.clone(),
                    v.asset.quantity.to_string(),
                    v.asset.current_price.to_string(),
                    v.total_value.round_dp(2).to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Symbol", "Name", "Quantity", "Price", "Value"], rows)
        );
    }
    Ok(())
}
