// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Investment assets held by a user. Not part of the wallet balance ledger;
//! their value only feeds the net worth summary.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Asset;
use crate::utils::{decimal_col, new_id};

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub current_price: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub quantity: Option<Decimal>,
    pub current_price: Option<Decimal>,
}

fn asset_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        name: r.get(2)?,
        symbol: r.get(3)?,
        quantity: decimal_col(r, 4)?,
        current_price: decimal_col(r, 5)?,
        created_at: r.get(6)?,
    })
}

fn non_empty(field: &str, v: &str) -> LedgerResult<String> {
    let v = v.trim();
    if v.is_empty() {
        return Err(LedgerError::invalid(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

fn non_negative(field: &str, v: Decimal) -> LedgerResult<Decimal> {
    if v < Decimal::ZERO {
        return Err(LedgerError::invalid(format!("{} must not be negative", field)));
    }
    Ok(v)
}

/// Quantity times price has to fit in a `Decimal` so `Asset::total_value` cannot overflow.
fn valued(asset: Asset) -> LedgerResult<Asset> {
    if asset.quantity.checked_mul(asset.current_price).is_none() {
        return Err(LedgerError::invalid("asset value out of range"));
    }
    Ok(asset)
}

pub fn create_asset(conn: &Connection, principal: &str, new: NewAsset) -> LedgerResult<Asset> {
    if principal.trim().is_empty() {
        return Err(LedgerError::invalid("principal is required"));
    }
    let asset = valued(Asset {
        id: new_id(),
        owner_id: principal.to_string(),
        name: non_empty("asset name", &new.name)?,
        symbol: non_empty("asset symbol", &new.symbol)?.to_uppercase(),
        quantity: non_negative("quantity", new.quantity)?,
        current_price: non_negative("current price", new.current_price)?,
        created_at: Utc::now(),
    })?;
    conn.execute(
        "INSERT INTO assets(id, owner_id, name, symbol, quantity, current_price, created_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            asset.id,
            asset.owner_id,
            asset.name,
            asset.symbol,
            asset.quantity.to_string(),
            asset.current_price.to_string(),
            asset.created_at
        ],
    )?;
    Ok(asset)
}

/// Newest first, like the dashboard shows them.
pub fn list_assets(conn: &Connection, principal: &str) -> LedgerResult<Vec<Asset>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, symbol, quantity, current_price, created_at
         FROM assets WHERE owner_id=?1 ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![principal], asset_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get_asset(conn: &Connection, principal: &str, asset_id: &str) -> LedgerResult<Asset> {
    let asset = conn
        .query_row(
            "SELECT id, owner_id, name, symbol, quantity, current_price, created_at
             FROM assets WHERE id=?1",
            params![asset_id],
            asset_from_row,
        )
        .optional()?
        .ok_or_else(|| LedgerError::not_found("asset", asset_id))?;
    if asset.owner_id != principal {
        return Err(LedgerError::forbidden("asset", asset_id));
    }
    Ok(asset)
}

pub fn update_asset(
    conn: &Connection,
    principal: &str,
    asset_id: &str,
    patch: AssetPatch,
) -> LedgerResult<Asset> {
    let mut asset = get_asset(conn, principal, asset_id)?;
    if let Some(n) = &patch.name {
        asset.name = non_empty("asset name", n)?;
    }
    if let Some(s) = &patch.symbol {
        asset.symbol = non_empty("asset symbol", s)?.to_uppercase();
    }
    if let Some(q) = patch.quantity {
        asset.quantity = non_negative("quantity", q)?;
    }
    if let Some(p) = patch.current_price {
        asset.current_price = non_negative("current price", p)?;
    }
    let asset = valued(asset)?;
    conn.execute(
        "UPDATE assets SET name=?1, symbol=?2, quantity=?3, current_price=?4 WHERE id=?5",
        params![
            asset.name,
            asset.symbol,
            asset.quantity.to_string(),
            asset.current_price.to_string(),
            asset.id
        ],
    )?;
    Ok(asset)
}

pub fn delete_asset(conn: &Connection, principal: &str, asset_id: &str) -> LedgerResult<Asset> {
    let asset = get_asset(conn, principal, asset_id)?;
    conn.execute("DELETE FROM assets WHERE id=?1", params![asset.id])?;
    Ok(asset)
}
