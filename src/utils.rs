// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

pub const FALLBACK_CURRENCY: &str = "PLN";

pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::invalid(format!("invalid date '{}', expected YYYY-MM-DD", s.trim()))
    })
}

pub fn parse_decimal(s: &str) -> LedgerResult<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| LedgerError::invalid(format!("invalid decimal '{}'", s.trim())))
}

/// `a + b`, or `InvalidArgument` when the result does not fit in a `Decimal`.
pub fn add_amounts(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| LedgerError::invalid("balance out of range"))
}

/// `a - b`, or `InvalidArgument` when the result does not fit in a `Decimal`.
pub fn sub_amounts(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| LedgerError::invalid("balance out of range"))
}

/// Reads a decimal stored as TEXT.
pub fn decimal_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", d.round_dp(2), ccy)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn get_default_currency(conn: &Connection) -> LedgerResult<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='default_currency'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| FALLBACK_CURRENCY.to_string()))
}

pub fn set_default_currency(conn: &Connection, ccy: &str) -> LedgerResult<String> {
    let ccy = ccy.trim().to_uppercase();
    if ccy.is_empty() || !ccy.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LedgerError::invalid(format!("invalid currency code '{}'", ccy)));
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('default_currency', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![ccy],
    )?;
    Ok(ccy)
}
