// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Ledger, TransactionFilter};
use crate::portfolio::list_assets;
use crate::utils::{add_amounts, sub_amounts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Range {
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "3M")]
    Quarter,
    #[serde(rename = "1Y")]
    Year,
}

impl Range {
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Week => "1W",
            Self::Month => "1M",
            Self::Quarter => "3M",
            Self::Year => "1Y",
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Range {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1W" => Ok(Self::Week),
            "1M" => Ok(Self::Month),
            "3M" => Ok(Self::Quarter),
            "1Y" => Ok(Self::Year),
            other => Err(LedgerError::invalid(format!(
                "unknown range '{}', expected 1W|1M|3M|1Y",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub range: Range,
    pub since: NaiveDate,
    pub wallets_total: Decimal,
    pub assets_total: Decimal,
    pub net_worth: Decimal,
    pub income: Decimal,
    /// Magnitude of spending in the range.
    pub outcome: Decimal,
    pub profit: Decimal,
}

/// Net worth across all wallets and assets, plus cash flow for transactions
/// dated on or after `today - range`.
pub fn summarize(
    ledger: &Ledger,
    principal: &str,
    range: Range,
    today: NaiveDate,
) -> LedgerResult<Summary> {
    let wallets_total = ledger
        .list_wallets(principal)?
        .iter()
        .try_fold(Decimal::ZERO, |acc, w| add_amounts(acc, w.balance))?;
    let assets_total = list_assets(ledger.connection(), principal)?
        .iter()
        .try_fold(Decimal::ZERO, |acc, a| {
            let value = a
                .quantity
                .checked_mul(a.current_price)
                .ok_or_else(|| LedgerError::invalid("asset value out of range"))?;
            add_amounts(acc, value)
        })?;

    let since = today - Duration::days(range.days());
    let filter = TransactionFilter {
        since: Some(since),
        ..Default::default()
    };
    let mut income = Decimal::ZERO;
    let mut outcome = Decimal::ZERO;
    for row in ledger.list_transactions(principal, &filter)? {
        let amount = row.transaction.amount;
        if amount > Decimal::ZERO {
            income = add_amounts(income, amount)?;
        } else {
            outcome = add_amounts(outcome, amount.abs())?;
        }
    }

    Ok(Summary {
        range,
        since,
        wallets_total,
        assets_total,
        net_worth: add_amounts(wallets_total, assets_total)?,
        income,
        outcome,
        profit: sub_amounts(income, outcome)?,
    })
}
