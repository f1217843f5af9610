// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    Fiat,
    Crypto,
    Stock,
}

impl WalletKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fiat => "fiat",
            Self::Crypto => "crypto",
            Self::Stock => "stock",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fiat" => Ok(Self::Fiat),
            "crypto" => Ok(Self::Crypto),
            "stock" => Ok(Self::Stock),
            other => Err(LedgerError::invalid(format!(
                "unknown wallet kind '{}', expected fiat|crypto|stock",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub kind: WalletKind,
    pub currency: String,
    pub color: String,
    pub icon: String,
    /// Cached sum of the signed amounts of every transaction in this wallet.
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Display label derived from the sign of an amount. Never used for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Outcome,
}

impl TransactionType {
    pub fn of(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Income
        } else {
            Self::Outcome
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Outcome => "outcome",
        }
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "outcome" | "expense" => Ok(Self::Outcome),
            other => Err(LedgerError::invalid(format!(
                "unknown transaction type '{}', expected income|outcome",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub wallet_id: String,
    /// Signed: positive is a credit, negative a debit.
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Transaction joined with the name of its wallet, as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub wallet_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub current_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn total_value(&self) -> Decimal {
        self.quantity * self.current_price
    }
}

/// Result of comparing a wallet's stored balance with the sum of its transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Audit {
    pub wallet_id: String,
    pub expected: Decimal,
    pub actual: Decimal,
    /// `actual - expected`; zero when the wallet is consistent.
    pub drift: Decimal,
    pub corrected: bool,
}

impl Audit {
    pub fn is_consistent(&self) -> bool {
        self.drift.is_zero()
    }
}
