// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Wallet ledger engine.
//!
//! The engine is the only writer of `wallets.balance`. Every mutation runs in
//! one `BEGIN IMMEDIATE` transaction that reads the rows it needs, computes the
//! balance deltas from that fresh state and writes the transaction row and the
//! wallet row(s) together. Balance writes are compare-and-set on the value that
//! was read, so a stale delta can never be persisted.

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_MAX_ATTEMPTS};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Audit, Transaction, TransactionRow, TransactionType, Wallet, WalletKind};
use crate::utils::{add_amounts, decimal_col, get_default_currency, new_id, parse_date, sub_amounts};

/// Finest amount precision accepted, in decimal places.
pub const MAX_AMOUNT_SCALE: u32 = 8;

#[derive(Debug, Clone)]
pub struct NewWallet {
    pub name: String,
    pub kind: WalletKind,
    /// Falls back to the `default_currency` setting.
    pub currency: Option<String>,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default)]
pub struct WalletPatch {
    pub name: Option<String>,
    pub kind: Option<WalletKind>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Caller-supplied values for a new or edited transaction.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub wallet_id: String,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl TransactionDraft {
    pub fn from_transaction(t: &Transaction) -> Self {
        Self {
            wallet_id: t.wallet_id.clone(),
            amount: t.amount,
            category: t.category.clone(),
            description: t.description.clone(),
            date: t.date.format("%Y-%m-%d").to_string(),
        }
    }

    fn validate(&self) -> LedgerResult<ValidDraft> {
        let wallet_id = self.wallet_id.trim();
        if wallet_id.is_empty() {
            return Err(LedgerError::invalid("wallet id is required"));
        }
        if self.amount.is_zero() {
            return Err(LedgerError::invalid("amount must be non-zero"));
        }
        if self.amount.scale() > MAX_AMOUNT_SCALE {
            return Err(LedgerError::invalid(format!(
                "amount {} has more than {} decimal places",
                self.amount, MAX_AMOUNT_SCALE
            )));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(LedgerError::invalid("category is required"));
        }
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(ValidDraft {
            wallet_id: wallet_id.to_string(),
            amount: self.amount,
            category: category.to_string(),
            description,
            date: parse_date(&self.date)?,
        })
    }
}

struct ValidDraft {
    wallet_id: String,
    amount: Decimal,
    category: String,
    description: Option<String>,
    date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub wallet_id: Option<String>,
    pub kind: Option<TransactionType>,
    pub since: Option<NaiveDate>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct WalletRemoval {
    pub wallet: Wallet,
    pub transactions_removed: usize,
}

/// Balance adjustments for moving a posting of `old_amount` on `old_wallet`
/// to `new_amount` on `new_wallet`.
///
/// Each wallet appears at most once in the result, so a same-wallet edit is a
/// single `new - old` delta and a no-op edit yields nothing.
pub fn edit_deltas<'a>(
    old_wallet: &'a str,
    old_amount: Decimal,
    new_wallet: &'a str,
    new_amount: Decimal,
) -> LedgerResult<Vec<(&'a str, Decimal)>> {
    if old_wallet == new_wallet {
        let delta = sub_amounts(new_amount, old_amount)?;
        if delta.is_zero() {
            Ok(Vec::new())
        } else {
            Ok(vec![(old_wallet, delta)])
        }
    } else {
        Ok(vec![(old_wallet, -old_amount), (new_wallet, new_amount)])
    }
}

pub struct Ledger {
    conn: Connection,
    max_attempts: u32,
}

impl Ledger {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn open(cfg: &Config) -> anyhow::Result<Self> {
        let conn = crate::db::open_or_init(cfg)?;
        Ok(Self::new(conn).with_max_attempts(cfg.max_attempts))
    }

    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // Wallets

    pub fn create_wallet(&mut self, principal: &str, new: NewWallet) -> LedgerResult<Wallet> {
        require_principal(principal)?;
        let name = required("wallet name", &new.name)?;
        let wallet = self.atomically("create_wallet", |tx| {
            let currency = match new.currency.as_deref().map(str::trim) {
                Some(c) if !c.is_empty() => c.to_uppercase(),
                _ => get_default_currency(tx)?,
            };
            let wallet = Wallet {
                id: new_id(),
                owner_id: principal.to_string(),
                name: name.clone(),
                kind: new.kind,
                currency,
                color: new.color.trim().to_string(),
                icon: new.icon.trim().to_string(),
                balance: Decimal::ZERO,
                created_at: Utc::now(),
            };
            tx.execute(
                "INSERT INTO wallets(id, owner_id, name, kind, currency, color, icon, balance, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    wallet.id,
                    wallet.owner_id,
                    wallet.name,
                    wallet.kind.as_str(),
                    wallet.currency,
                    wallet.color,
                    wallet.icon,
                    wallet.balance.to_string(),
                    wallet.created_at
                ],
            )?;
            Ok(wallet)
        })?;
        debug!(wallet = %wallet.id, owner = principal, "wallet created");
        Ok(wallet)
    }

    /// Updates descriptive fields. The balance is never touched here.
    pub fn edit_wallet(
        &mut self,
        principal: &str,
        wallet_id: &str,
        patch: WalletPatch,
    ) -> LedgerResult<Wallet> {
        let name = patch
            .name
            .as_deref()
            .map(|n| required("wallet name", n))
            .transpose()?;
        self.atomically("edit_wallet", |tx| {
            let mut wallet = owned_wallet(tx, principal, wallet_id)?;
            if let Some(n) = &name {
                wallet.name = n.clone();
            }
            if let Some(k) = patch.kind {
                wallet.kind = k;
            }
            if let Some(c) = &patch.color {
                wallet.color = c.trim().to_string();
            }
            if let Some(i) = &patch.icon {
                wallet.icon = i.trim().to_string();
            }
            tx.execute(
                "UPDATE wallets SET name=?1, kind=?2, color=?3, icon=?4 WHERE id=?5",
                params![
                    wallet.name,
                    wallet.kind.as_str(),
                    wallet.color,
                    wallet.icon,
                    wallet.id
                ],
            )?;
            Ok(wallet)
        })
    }

    /// Deletes the wallet and every transaction posted to it in one unit.
    pub fn delete_wallet(&mut self, principal: &str, wallet_id: &str) -> LedgerResult<WalletRemoval> {
        let removal = self.atomically("delete_wallet", |tx| {
            let wallet = owned_wallet(tx, principal, wallet_id)?;
            let transactions_removed =
                tx.execute("DELETE FROM transactions WHERE wallet_id=?1", params![wallet.id])?;
            tx.execute("DELETE FROM wallets WHERE id=?1", params![wallet.id])?;
            Ok(WalletRemoval {
                wallet,
                transactions_removed,
            })
        })?;
        info!(
            wallet = %removal.wallet.id,
            transactions = removal.transactions_removed,
            "wallet deleted"
        );
        Ok(removal)
    }

    pub fn get_wallet(&self, principal: &str, wallet_id: &str) -> LedgerResult<Wallet> {
        owned_wallet(&self.conn, principal, wallet_id)
    }

    pub fn list_wallets(&self, principal: &str) -> LedgerResult<Vec<Wallet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE owner_id=?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(params![principal], wallet_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // Transactions

    pub fn create_transaction(
        &mut self,
        principal: &str,
        draft: &TransactionDraft,
    ) -> LedgerResult<Transaction> {
        let valid = draft.validate()?;
        let txn = self.atomically("create_transaction", |tx| {
            let wallet = owned_wallet(tx, principal, &valid.wallet_id)?;
            let txn = Transaction {
                id: new_id(),
                wallet_id: wallet.id.clone(),
                amount: valid.amount,
                kind: TransactionType::of(valid.amount),
                category: valid.category.clone(),
                description: valid.description.clone(),
                date: valid.date,
                created_at: Utc::now(),
            };
            tx.execute(
                "INSERT INTO transactions(id, wallet_id, amount, category, description, date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    txn.id,
                    txn.wallet_id,
                    txn.amount.to_string(),
                    txn.category,
                    txn.description,
                    txn.date,
                    txn.created_at
                ],
            )?;
            apply_delta(tx, &wallet, txn.amount)?;
            Ok(txn)
        })?;
        debug!(txn = %txn.id, wallet = %txn.wallet_id, amount = %txn.amount, "transaction created");
        Ok(txn)
    }

    /// Replaces amount, wallet and descriptive fields of a transaction.
    ///
    /// Moving to another wallet requires the target to be owned by the same
    /// principal. All wallet updates and the row update commit together.
    pub fn edit_transaction(
        &mut self,
        principal: &str,
        transaction_id: &str,
        draft: &TransactionDraft,
    ) -> LedgerResult<Transaction> {
        let valid = draft.validate()?;
        let txn = self.atomically("edit_transaction", |tx| {
            let current = load_transaction(tx, transaction_id)?;
            let source = owned_wallet(tx, principal, &current.wallet_id)?;
            let target = if valid.wallet_id == source.id {
                None
            } else {
                Some(owned_wallet(tx, principal, &valid.wallet_id)?)
            };

            for (wallet_id, delta) in
                edit_deltas(&source.id, current.amount, &valid.wallet_id, valid.amount)?
            {
                let wallet = match &target {
                    Some(t) if t.id == wallet_id => t,
                    _ => &source,
                };
                apply_delta(tx, wallet, delta)?;
            }

            tx.execute(
                "UPDATE transactions SET wallet_id=?1, amount=?2, category=?3, description=?4, date=?5
                 WHERE id=?6",
                params![
                    valid.wallet_id,
                    valid.amount.to_string(),
                    valid.category,
                    valid.description,
                    valid.date,
                    current.id
                ],
            )?;
            Ok(Transaction {
                id: current.id,
                wallet_id: valid.wallet_id.clone(),
                amount: valid.amount,
                kind: TransactionType::of(valid.amount),
                category: valid.category.clone(),
                description: valid.description.clone(),
                date: valid.date,
                created_at: current.created_at,
            })
        })?;
        debug!(txn = %txn.id, wallet = %txn.wallet_id, amount = %txn.amount, "transaction edited");
        Ok(txn)
    }

    /// Removes a transaction and reverses its amount on the owning wallet.
    pub fn delete_transaction(
        &mut self,
        principal: &str,
        transaction_id: &str,
    ) -> LedgerResult<Transaction> {
        let txn = self.atomically("delete_transaction", |tx| {
            let txn = load_transaction(tx, transaction_id)?;
            let wallet = owned_wallet(tx, principal, &txn.wallet_id)?;
            apply_delta(tx, &wallet, -txn.amount)?;
            tx.execute("DELETE FROM transactions WHERE id=?1", params![txn.id])?;
            Ok(txn)
        })?;
        debug!(txn = %txn.id, wallet = %txn.wallet_id, "transaction deleted");
        Ok(txn)
    }

    pub fn get_transaction(&self, principal: &str, transaction_id: &str) -> LedgerResult<Transaction> {
        let txn = load_transaction(&self.conn, transaction_id)?;
        let wallet = load_wallet(&self.conn, &txn.wallet_id)?;
        if wallet.owner_id != principal {
            return Err(LedgerError::forbidden("transaction", transaction_id));
        }
        Ok(txn)
    }

    /// Lists the principal's transactions, newest date first.
    pub fn list_transactions(
        &self,
        principal: &str,
        filter: &TransactionFilter,
    ) -> LedgerResult<Vec<TransactionRow>> {
        let mut sql = String::from(
            "SELECT t.id, t.wallet_id, t.amount, t.category, t.description, t.date, t.created_at, w.name
             FROM transactions t JOIN wallets w ON w.id = t.wallet_id
             WHERE w.owner_id = ?",
        );
        let mut params_vec: Vec<String> = vec![principal.to_string()];

        if let Some(wallet_id) = &filter.wallet_id {
            // Surface NotFound/Forbidden instead of an empty list.
            owned_wallet(&self.conn, principal, wallet_id)?;
            sql.push_str(" AND t.wallet_id = ?");
            params_vec.push(wallet_id.clone());
        }
        if let Some(since) = filter.since {
            sql.push_str(" AND t.date >= ?");
            params_vec.push(since.format("%Y-%m-%d").to_string());
        }
        sql.push_str(" ORDER BY t.date DESC, t.created_at DESC, t.id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
            Ok(TransactionRow {
                transaction: transaction_from_row(r)?,
                wallet_name: r.get(7)?,
            })
        })?;

        let mut data = Vec::new();
        for row in rows {
            let row = row?;
            if filter.kind.is_some_and(|k| row.transaction.kind != k) {
                continue;
            }
            if filter.limit.is_some_and(|l| data.len() >= l) {
                break;
            }
            data.push(row);
        }
        Ok(data)
    }

    // Reconciliation

    /// Compares the stored balance with the sum of the wallet's transactions.
    /// Read-only.
    pub fn audit_wallet(&self, wallet_id: &str) -> LedgerResult<Audit> {
        // Deferred transaction so both reads see the same snapshot.
        let tx = self.conn.unchecked_transaction()?;
        let audit = audit_in(&tx, wallet_id)?;
        tx.commit()?;
        Ok(audit)
    }

    /// Audits the wallet and, on drift, resets the balance to the recomputed sum.
    pub fn reconcile_wallet(&mut self, wallet_id: &str) -> LedgerResult<Audit> {
        let audit = self.atomically("reconcile_wallet", |tx| {
            let mut audit = audit_in(tx, wallet_id)?;
            if !audit.is_consistent() {
                let n = tx.execute(
                    "UPDATE wallets SET balance=?1 WHERE id=?2 AND balance=?3",
                    params![
                        audit.expected.to_string(),
                        audit.wallet_id,
                        audit.actual.to_string()
                    ],
                )?;
                if n != 1 {
                    return Err(LedgerError::Conflict(format!(
                        "wallet '{}' changed during reconciliation",
                        audit.wallet_id
                    )));
                }
                audit.corrected = true;
            }
            Ok(audit)
        })?;
        if audit.corrected {
            warn!(
                wallet = %audit.wallet_id,
                expected = %audit.expected,
                actual = %audit.actual,
                drift = %audit.drift,
                "balance drift corrected"
            );
        }
        Ok(audit)
    }

    /// Reconciles every wallet, one short transaction per wallet.
    pub fn reconcile_all(&mut self) -> LedgerResult<Vec<Audit>> {
        let ids: Vec<String> = {
            let mut stmt = self.conn.prepare("SELECT id FROM wallets ORDER BY created_at, id")?;
            let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
            rows.collect::<Result<_, _>>()?
        };
        let mut audits = Vec::with_capacity(ids.len());
        for id in ids {
            match self.reconcile_wallet(&id) {
                Ok(a) => audits.push(a),
                // Deleted between listing and reconciling.
                Err(LedgerError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(audits)
    }

    /// Runs `f` inside `BEGIN IMMEDIATE`, retrying from scratch on `Conflict`.
    fn atomically<T, F>(&mut self, op: &'static str, mut f: F) -> LedgerResult<T>
    where
        F: FnMut(&rusqlite::Transaction<'_>) -> LedgerResult<T>,
    {
        let mut attempt = 1;
        loop {
            match run_immediate(&mut self.conn, &mut f) {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(op, attempt, error = %err, "conflict, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

fn run_immediate<T, F>(conn: &mut Connection, f: &mut F) -> LedgerResult<T>
where
    F: FnMut(&rusqlite::Transaction<'_>) -> LedgerResult<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}

fn require_principal(principal: &str) -> LedgerResult<()> {
    if principal.trim().is_empty() {
        return Err(LedgerError::invalid("principal is required"));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> LedgerResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(LedgerError::invalid(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

const WALLET_COLUMNS: &str = "id, owner_id, name, kind, currency, color, icon, balance, created_at";

fn wallet_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Wallet> {
    let kind: String = r.get(3)?;
    Ok(Wallet {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        name: r.get(2)?,
        kind: kind.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        currency: r.get(4)?,
        color: r.get(5)?,
        icon: r.get(6)?,
        balance: decimal_col(r, 7)?,
        created_at: r.get(8)?,
    })
}

fn transaction_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let amount = decimal_col(r, 2)?;
    Ok(Transaction {
        id: r.get(0)?,
        wallet_id: r.get(1)?,
        amount,
        kind: TransactionType::of(amount),
        category: r.get(3)?,
        description: r.get(4)?,
        date: r.get(5)?,
        created_at: r.get(6)?,
    })
}

fn load_wallet(conn: &Connection, wallet_id: &str) -> LedgerResult<Wallet> {
    conn.query_row(
        &format!("SELECT {WALLET_COLUMNS} FROM wallets WHERE id=?1"),
        params![wallet_id],
        wallet_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("wallet", wallet_id))
}

fn owned_wallet(conn: &Connection, principal: &str, wallet_id: &str) -> LedgerResult<Wallet> {
    let wallet = load_wallet(conn, wallet_id)?;
    if wallet.owner_id != principal {
        return Err(LedgerError::forbidden("wallet", wallet_id));
    }
    Ok(wallet)
}

fn load_transaction(conn: &Connection, transaction_id: &str) -> LedgerResult<Transaction> {
    conn.query_row(
        "SELECT id, wallet_id, amount, category, description, date, created_at
         FROM transactions WHERE id=?1",
        params![transaction_id],
        transaction_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("transaction", transaction_id))
}

/// Adds `delta` to the balance read in `wallet`, failing with `Conflict` if
/// the stored balance is no longer that value.
fn apply_delta(conn: &Connection, wallet: &Wallet, delta: Decimal) -> LedgerResult<Decimal> {
    let next = add_amounts(wallet.balance, delta)?;
    let n = conn.execute(
        "UPDATE wallets SET balance=?1 WHERE id=?2 AND balance=?3",
        params![next.to_string(), wallet.id, wallet.balance.to_string()],
    )?;
    if n != 1 {
        return Err(LedgerError::Conflict(format!(
            "balance of wallet '{}' changed concurrently",
            wallet.id
        )));
    }
    Ok(next)
}

fn audit_in(conn: &Connection, wallet_id: &str) -> LedgerResult<Audit> {
    let wallet = load_wallet(conn, wallet_id)?;
    let mut stmt = conn.prepare("SELECT amount FROM transactions WHERE wallet_id=?1")?;
    let amounts = stmt.query_map(params![wallet.id], |r| decimal_col(r, 0))?;
    let mut expected = Decimal::ZERO;
    for a in amounts {
        expected = add_amounts(expected, a?)?;
    }
    Ok(Audit {
        drift: sub_amounts(wallet.balance, expected)?,
        wallet_id: wallet.id,
        expected,
        actual: wallet.balance,
        corrected: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn same_wallet_edit_is_one_delta() {
        let d = edit_deltas("w1", dec("-250"), "w1", dec("-300")).unwrap();
        assert_eq!(d, vec![("w1", dec("-50"))]);
    }

    #[test]
    fn unchanged_amount_has_no_delta() {
        assert!(edit_deltas("w1", dec("12.50"), "w1", dec("12.50")).unwrap().is_empty());
    }

    #[test]
    fn move_reverses_old_and_posts_new() {
        let d = edit_deltas("a", dec("40"), "b", dec("-15")).unwrap();
        assert_eq!(d, vec![("a", dec("-40")), ("b", dec("-15"))]);
    }

    #[test]
    fn draft_rejects_zero_amount_and_bad_date() {
        let mut draft = TransactionDraft {
            wallet_id: "w".into(),
            amount: Decimal::ZERO,
            category: "food".into(),
            description: None,
            date: "2025-01-01".into(),
        };
        assert!(matches!(draft.validate(), Err(LedgerError::InvalidArgument(_))));
        draft.amount = dec("1");
        draft.date = "2025-13-40".into();
        assert!(matches!(draft.validate(), Err(LedgerError::InvalidArgument(_))));
        draft.date = " 2025-02-28 ".into();
        assert!(draft.validate().is_ok());
        draft.amount = dec("0.000000001");
        assert!(matches!(draft.validate(), Err(LedgerError::InvalidArgument(_))));
        draft.amount = dec("-0.00000001");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn overflowing_same_wallet_delta_is_invalid() {
        assert!(matches!(
            edit_deltas("w1", dec("-1"), "w1", Decimal::MAX),
            Err(LedgerError::InvalidArgument(_))
        ));
        let d = edit_deltas("a", dec("-1"), "b", Decimal::MAX).unwrap();
        assert_eq!(d, vec![("a", dec("1")), ("b", Decimal::MAX)]);
    }

    #[test]
    fn blank_description_is_dropped() {
        let draft = TransactionDraft {
            wallet_id: " w ".into(),
            amount: dec("5"),
            category: " misc ".into(),
            description: Some("   ".into()),
            date: "2025-01-01".into(),
        };
        let v = draft.validate().unwrap();
        assert_eq!(v.wallet_id, "w");
        assert_eq!(v.category, "misc");
        assert_eq!(v.description, None);
    }
}
