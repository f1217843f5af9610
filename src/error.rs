// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors surfaced by the ledger engine and the owner-scoped stores.
///
/// Only `Conflict` is retried inside the engine; every other kind is terminal
/// for the call that produced it.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} '{id}' does not belong to the current user")]
    Forbidden { entity: &'static str, id: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Concurrent modification; safe to retry after re-reading state.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    StorageFailure(#[source] rusqlite::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn forbidden(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Forbidden {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                Self::Conflict(err.to_string())
            }
            _ => Self::StorageFailure(err),
        }
    }
}
