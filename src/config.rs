// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB: &str = "WALLETBOOK_DB";
pub const ENV_BUSY_TIMEOUT_MS: &str = "WALLETBOOK_BUSY_TIMEOUT_MS";
pub const ENV_MAX_ATTEMPTS: &str = "WALLETBOOK_MAX_ATTEMPTS";

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
    /// Total attempts for an operation that keeps hitting `Conflict`.
    pub max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_path = match env::var_os(ENV_DB) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => crate::db::db_path()?,
        };
        let busy_timeout = match env::var(ENV_BUSY_TIMEOUT_MS) {
            Ok(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid {} '{}'", ENV_BUSY_TIMEOUT_MS, raw))?,
            ),
            Err(_) => DEFAULT_BUSY_TIMEOUT,
        };
        let max_attempts = match env::var(ENV_MAX_ATTEMPTS) {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid {} '{}'", ENV_MAX_ATTEMPTS, raw))?
                .max(1),
            Err(_) => DEFAULT_MAX_ATTEMPTS,
        };
        Ok(Self {
            db_path,
            busy_timeout,
            max_attempts,
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}
