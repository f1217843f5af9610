// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

pub mod assets;
pub mod audit;
pub mod settings;
pub mod summary;
pub mod transactions;
pub mod wallets;

/// The principal every command acts for, from `--user` or `WALLETBOOK_USER`.
pub fn principal(m: &clap::ArgMatches) -> Result<String> {
    m.get_one::<String>("user")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("No user given; pass --user or set WALLETBOOK_USER")
}

pub(crate) fn trimmed(m: &clap::ArgMatches, id: &str) -> Option<String> {
    m.get_one::<String>(id).map(|s| s.trim().to_string())
}
