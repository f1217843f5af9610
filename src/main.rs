// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use walletbook::{cli, commands, config::Config, ledger::Ledger, logging};

fn main() -> Result<()> {
    logging::init();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::from_env()?;
    let mut ledger = Ledger::open(&cfg)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path.display());
        }
        Some(("wallet", sub)) => commands::wallets::handle(&mut ledger, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut ledger, sub)?,
        Some(("asset", sub)) => commands::assets::handle(ledger.connection(), sub)?,
        Some(("audit", sub)) => commands::audit::handle(&mut ledger, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&ledger, sub)?,
        Some(("settings", sub)) => commands::settings::handle(ledger.connection(), sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
