// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true)
}

fn amount_arg() -> Arg {
    Arg::new("amount")
        .long("amount")
        .allow_negative_numbers(true)
        .help("Signed amount: positive is income, negative is spending")
}

fn wallet_cmd() -> Command {
    Command::new("wallet")
        .about("Manage wallets")
        .subcommand(
            Command::new("add")
                .about("Create a wallet with a zero balance")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("fiat")
                        .help("fiat | crypto | stock"),
                )
                .arg(
                    Arg::new("currency")
                        .long("currency")
                        .help("Defaults to the configured default currency"),
                )
                .arg(Arg::new("color").long("color").default_value(""))
                .arg(Arg::new("icon").long("icon").default_value("")),
        )
        .subcommand(json_flags(Command::new("list").about("List your wallets")))
        .subcommand(
            Command::new("edit")
                .about("Rename or restyle a wallet")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("kind").long("kind"))
                .arg(Arg::new("color").long("color"))
                .arg(Arg::new("icon").long("icon")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a wallet and all of its transactions")
                .arg(id_arg()),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and manage transactions")
        .subcommand(
            Command::new("add")
                .about("Post a transaction to a wallet")
                .arg(Arg::new("wallet").long("wallet").required(true))
                .arg(amount_arg().required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("description").long("description"))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("YYYY-MM-DD, defaults to today"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(Arg::new("wallet").long("wallet"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help("income | outcome"),
                )
                .arg(Arg::new("since").long("since").help("YYYY-MM-DD"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("edit")
                .about("Change a transaction; unspecified fields keep their value")
                .arg(id_arg())
                .arg(Arg::new("wallet").long("wallet"))
                .arg(amount_arg())
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(Command::new("rm").about("Delete a transaction").arg(id_arg()))
}

fn asset_cmd() -> Command {
    Command::new("asset")
        .about("Track investment assets")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("symbol").long("symbol").required(true))
                .arg(Arg::new("quantity").long("quantity").required(true))
                .arg(Arg::new("price").long("price").required(true)),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("symbol").long("symbol"))
                .arg(Arg::new("quantity").long("quantity"))
                .arg(Arg::new("price").long("price")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

pub fn build_cli() -> Command {
    Command::new("walletbook")
        .version(clap::crate_version!())
        .about("Wallets, transactions and assets with a consistent balance ledger")
        .arg(
            Arg::new("user")
                .long("user")
                .env("WALLETBOOK_USER")
                .global(true)
                .help("Identity every operation is performed for"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(wallet_cmd())
        .subcommand(tx_cmd())
        .subcommand(asset_cmd())
        .subcommand(json_flags(
            Command::new("audit")
                .about("Compare wallet balances with their transactions")
                .arg(Arg::new("wallet").long("wallet"))
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Reset drifted balances to the transaction sum"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("summary")
                .about("Net worth and cash flow")
                .arg(
                    Arg::new("range")
                        .long("range")
                        .default_value("1M")
                        .help("1W | 1M | 3M | 1Y"),
                ),
        ))
        .subcommand(
            Command::new("settings").about("Preferences").subcommand(
                Command::new("currency")
                    .about("Set the currency given to new wallets")
                    .arg(Arg::new("currency").required(true)),
            ),
        )
}
