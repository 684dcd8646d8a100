// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .required(true)
        .help("Month as YYYY-MM")
}

fn file_arg() -> Arg {
    Arg::new("file")
        .long("file")
        .help("Read expenses from a .json or .csv file instead of the API")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON")
}

fn jsonl_arg() -> Arg {
    Arg::new("jsonl")
        .long("jsonl")
        .action(ArgAction::SetTrue)
        .conflicts_with("json")
        .help("Print one JSON object per line")
}

pub fn build_cli() -> Command {
    Command::new("spendlens")
        .about("Spending totals, category breakdowns, budget status and chart geometry")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show").arg(json_arg()))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets")
                .subcommand(
                    Command::new("set")
                        .arg(month_arg())
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_negative_numbers(true),
                        ),
                )
                .subcommand(Command::new("list").arg(json_arg()))
                .subcommand(
                    Command::new("status")
                        .arg(month_arg())
                        .arg(file_arg())
                        .arg(json_arg()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Spending reports")
                .subcommand(
                    Command::new("total")
                        .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").help("YYYY-MM-DD"))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .action(ArgAction::Append)
                                .value_parser(value_parser!(i64))
                                .help("Category id; repeatable"),
                        )
                        .arg(
                            Arg::new("tag")
                                .long("tag")
                                .action(ArgAction::Append)
                                .value_parser(value_parser!(i64))
                                .help("Tag id; repeatable"),
                        )
                        .arg(file_arg())
                        .arg(json_arg()),
                )
                .subcommand(
                    Command::new("distribution")
                        .arg(month_arg())
                        .arg(file_arg())
                        .arg(json_arg())
                        .arg(jsonl_arg()),
                )
                .subcommand(
                    Command::new("chart")
                        .arg(month_arg())
                        .arg(
                            Arg::new("max-segments")
                                .long("max-segments")
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("palette-size")
                                .long("palette-size")
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("probe")
                                .long("probe")
                                .value_parser(value_parser!(f64))
                                .allow_negative_numbers(true)
                                .help("Report the category under this angle (degrees)"),
                        )
                        .arg(file_arg())
                        .arg(json_arg()),
                ),
        )
}
