// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn period_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("period")
            .long("period")
            .default_value("week")
            .help("day|week|month|quarter|year"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .help("Reference date YYYY-MM-DD (default: today)"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("barberdash")
        .about("Barbershop clients, appointments, ledger and period metrics")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("session")
                .about("Sign in and out as a shop owner")
                .subcommand(
                    Command::new("login")
                        .arg(Arg::new("owner").long("owner").required(true)),
                )
                .subcommand(Command::new("logout"))
                .subcommand(Command::new("whoami")),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-currency")
                        .arg(Arg::new("currency").required(true).help("ISO code, e.g. USD")),
                ),
        )
        .subcommand(
            Command::new("client")
                .about("Manage clients")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("address").long("address")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("address").long("address")),
                )
                .subcommand(json_args(
                    Command::new("list").arg(
                        Arg::new("search")
                            .long("search")
                            .help("Match name or phone digits"),
                    ),
                )),
        )
        .subcommand(
            Command::new("service")
                .about("Manage the service catalog")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("price").long("price").required(true))
                        .arg(
                            Arg::new("duration")
                                .long("duration")
                                .value_parser(value_parser!(u32))
                                .help("Minutes"),
                        )
                        .arg(
                            Arg::new("inactive")
                                .long("inactive")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("price").long("price"))
                        .arg(
                            Arg::new("duration")
                                .long("duration")
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(
                            Arg::new("no-duration")
                                .long("no-duration")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("duration")
                                .help("Clear the stored duration"),
                        )
                        .arg(
                            Arg::new("active")
                                .long("active")
                                .value_parser(value_parser!(bool)),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include inactive services"),
                    ),
                )),
        )
        .subcommand(
            Command::new("appt")
                .about("Manage appointments")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("start").long("start").required(true).help("HH:MM"))
                        .arg(Arg::new("end").long("end").help("HH:MM"))
                        .arg(
                            Arg::new("client")
                                .long("client")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("service")
                                .long("service")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("value")
                                .long("value")
                                .help("Defaults to the service price"),
                        )
                        .arg(Arg::new("notes").long("notes")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("status").long("status"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("status")
                        .arg(id_arg())
                        .arg(Arg::new("status").long("status").required(true)),
                )
                .subcommand(
                    Command::new("complete")
                        .about("Mark completed and book its value as income")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record income and expenses")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .help("income|expense"),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("value").long("value").required(true))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(
                            Arg::new("appointment")
                                .long("appointment")
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("kind").long("kind"))
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Period metrics")
                .subcommand(json_args(period_args(
                    Command::new("appointments").arg(
                        Arg::new("by")
                            .long("by")
                            .default_value("service")
                            .help("service|client"),
                    ),
                )))
                .subcommand(json_args(period_args(Command::new("revenue"))))
                .subcommand(json_args(period_args(Command::new("ledger"))))
                .subcommand(json_args(period_args(Command::new("overview")))),
        )
        .subcommand(
            Command::new("export")
                .about("Export records")
                .subcommand(
                    Command::new("appointments")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
}
