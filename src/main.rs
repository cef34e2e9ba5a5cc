// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use barberdash::{cli, commands, db, session::Session};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("session", sub)) => commands::session::handle(&conn, sub)?,
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some((name, sub)) => {
            let session = Session::current(&conn)?;
            match name {
                "client" => commands::clients::handle(&conn, &session, sub)?,
                "service" => commands::services::handle(&conn, &session, sub)?,
                "appt" => commands::appointments::handle(&mut conn, &session, sub)?,
                "tx" => commands::transactions::handle(&conn, &session, sub)?,
                "report" => commands::reports::handle(&conn, &session, sub)?,
                "export" => commands::exporter::handle(&conn, &session, sub)?,
                "doctor" => commands::doctor::handle(&conn, &session)?,
                _ => {}
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
