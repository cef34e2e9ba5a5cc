// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_currency, pretty_table, required_arg, set_currency};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-currency", sub)) => {
            set_currency(conn, required_arg(sub, "currency")?)?;
            println!("Currency set to {}", get_currency(conn)?);
        }
        Some(("show", _)) => {
            let db = crate::db::db_path()?;
            let rows = vec![
                vec!["database".to_string(), db.display().to_string()],
                vec!["currency".to_string(), get_currency(conn)?],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
