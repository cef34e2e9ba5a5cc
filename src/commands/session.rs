// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::StoreError;
use crate::session::Session;
use crate::utils::required_arg;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("login", sub)) => {
            let s = Session::login(conn, required_arg(sub, "owner")?)?;
            println!("Signed in as '{}'", s.owner_name);
        }
        Some(("logout", _)) => match Session::logout(conn)? {
            Some(s) => println!("Signed out '{}'", s.owner_name),
            None => println!("No active session"),
        },
        Some(("whoami", _)) => match Session::current(conn) {
            Ok(s) => println!("{} (owner #{})", s.owner_name, s.owner_id),
            Err(StoreError::NoSession) => println!("No active session"),
            Err(e) => return Err(e.into()),
        },
        _ => {}
    }
    Ok(())
}
