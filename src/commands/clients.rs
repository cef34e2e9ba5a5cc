// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::search::search_clients;
use crate::session::Session;
use crate::store::{self, ClientPatch, NewClient};
use crate::utils::{maybe_print_json, optional_arg, pretty_table, required_arg};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("edit", sub)) => edit(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewClient {
        name: required_arg(sub, "name")?.to_string(),
        phone: optional_arg(sub, "phone"),
        email: optional_arg(sub, "email"),
        address: optional_arg(sub, "address"),
    };
    let c = store::add_client(conn, session, &new)?;
    println!("Added client #{} '{}'", c.id, c.name);
    Ok(())
}

fn edit(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing --id")?;
    let patch = ClientPatch {
        name: optional_arg(sub, "name"),
        phone: optional_arg(sub, "phone"),
        email: optional_arg(sub, "email"),
        address: optional_arg(sub, "address"),
    };
    let c = store::update_client(conn, session, id, &patch)?;
    println!("Updated client #{} '{}'", c.id, c.name);
    Ok(())
}

#[derive(Serialize)]
pub struct ClientRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub since: String,
}

pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<ClientRow>> {
    let loaded = store::clients(conn, session)?;
    let term = optional_arg(sub, "search").unwrap_or_default();
    let rows = search_clients(&loaded.records, &term)
        .into_iter()
        .map(|c| ClientRow {
            id: c.id,
            name: c.name.clone(),
            phone: c.phone.clone().unwrap_or_default(),
            email: c.email.clone().unwrap_or_default(),
            address: c.address.clone().unwrap_or_default(),
            since: c.created_at.date().to_string(),
        })
        .collect();
    Ok(rows)
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, session, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|r| vec![r.id.to_string(), r.name, r.phone, r.email, r.address, r.since])
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Phone", "Email", "Address", "Since"], rows)
        );
    }
    Ok(())
}
