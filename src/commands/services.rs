// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::session::Session;
use crate::store::{self, NewService, ServicePatch};
use crate::utils::{
    fmt_money, fmt_opt, get_currency, maybe_print_json, optional_arg, parse_decimal,
    pretty_table, required_arg,
};
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
    let new = NewService {
        name: required_arg(sub, "name")?.to_string(),
        price: parse_decimal(required_arg(sub, "price")?)?,
        duration_minutes: sub.get_one::<u32>("duration").copied(),
        active: !sub.get_flag("inactive"),
    };
    let s = store::add_service(conn, session, &new)?;
    println!(
        "Added service #{} '{}' at {}",
        s.id,
        s.name,
        fmt_money(&s.price, &get_currency(conn)?)
    );
    Ok(())
}

fn edit(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing --id")?;
    let price = match optional_arg(sub, "price") {
        Some(p) => Some(parse_decimal(&p)?),
        None => None,
    };
    let patch = ServicePatch {
        name: optional_arg(sub, "name"),
        price,
        duration_minutes: if sub.get_flag("no-duration") {
            Some(None)
        } else {
            sub.get_one::<u32>("duration").copied().map(Some)
        },
        active: sub.get_one::<bool>("active").copied(),
    };
    let s = store::update_service(conn, session, id, &patch)?;
    println!(
        "Updated service #{} '{}' ({})",
        s.id,
        s.name,
        if s.active { "active" } else { "inactive" }
    );
    Ok(())
}

#[derive(Serialize)]
pub struct ServiceRow {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub duration_minutes: Option<u32>,
    pub active: bool,
}

pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<ServiceRow>> {
    let include_inactive = sub.get_flag("all");
    let loaded = store::services(conn, session)?;
    Ok(loaded
        .records
        .into_iter()
        .filter(|s| include_inactive || s.active)
        .map(|s| ServiceRow {
            id: s.id,
            name: s.name,
            price: format!("{:.2}", s.price),
            duration_minutes: s.duration_minutes,
            active: s.active,
        })
        .collect())
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, session, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.name.clone(),
                    r.price.clone(),
                    fmt_opt(&r.duration_minutes),
                    if r.active { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Service", "Price", "Minutes", "Active"], rows)
        );
    }
    Ok(())
}
