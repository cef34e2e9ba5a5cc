// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, TxKind};
use crate::session::Session;
use crate::store::{self, NewTransaction};
use crate::utils::{
    fmt_money, fmt_opt, get_currency, maybe_print_json, optional_arg, parse_date, parse_decimal,
    parse_month, pretty_table, required_arg,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewTransaction {
        kind: required_arg(sub, "kind")?.parse::<TxKind>()?,
        category: required_arg(sub, "category")?.to_string(),
        description: optional_arg(sub, "description").unwrap_or_default(),
        value: parse_decimal(required_arg(sub, "value")?)?,
        date: parse_date(required_arg(sub, "date")?)?,
        appointment_id: sub.get_one::<i64>("appointment").copied(),
    };
    let t = store::add_transaction(conn, session, &new)?;
    println!(
        "Recorded {} {} on {} ({})",
        t.kind,
        fmt_money(&t.value, &get_currency(conn)?),
        t.date,
        t.category
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub category: String,
    pub description: String,
    pub value: String,
    pub appointment: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            category: t.category.clone(),
            description: t.description.clone(),
            value: format!("{:.2}", t.value),
            appointment: fmt_opt(&t.appointment_id),
        }
    }
}

/// Ledger entries newest first, filtered by `--kind`, `--month` and `--limit`.
pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let kind = match optional_arg(sub, "kind") {
        Some(k) => Some(k.parse::<TxKind>()?),
        None => None,
    };
    let month = match optional_arg(sub, "month") {
        Some(m) => Some(parse_month(&m)?),
        None => None,
    };
    let loaded = store::transactions(conn, session)?;
    let mut rows: Vec<TransactionRow> = loaded
        .records
        .iter()
        .rev()
        .filter(|t| kind.is_none_or(|k| t.kind == k))
        .filter(|t| {
            month
                .as_deref()
                .is_none_or(|m| t.date.format("%Y-%m").to_string() == m)
        })
        .map(TransactionRow::from)
        .collect();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, session, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.value.clone(),
                    r.appointment.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Category", "Description", "Value", "Appt"],
                rows,
            )
        );
    }
    Ok(())
}
