// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::appointments::AppointmentRow;
use crate::commands::transactions::TransactionRow;
use crate::session::Session;
use crate::store;
use crate::utils::required_arg;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("appointments", sub)) => export_appointments(conn, session, sub),
        Some(("transactions", sub)) => export_transactions(conn, session, sub),
        _ => Ok(()),
    }
}

fn write_rows<T: Serialize>(rows: &[T], fmt: &str, out: &Path) -> Result<()> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(rows)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(())
}

pub fn export_appointments(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = required_arg(sub, "format")?.trim().to_lowercase();
    let out = Path::new(required_arg(sub, "out")?.trim());
    let loaded = store::appointments(conn, session)?;
    let rows: Vec<AppointmentRow> = loaded.records.iter().map(AppointmentRow::from).collect();
    write_rows(&rows, &fmt, out)?;
    info!(count = rows.len(), path = %out.display(), "appointments exported");
    println!("Exported {} appointments to {}", rows.len(), out.display());
    Ok(())
}

pub fn export_transactions(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = required_arg(sub, "format")?.trim().to_lowercase();
    let out = Path::new(required_arg(sub, "out")?.trim());
    let loaded = store::transactions(conn, session)?;
    let rows: Vec<TransactionRow> = loaded.records.iter().map(TransactionRow::from).collect();
    write_rows(&rows, &fmt, out)?;
    info!(count = rows.len(), path = %out.display(), "transactions exported");
    println!("Exported {} transactions to {}", rows.len(), out.display());
    Ok(())
}
