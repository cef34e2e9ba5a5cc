// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::AppointmentStatus;
use crate::session::Session;
use crate::store;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{Connection, params};

/// Returns `(issue, detail)` pairs for everything that looks wrong.
pub fn diagnose(conn: &Connection, session: &Session) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let data = store::dataset(conn, session)?;

    // 1) Rows that could not be decoded at all
    for m in &data.malformed {
        rows.push(vec![
            "malformed_row".into(),
            format!("{} #{}: {}", m.table, m.id, m.reason),
        ]);
    }

    // 2) Appointments ending before they start, or with nothing to charge
    for a in &data.appointments {
        if let Some(end) = a.end_time {
            if end < a.start_time {
                rows.push(vec![
                    "end_before_start".into(),
                    format!("appointment #{} on {}", a.id, a.date),
                ]);
            }
        }
        if a.value.is_none() && a.status != AppointmentStatus::Cancelled {
            rows.push(vec![
                "appointment_without_value".into(),
                format!("appointment #{} on {}", a.id, a.date),
            ]);
        }
    }

    // 3) Ledger entries pointing at appointments that are gone
    let mut stmt = conn.prepare(
        "SELECT t.id, t.appointment_id FROM transactions t
         LEFT JOIN appointments a ON a.id=t.appointment_id AND a.owner_id=t.owner_id
         WHERE t.owner_id=?1 AND t.appointment_id IS NOT NULL AND a.id IS NULL",
    )?;
    let mut cur = stmt.query(params![session.owner_id])?;
    while let Some(r) = cur.next()? {
        let tid: i64 = r.get(0)?;
        let aid: i64 = r.get(1)?;
        rows.push(vec![
            "orphan_transaction".into(),
            format!("transaction #{} -> appointment #{}", tid, aid),
        ]);
    }
    Ok(rows)
}

pub fn handle(conn: &Connection, session: &Session) -> Result<()> {
    let rows = diagnose(conn, session)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
