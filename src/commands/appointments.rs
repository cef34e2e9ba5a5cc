// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Appointment, AppointmentStatus};
use crate::session::Session;
use crate::store::{self, NewAppointment};
use crate::utils::{
    fmt_money, fmt_opt, get_currency, maybe_print_json, optional_arg, parse_date, parse_decimal,
    parse_time, pretty_table, required_arg,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("status", sub)) => status(conn, session, sub)?,
        Some(("complete", sub)) => complete(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let end_time = match optional_arg(sub, "end").filter(|s| !s.is_empty()) {
        Some(e) => Some(parse_time(&e)?),
        None => None,
    };
    let value = match optional_arg(sub, "value").filter(|s| !s.is_empty()) {
        Some(v) => Some(parse_decimal(&v)?),
        None => None,
    };
    let new = NewAppointment {
        client_id: sub.get_one::<i64>("client").copied(),
        service_id: sub.get_one::<i64>("service").copied(),
        date: parse_date(required_arg(sub, "date")?)?,
        start_time: parse_time(required_arg(sub, "start")?)?,
        end_time,
        value,
        notes: optional_arg(sub, "notes"),
    };
    let a = store::add_appointment(conn, session, &new)?;
    println!(
        "Booked appointment #{} on {} at {}{}",
        a.id,
        a.date,
        a.start_time.format("%H:%M"),
        a.client
            .as_ref()
            .map(|c| format!(" for {}", c.name))
            .unwrap_or_default()
    );
    Ok(())
}

fn status(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing --id")?;
    let status = required_arg(sub, "status")?.parse::<AppointmentStatus>()?;
    if status == AppointmentStatus::Completed {
        anyhow::bail!("Use `appt complete --id {}` to complete an appointment", id);
    }
    let a = store::set_appointment_status(conn, session, id, status)?;
    println!("Appointment #{} is now {}", a.id, a.status);
    Ok(())
}

fn complete(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("Missing --id")?;
    let done = store::complete_appointment(conn, session, id)?;
    match done.income {
        Some(t) => println!(
            "Completed appointment #{}; booked income {} (tx #{})",
            done.appointment.id,
            fmt_money(&t.value, &get_currency(conn)?),
            t.id
        ),
        None => println!(
            "Completed appointment #{}; no income booked",
            done.appointment.id
        ),
    }
    Ok(())
}

#[derive(Serialize)]
pub struct AppointmentRow {
    pub id: i64,
    pub date: String,
    pub start: String,
    pub end: String,
    pub client: String,
    pub service: String,
    pub value: String,
    pub status: String,
    pub notes: String,
}

impl From<&Appointment> for AppointmentRow {
    fn from(a: &Appointment) -> Self {
        AppointmentRow {
            id: a.id,
            date: a.date.to_string(),
            start: a.start_time.format("%H:%M").to_string(),
            end: a
                .end_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            client: a.client.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            service: a
                .service
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            value: a.value.map(|v| format!("{:.2}", v)).unwrap_or_default(),
            status: a.status.to_string(),
            notes: fmt_opt(&a.notes),
        }
    }
}

/// Appointments newest first, filtered by `--date`, `--status` and `--limit`.
pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<AppointmentRow>> {
    let date = match optional_arg(sub, "date") {
        Some(d) => Some(parse_date(&d)?),
        None => None,
    };
    let status = match optional_arg(sub, "status") {
        Some(s) => Some(s.parse::<AppointmentStatus>()?),
        None => None,
    };
    let loaded = store::appointments(conn, session)?;
    let mut rows: Vec<AppointmentRow> = loaded
        .records
        .iter()
        .rev()
        .filter(|a| date.is_none_or(|d| a.date == d))
        .filter(|a| status.is_none_or(|s| a.status == s))
        .map(AppointmentRow::from)
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
                    format!("{}-{}", r.start, r.end),
                    r.client.clone(),
                    r.service.clone(),
                    r.value.clone(),
                    r.status.clone(),
                    r.notes.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Time", "Client", "Service", "Value", "Status", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}
