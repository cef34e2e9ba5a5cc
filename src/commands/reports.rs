// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::metrics::ledger::by_kind;
use crate::metrics::{
    self, Aggregation, Comparison, EntityRank, LedgerSummary, Overview, Period, RankBy,
    aggregate, compare, ledger_summary, top_entities, top_entities_by_bucket,
};
use crate::models::{Appointment, AppointmentStatus, TxKind};
use crate::session::Session;
use crate::store;
use crate::utils::{fmt_money, get_currency, maybe_print_json, parse_date, pretty_table};
use anyhow::{Result, anyhow};
use chrono::Local;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("appointments", sub)) => print_appointments(conn, session, sub)?,
        Some(("revenue", sub)) => print_revenue(conn, session, sub)?,
        Some(("ledger", sub)) => print_ledger(conn, session, sub)?,
        Some(("overview", sub)) => print_overview(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

/// Resolves `--period` around `--date`, which defaults to today's local date.
pub fn period_from(sub: &clap::ArgMatches) -> Result<Period> {
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let tag = sub
        .get_one::<String>("period")
        .map(String::as_str)
        .unwrap_or("week");
    Ok(metrics::resolve(date, tag)?)
}

#[derive(Debug, Serialize)]
pub struct AppointmentReport {
    pub by: RankBy,
    pub aggregation: Aggregation,
    pub top: Vec<EntityRank>,
    pub top_by_bucket: Vec<Vec<EntityRank>>,
    pub change: Comparison,
    pub skipped: usize,
}

pub fn appointments_report(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<AppointmentReport> {
    let period = period_from(sub)?;
    let by = sub
        .get_one::<String>("by")
        .map(|s| s.parse::<RankBy>())
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or(RankBy::Service);

    let loaded = store::appointments(conn, session)?;
    let billable: Vec<&Appointment> = loaded
        .records
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .collect();
    let aggregation = aggregate(&billable, &period);
    let before = aggregate(&billable, &period.previous());
    Ok(AppointmentReport {
        by,
        top: top_entities(&billable, &period, by),
        top_by_bucket: top_entities_by_bucket(&billable, &period, by),
        change: compare(aggregation.figures(), before.figures()),
        skipped: loaded.malformed.len() + aggregation.skipped,
        aggregation,
    })
}

#[derive(Debug, Serialize)]
pub struct RevenueReport {
    pub aggregation: Aggregation,
    pub change: Comparison,
    pub skipped: usize,
}

pub fn revenue_report(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<RevenueReport> {
    let period = period_from(sub)?;
    let loaded = store::transactions(conn, session)?;
    let income = by_kind(&loaded.records, TxKind::Income);
    let aggregation = aggregate(&income, &period);
    let before = aggregate(&income, &period.previous());
    Ok(RevenueReport {
        change: compare(aggregation.figures(), before.figures()),
        skipped: loaded.malformed.len() + aggregation.skipped,
        aggregation,
    })
}

#[derive(Debug, Serialize)]
pub struct LedgerReport {
    pub summary: LedgerSummary,
    pub skipped: usize,
}

pub fn ledger_report(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<LedgerReport> {
    let period = period_from(sub)?;
    let loaded = store::transactions(conn, session)?;
    Ok(LedgerReport {
        summary: ledger_summary(&loaded.records, &period),
        skipped: loaded.malformed.len(),
    })
}

pub fn overview_report(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Overview> {
    let period = period_from(sub)?;
    let data = store::dataset(conn, session)?;
    Ok(metrics::overview(&data, &period))
}

fn bucket_rows(agg: &Aggregation, ccy: &str) -> Vec<Vec<String>> {
    agg.buckets
        .iter()
        .map(|b| {
            vec![
                b.label.clone(),
                b.count.to_string(),
                fmt_money(&b.total, ccy),
                format!("{:.1}%", b.share),
                b.trend.map(|t| t.to_string()).unwrap_or_default(),
            ]
        })
        .collect()
}

fn rank_rows(ranks: &[EntityRank]) -> Vec<Vec<String>> {
    ranks
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                (i + 1).to_string(),
                r.name.clone(),
                r.count.to_string(),
                format!("{:.1}%", r.share),
            ]
        })
        .collect()
}

fn change_line(what: &str, c: &Comparison, ccy: &str) -> String {
    format!(
        "{} vs previous period: {} ({}), trend {}; records {:+} ({})",
        what,
        fmt_money(&c.delta, ccy),
        c.percent_change,
        c.trend,
        c.count_delta,
        c.count_change
    )
}

fn skipped_line(skipped: usize) {
    if skipped > 0 {
        println!("Note: {} malformed record(s) skipped", skipped);
    }
}

fn print_appointments(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let report = appointments_report(conn, session, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let agg = &report.aggregation;
    println!("Appointments for {}", agg.period);
    println!(
        "{}",
        pretty_table(
            &["Bucket", "Count", "Value", "Share", "Trend"],
            bucket_rows(agg, &ccy)
        )
    );
    println!(
        "Total: {} appointments, {} ({} per day)",
        agg.count,
        fmt_money(&agg.total, &ccy),
        fmt_money(&agg.average_per_day, &ccy)
    );
    println!("{}", change_line("Value", &report.change, &ccy));
    let hdr = match report.by {
        RankBy::Service => "Service",
        RankBy::Client => "Client",
    };
    println!(
        "{}",
        pretty_table(&["#", hdr, "Count", "Share"], rank_rows(&report.top))
    );
    skipped_line(report.skipped);
    Ok(())
}

fn print_revenue(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let report = revenue_report(conn, session, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let agg = &report.aggregation;
    println!("Revenue for {}", agg.period);
    println!(
        "{}",
        pretty_table(
            &["Bucket", "Entries", "Income", "Share", "Trend"],
            bucket_rows(agg, &ccy)
        )
    );
    println!(
        "Total income: {} ({} per day)",
        fmt_money(&agg.total, &ccy),
        fmt_money(&agg.average_per_day, &ccy)
    );
    println!("{}", change_line("Income", &report.change, &ccy));
    skipped_line(report.skipped);
    Ok(())
}

fn category_rows(items: &[metrics::CategoryShare], ccy: &str) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                c.count.to_string(),
                fmt_money(&c.total, ccy),
                format!("{:.1}%", c.share),
            ]
        })
        .collect()
}

fn print_ledger(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let report = ledger_report(conn, session, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let s = &report.summary;
    println!("Ledger for {}", s.period);
    println!(
        "{}",
        pretty_table(
            &["Income category", "Entries", "Total", "Share"],
            category_rows(&s.income_categories, &ccy)
        )
    );
    println!(
        "{}",
        pretty_table(
            &["Expense category", "Entries", "Total", "Share"],
            category_rows(&s.expense_categories, &ccy)
        )
    );
    println!(
        "Income {}  Expense {}  Net {}",
        fmt_money(&s.income, &ccy),
        fmt_money(&s.expense, &ccy),
        fmt_money(&s.net, &ccy)
    );
    skipped_line(report.skipped);
    Ok(())
}

fn print_overview(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let o = overview_report(conn, session, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &o)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    println!("Dashboard for {} (previous {})", o.period, o.previous_period.label());
    let rows = vec![
        vec![
            "Appointments".to_string(),
            o.appointments.count.to_string(),
            o.appointments_change.count_change.to_string(),
            o.appointments_change.count_trend.to_string(),
        ],
        vec![
            "Appointment value".to_string(),
            fmt_money(&o.appointments.total, &ccy),
            o.appointments_change.percent_change.to_string(),
            o.appointments_change.trend.to_string(),
        ],
        vec![
            "Revenue".to_string(),
            fmt_money(&o.revenue.total, &ccy),
            o.revenue_change.percent_change.to_string(),
            o.revenue_change.trend.to_string(),
        ],
        vec![
            "Expenses".to_string(),
            fmt_money(&o.ledger.expense, &ccy),
            String::new(),
            String::new(),
        ],
        vec![
            "Net".to_string(),
            fmt_money(&o.ledger.net, &ccy),
            String::new(),
            String::new(),
        ],
        vec![
            "Average ticket".to_string(),
            fmt_money(&o.average_ticket, &ccy),
            String::new(),
            String::new(),
        ],
        vec![
            "New clients".to_string(),
            o.new_clients.to_string(),
            String::new(),
            String::new(),
        ],
        vec![
            "Active services".to_string(),
            o.active_services.to_string(),
            String::new(),
            String::new(),
        ],
    ];
    println!(
        "{}",
        pretty_table(&["Metric", "Value", "Change", "Trend"], rows)
    );
    println!(
        "{}",
        pretty_table(
            &["#", "Top service", "Count", "Share"],
            rank_rows(&o.top_services)
        )
    );
    println!(
        "{}",
        pretty_table(
            &["#", "Top client", "Count", "Share"],
            rank_rows(&o.top_clients)
        )
    );
    skipped_line(o.skipped);
    Ok(())
}
