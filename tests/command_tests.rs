// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use barberdash::commands::{appointments, clients, doctor, exporter, reports, services, transactions};
use barberdash::metrics::{PercentChange, RankBy, Trend};
use barberdash::models::{AppointmentStatus, TxKind};
use barberdash::session::Session;
use barberdash::store::{self, NewAppointment, NewClient, NewService, NewTransaction};
use barberdash::{cli, db};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn leaf(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["barberdash"];
    full.extend_from_slice(args);
    let mut m = cli::build_cli().get_matches_from(full);
    loop {
        let next = match m.subcommand() {
            Some((_, sub)) => sub.clone(),
            None => return m,
        };
        m = next;
    }
}

/// Two services, one client, and a week of bookings around 2025-03-05.
fn seeded() -> (Connection, Session) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let session = Session::login(&conn, "Ana").unwrap();

    let joao = store::add_client(
        &conn,
        &session,
        &NewClient {
            name: "Joao".into(),
            phone: Some("11 99999-0000".into()),
            ..Default::default()
        },
    )
    .unwrap();
    store::add_client(
        &conn,
        &session,
        &NewClient {
            name: "Maria".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let cut = store::add_service(
        &conn,
        &session,
        &NewService {
            name: "Cut".into(),
            price: Decimal::from(40),
            duration_minutes: Some(30),
            active: true,
        },
    )
    .unwrap();
    let beard = store::add_service(
        &conn,
        &session,
        &NewService {
            name: "Beard".into(),
            price: Decimal::from(25),
            duration_minutes: Some(20),
            active: true,
        },
    )
    .unwrap();

    let book = |date: &str, start: &str, service: i64| NewAppointment {
        client_id: Some(joao.id),
        service_id: Some(service),
        date: d(date),
        start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
        end_time: None,
        value: None,
        notes: None,
    };
    // previous week: one cut
    store::add_appointment(&conn, &session, &book("2025-02-26", "10:00", cut.id)).unwrap();
    // current week
    let a = store::add_appointment(&conn, &session, &book("2025-03-03", "09:00", cut.id)).unwrap();
    store::add_appointment(&conn, &session, &book("2025-03-04", "09:00", cut.id)).unwrap();
    store::add_appointment(&conn, &session, &book("2025-03-05", "15:00", beard.id)).unwrap();
    let c = store::add_appointment(&conn, &session, &book("2025-03-06", "11:00", beard.id))
        .unwrap();
    store::set_appointment_status(&conn, &session, c.id, AppointmentStatus::Cancelled).unwrap();

    store::complete_appointment(&mut conn, &session, a.id).unwrap();
    store::add_transaction(
        &conn,
        &session,
        &NewTransaction {
            kind: TxKind::Expense,
            category: "supplies".into(),
            description: "razors".into(),
            value: Decimal::from(15),
            date: d("2025-03-04"),
            appointment_id: None,
        },
    )
    .unwrap();
    (conn, session)
}

#[test]
fn appointment_report_for_a_week() {
    let (conn, session) = seeded();
    let m = leaf(&["report", "appointments", "--period", "week", "--date", "2025-03-05"]);
    let r = reports::appointments_report(&conn, &session, &m).unwrap();

    assert_eq!(r.by, RankBy::Service);
    assert_eq!(r.aggregation.count, 3);
    assert_eq!(r.aggregation.total, Decimal::from(105));
    assert_eq!(r.aggregation.buckets.len(), 7);
    assert_eq!(r.aggregation.buckets[3].count, 0); // cancelled Thursday
    assert_eq!(r.top[0].name, "Cut");
    assert_eq!(r.top[0].count, 2);
    assert_eq!(r.top[0].share, Decimal::new(667, 1));
    assert_eq!(r.change.previous.total, Decimal::from(40));
    assert_eq!(r.change.trend, Trend::Up);
    assert_eq!(r.skipped, 0);
}

#[test]
fn appointment_report_can_rank_clients() {
    let (conn, session) = seeded();
    let m = leaf(&[
        "report",
        "appointments",
        "--by",
        "client",
        "--date",
        "2025-03-05",
    ]);
    let r = reports::appointments_report(&conn, &session, &m).unwrap();
    assert_eq!(r.by, RankBy::Client);
    assert_eq!(r.top.len(), 1);
    assert_eq!(r.top[0].name, "Joao");
    assert_eq!(r.top[0].share, Decimal::from(100));
}

#[test]
fn invalid_period_is_an_error() {
    let (conn, session) = seeded();
    let m = leaf(&["report", "revenue", "--period", "decade", "--date", "2025-03-05"]);
    assert!(reports::revenue_report(&conn, &session, &m).is_err());
}

#[test]
fn revenue_and_ledger_reports() {
    let (conn, session) = seeded();
    let m = leaf(&["report", "revenue", "--date", "2025-03-05"]);
    let r = reports::revenue_report(&conn, &session, &m).unwrap();
    assert_eq!(r.aggregation.total, Decimal::from(40));
    assert_eq!(r.change.percent_change, PercentChange::New);

    let m = leaf(&["report", "ledger", "--date", "2025-03-05"]);
    let l = reports::ledger_report(&conn, &session, &m).unwrap();
    assert_eq!(l.summary.income, Decimal::from(40));
    assert_eq!(l.summary.expense, Decimal::from(15));
    assert_eq!(l.summary.net, Decimal::from(25));
    assert_eq!(l.summary.expense_categories[0].category, "supplies");
    assert_eq!(l.summary.expense_categories[0].share, Decimal::from(100));
}

#[test]
fn overview_report_combines_everything() {
    let (conn, session) = seeded();
    let m = leaf(&["report", "overview", "--date", "2025-03-05"]);
    let o = reports::overview_report(&conn, &session, &m).unwrap();
    assert_eq!(o.appointments.count, 3);
    assert_eq!(o.revenue.total, Decimal::from(40));
    assert_eq!(o.ledger.net, Decimal::from(25));
    assert_eq!(o.active_services, 2);
    assert_eq!(o.top_services.len(), 2);
    assert_eq!(o.previous_period.end, o.period.start);
    // only the 03-03 cut was completed
    assert_eq!(o.average_ticket, Decimal::from(40));
    // both seeded clients were created today, far outside March 2025
    assert_eq!(o.new_clients, 0);
}

#[test]
fn overview_leaves_inactive_services_out_of_the_ranking() {
    let (conn, session) = seeded();
    let shave = store::add_service(
        &conn,
        &session,
        &NewService {
            name: "Shave".into(),
            price: Decimal::from(30),
            duration_minutes: None,
            active: false,
        },
    )
    .unwrap();
    store::add_appointment(
        &conn,
        &session,
        &NewAppointment {
            client_id: None,
            service_id: Some(shave.id),
            date: d("2025-03-07"),
            start_time: NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
            end_time: None,
            value: None,
            notes: None,
        },
    )
    .unwrap();
    conn.execute(
        "INSERT INTO clients(owner_id, name, created_at) VALUES (?1, 'Pedro', '2025-03-04 12:00:00')",
        params![session.owner_id],
    )
    .unwrap();

    let m = leaf(&["report", "overview", "--date", "2025-03-05"]);
    let o = reports::overview_report(&conn, &session, &m).unwrap();
    assert_eq!(o.appointments.count, 4);
    assert_eq!(o.appointments.total, Decimal::from(135));
    let names: Vec<&str> = o.top_services.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Cut", "Beard"]);
    assert_eq!(o.active_services, 2);
    assert_eq!(o.average_ticket, Decimal::from(40));
    assert_eq!(o.new_clients, 1);
}

#[test]
fn overview_counts_compare_separately_from_value() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let session = Session::login(&conn, "Ana").unwrap();
    for (date, value) in [("2025-02-26", 40), ("2025-03-05", 80)] {
        let a = store::add_appointment(
            &conn,
            &session,
            &NewAppointment {
                client_id: None,
                service_id: None,
                date: d(date),
                start_time: NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
                end_time: None,
                value: Some(Decimal::from(value)),
                notes: None,
            },
        )
        .unwrap();
        store::complete_appointment(&mut conn, &session, a.id).unwrap();
    }

    let m = leaf(&["report", "overview", "--date", "2025-03-05"]);
    let o = reports::overview_report(&conn, &session, &m).unwrap();
    let c = &o.appointments_change;
    assert_eq!(c.count_delta, 0);
    assert_eq!(c.count_change, PercentChange::Value(Decimal::ZERO));
    assert_eq!(c.count_trend, Trend::Stable);
    assert_eq!(c.percent_change, PercentChange::Value(Decimal::from(100)));
    assert_eq!(o.revenue_change.trend, Trend::Up);
}

#[test]
fn client_list_search_and_appointment_limit() {
    let (conn, session) = seeded();
    let m = leaf(&["client", "list", "--search", "9999"]);
    let rows = clients::query_rows(&conn, &session, &m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Joao");

    let m = leaf(&["appt", "list", "--limit", "2"]);
    let rows = appointments::query_rows(&conn, &session, &m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-03-06");

    let m = leaf(&["appt", "list", "--status", "completed"]);
    let rows = appointments::query_rows(&conn, &session, &m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, "40.00");
}

#[test]
fn ledger_and_catalog_listings() {
    let (conn, session) = seeded();
    let m = leaf(&["tx", "list", "--kind", "expense", "--month", "2025-03"]);
    let rows = transactions::query_rows(&conn, &session, &m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "supplies");

    let m = leaf(&["tx", "list", "--month", "2025-02"]);
    assert!(transactions::query_rows(&conn, &session, &m).unwrap().is_empty());

    let m = leaf(&["service", "list"]);
    let rows = services::query_rows(&conn, &session, &m).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Beard", "Cut"]);
    assert_eq!(rows[1].price, "40.00");
}

#[test]
fn export_transactions_as_json() {
    let (conn, session) = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("ledger.json");
    let out_str = out_path.to_string_lossy().to_string();

    let m = leaf(&["export", "transactions", "--format", "json", "--out", &out_str]);
    exporter::export_transactions(&conn, &session, &m).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|t| t["kind"] == json!("expense")
        && t["category"] == json!("supplies")
        && t["value"] == json!("15.00")));
    assert!(items.iter().any(|t| t["kind"] == json!("income") && t["value"] == json!("40.00")));
}

#[test]
fn export_appointments_as_csv() {
    let (conn, session) = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("appointments.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let m = leaf(&["export", "appointments", "--out", &out_str]);
    exporter::export_appointments(&conn, &session, &m).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(rdr.records().count(), 5);
}

#[test]
fn doctor_flags_orphans_and_bad_rows() {
    let (conn, session) = seeded();
    assert!(doctor::diagnose(&conn, &session).unwrap().is_empty());

    conn.execute_batch("PRAGMA foreign_keys=OFF").unwrap();
    conn.execute(
        "INSERT INTO transactions(owner_id, kind, category, description, value, date, appointment_id)
         VALUES (?1, 'income', 'services', '', '10', '2025-03-01', 999)",
        params![session.owner_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO clients(owner_id, name, created_at) VALUES (?1, 'Ghost', 'yesterday')",
        params![session.owner_id],
    )
    .unwrap();

    let issues = doctor::diagnose(&conn, &session).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert!(kinds.contains(&"orphan_transaction"));
    assert!(kinds.contains(&"malformed_row"));
}
