// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use barberdash::error::StoreError;
use barberdash::models::{AppointmentStatus, TxKind};
use barberdash::session::Session;
use barberdash::store::{
    self, ClientPatch, NewAppointment, NewClient, NewService, NewTransaction, ServicePatch,
};
use barberdash::{db, search};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> (Connection, Session) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let session = Session::login(&conn, "Ana").unwrap();
    (conn, session)
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn client(conn: &Connection, session: &Session, name: &str, phone: Option<&str>) -> i64 {
    store::add_client(
        conn,
        session,
        &NewClient {
            name: name.into(),
            phone: phone.map(String::from),
            ..Default::default()
        },
    )
    .unwrap()
    .id
}

fn service(conn: &Connection, session: &Session, name: &str, price: i64) -> i64 {
    store::add_service(
        conn,
        session,
        &NewService {
            name: name.into(),
            price: Decimal::from(price),
            duration_minutes: Some(30),
            active: true,
        },
    )
    .unwrap()
    .id
}

fn booking(date: &str, start: &str) -> NewAppointment {
    NewAppointment {
        client_id: None,
        service_id: None,
        date: d(date),
        start_time: t(start),
        end_time: None,
        value: None,
        notes: None,
    }
}

#[test]
fn session_lifecycle() {
    let (conn, session) = setup();
    assert_eq!(Session::current(&conn).unwrap(), session);
    let ended = Session::logout(&conn).unwrap();
    assert_eq!(ended.map(|s| s.owner_name), Some("Ana".to_string()));
    assert!(matches!(Session::current(&conn), Err(StoreError::NoSession)));
    assert!(Session::logout(&conn).unwrap().is_none());
    // logging in again reuses the same owner
    let again = Session::login(&conn, " Ana ").unwrap();
    assert_eq!(again.owner_id, session.owner_id);
}

#[test]
fn client_add_and_edit() {
    let (conn, session) = setup();
    let id = client(&conn, &session, "  Joao Silva ", Some("(11) 98765-4321"));
    let c = store::client_by_id(&conn, &session, id).unwrap();
    assert_eq!(c.name, "Joao Silva");

    let patch = ClientPatch {
        email: Some("joao@example.com".into()),
        phone: Some("".into()),
        ..Default::default()
    };
    let c = store::update_client(&conn, &session, id, &patch).unwrap();
    assert_eq!(c.email.as_deref(), Some("joao@example.com"));
    assert_eq!(c.phone, None);
    assert_eq!(c.name, "Joao Silva");

    let blank = ClientPatch {
        name: Some("   ".into()),
        ..Default::default()
    };
    assert!(matches!(
        store::update_client(&conn, &session, id, &blank),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn service_rules() {
    let (conn, session) = setup();
    let bad = NewService {
        name: "Cut".into(),
        price: Decimal::from(-1),
        duration_minutes: None,
        active: true,
    };
    assert!(matches!(
        store::add_service(&conn, &session, &bad),
        Err(StoreError::Validation(_))
    ));

    let id = service(&conn, &session, "Cut", 40);
    let s = store::update_service(
        &conn,
        &session,
        id,
        &ServicePatch {
            active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!s.active);
    assert_eq!(s.price, Decimal::from(40));
    assert_eq!(s.duration_minutes, Some(30));
}

#[test]
fn appointment_value_defaults_to_service_price() {
    let (conn, session) = setup();
    let sid = service(&conn, &session, "Cut", 45);
    let cid = client(&conn, &session, "Joao", None);

    let mut new = booking("2025-03-05", "10:00");
    new.service_id = Some(sid);
    new.client_id = Some(cid);
    let a = store::add_appointment(&conn, &session, &new).unwrap();
    assert_eq!(a.value, Some(Decimal::from(45)));
    assert_eq!(a.status, AppointmentStatus::Scheduled);
    assert_eq!(a.service.as_ref().map(|s| s.name.as_str()), Some("Cut"));
    assert_eq!(a.client.as_ref().map(|c| c.id), Some(cid));

    new.value = Some(Decimal::from(60));
    let b = store::add_appointment(&conn, &session, &new).unwrap();
    assert_eq!(b.value, Some(Decimal::from(60)));
}

#[test]
fn appointment_end_must_not_precede_start() {
    let (conn, session) = setup();
    let mut new = booking("2025-03-05", "10:00");
    new.end_time = Some(t("09:30"));
    assert!(matches!(
        store::add_appointment(&conn, &session, &new),
        Err(StoreError::Validation(_))
    ));
    new.end_time = Some(t("10:00"));
    assert!(store::add_appointment(&conn, &session, &new).is_ok());
}

#[test]
fn completing_books_income_once() {
    let (mut conn, session) = setup();
    let sid = service(&conn, &session, "Cut", 50);
    let mut new = booking("2025-03-05", "10:00");
    new.service_id = Some(sid);
    let a = store::add_appointment(&conn, &session, &new).unwrap();

    let done = store::complete_appointment(&mut conn, &session, a.id).unwrap();
    assert_eq!(done.appointment.status, AppointmentStatus::Completed);
    let income = done.income.expect("income booked");
    assert_eq!(income.kind, TxKind::Income);
    assert_eq!(income.value, Decimal::from(50));
    assert_eq!(income.appointment_id, Some(a.id));
    assert_eq!(income.category, store::SERVICES_CATEGORY);
    assert_eq!(income.date, d("2025-03-05"));

    let again = store::complete_appointment(&mut conn, &session, a.id).unwrap();
    assert!(again.income.is_none());
    let loaded = store::transactions(&conn, &session).unwrap();
    assert_eq!(loaded.records.len(), 1);
}

#[test]
fn cancelled_appointments_cannot_be_completed() {
    let (mut conn, session) = setup();
    let a = store::add_appointment(&conn, &session, &booking("2025-03-05", "10:00")).unwrap();
    store::set_appointment_status(&conn, &session, a.id, AppointmentStatus::Cancelled).unwrap();
    assert!(matches!(
        store::complete_appointment(&mut conn, &session, a.id),
        Err(StoreError::Validation(_))
    ));
    assert!(store::transactions(&conn, &session).unwrap().records.is_empty());
}

#[test]
fn transaction_value_must_be_positive() {
    let (conn, session) = setup();
    let mut new = NewTransaction {
        kind: TxKind::Expense,
        category: "rent".into(),
        description: String::new(),
        value: Decimal::ZERO,
        date: d("2025-03-01"),
        appointment_id: None,
    };
    assert!(matches!(
        store::add_transaction(&conn, &session, &new),
        Err(StoreError::Validation(_))
    ));
    new.value = Decimal::new(120050, 2);
    let tx = store::add_transaction(&conn, &session, &new).unwrap();
    assert_eq!(tx.value, Decimal::new(120050, 2));
    assert_eq!(tx.kind, TxKind::Expense);
}

#[test]
fn owners_never_see_each_other() {
    let (conn, ana) = setup();
    let cid = client(&conn, &ana, "Joao", None);
    service(&conn, &ana, "Cut", 40);

    let bruno = Session::login(&conn, "Bruno").unwrap();
    assert!(store::clients(&conn, &bruno).unwrap().records.is_empty());
    assert!(store::services(&conn, &bruno).unwrap().records.is_empty());
    assert!(matches!(
        store::client_by_id(&conn, &bruno, cid),
        Err(StoreError::NotFound { .. })
    ));
    let mut new = booking("2025-03-05", "10:00");
    new.client_id = Some(cid);
    assert!(matches!(
        store::add_appointment(&conn, &bruno, &new),
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(store::clients(&conn, &ana).unwrap().records.len(), 1);
}

#[test]
fn malformed_rows_are_skipped_and_reported() {
    let (conn, session) = setup();
    store::add_appointment(&conn, &session, &booking("2025-03-05", "10:00")).unwrap();
    conn.execute(
        "INSERT INTO appointments(owner_id, date, start_time, value) VALUES (?1, '05/03/2025', '10:00', '30')",
        params![session.owner_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO appointments(owner_id, date, start_time, value) VALUES (?1, '2025-03-05', '11:00', 'thirty')",
        params![session.owner_id],
    )
    .unwrap();

    let loaded = store::appointments(&conn, &session).unwrap();
    assert_eq!(loaded.records.len(), 1);
    assert_eq!(loaded.malformed.len(), 2);
    assert!(loaded.malformed.iter().all(|m| m.table == "appointments"));

    let data = store::dataset(&conn, &session).unwrap();
    assert_eq!(data.malformed.len(), 2);
}

#[test]
fn client_search_matches_name_or_phone_digits() {
    let (conn, session) = setup();
    client(&conn, &session, "Marcos", Some("(11) 98765-4321"));
    client(&conn, &session, "ana paula", Some("+55 21 3333-0000"));
    client(&conn, &session, "Bruna", None);
    let clients = store::clients(&conn, &session).unwrap().records;

    let names = |term: &str| -> Vec<String> {
        search::search_clients(&clients, term)
            .into_iter()
            .map(|c| c.name.clone())
            .collect()
    };
    assert_eq!(names("MAR"), vec!["Marcos"]);
    assert_eq!(names("98765 4321"), vec!["Marcos"]);
    assert_eq!(names("3333"), vec!["ana paula"]);
    assert_eq!(names(""), vec!["ana paula", "Bruna", "Marcos"]);
    assert!(names("zzz").is_empty());
}

#[test]
fn service_duration_can_be_cleared() {
    let (conn, session) = setup();
    let id = service(&conn, &session, "Cut", 40);
    let clear = ServicePatch {
        duration_minutes: Some(None),
        ..Default::default()
    };
    let s = store::update_service(&conn, &session, id, &clear).unwrap();
    assert_eq!(s.duration_minutes, None);

    let set = ServicePatch {
        duration_minutes: Some(Some(45)),
        ..Default::default()
    };
    let s = store::update_service(&conn, &session, id, &set).unwrap();
    assert_eq!(s.duration_minutes, Some(45));
}

#[test]
fn stored_timestamps_read_back_as_local_time() {
    let (conn, session) = setup();
    let before = Local::now().date_naive();
    let id = client(&conn, &session, "Joao", None);
    let after = Local::now().date_naive();
    let c = store::client_by_id(&conn, &session, id).unwrap();
    assert!(c.created_at.date() == before || c.created_at.date() == after);

    // late evening west of UTC is already the next day in the stored text
    conn.execute(
        "INSERT INTO clients(owner_id, name, created_at) VALUES (?1, 'Late', '2025-03-10 01:30:00')",
        params![session.owner_id],
    )
    .unwrap();
    let late = store::client_by_id(&conn, &session, conn.last_insert_rowid()).unwrap();
    let utc = NaiveDateTime::parse_from_str("2025-03-10 01:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
    assert_eq!(late.created_at, Local.from_utc_datetime(&utc).naive_local());
}
