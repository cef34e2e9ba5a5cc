// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Owner-scoped reads and writes over the SQLite tables.
//!
//! Fetchers never fail on a single bad row: rows whose stored text does not
//! decode are collected as [`MalformedRecord`]s next to the good records.
//! Mutations validate their input and return the stored entity.

use crate::error::{MalformedRecord, StoreError};
use crate::models::{
    Appointment, AppointmentStatus, Client, Dataset, EntityRef, Service, Transaction, TxKind,
};
use crate::session::Session;
use crate::utils::parse_timestamp;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

pub type StoreResult<T> = Result<T, StoreError>;

/// Category used for income booked when an appointment is completed.
pub const SERVICES_CATEGORY: &str = "services";

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub malformed: Vec<MalformedRecord>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Loaded {
            records: Vec::new(),
            malformed: Vec::new(),
        }
    }
}

impl<T> Loaded<T> {
    fn push(&mut self, table: &'static str, id: i64, decoded: Result<T, String>) {
        match decoded {
            Ok(rec) => self.records.push(rec),
            Err(reason) => {
                warn!(table, id, %reason, "skipping malformed row");
                self.malformed.push(MalformedRecord { table, id, reason });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Row decoding

fn decode_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("bad date '{}': {}", s, e))
}

fn decode_time(s: &str) -> Result<NaiveTime, String> {
    let t = s.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .map_err(|e| format!("bad time '{}': {}", s, e))
}

fn decode_decimal(s: &str) -> Result<Decimal, String> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|e| format!("bad amount '{}': {}", s, e))
}

struct ClientRow {
    id: i64,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    created_at: String,
}

const CLIENT_COLUMNS: &str = "id, name, phone, email, address, created_at";

impl ClientRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ClientRow {
            id: r.get(0)?,
            name: r.get(1)?,
            phone: r.get(2)?,
            email: r.get(3)?,
            address: r.get(4)?,
            created_at: r.get(5)?,
        })
    }

    fn decode(self) -> Result<Client, String> {
        Ok(Client {
            id: self.id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

struct ServiceRow {
    id: i64,
    name: String,
    price: String,
    duration_minutes: Option<i64>,
    active: bool,
}

const SERVICE_COLUMNS: &str = "id, name, price, duration_minutes, active";

impl ServiceRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ServiceRow {
            id: r.get(0)?,
            name: r.get(1)?,
            price: r.get(2)?,
            duration_minutes: r.get(3)?,
            active: r.get(4)?,
        })
    }

    fn decode(self) -> Result<Service, String> {
        let duration_minutes = match self.duration_minutes {
            Some(m) => Some(u32::try_from(m).map_err(|_| format!("bad duration {}", m))?),
            None => None,
        };
        Ok(Service {
            id: self.id,
            name: self.name,
            price: decode_decimal(&self.price)?,
            duration_minutes,
            active: self.active,
        })
    }
}

struct AppointmentRow {
    id: i64,
    client_id: Option<i64>,
    client_name: Option<String>,
    service_id: Option<i64>,
    service_name: Option<String>,
    date: String,
    start_time: String,
    end_time: Option<String>,
    value: Option<String>,
    notes: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

const APPOINTMENT_SELECT: &str = "SELECT a.id, a.client_id, c.name, a.service_id, s.name, a.date, a.start_time, a.end_time, a.value, a.notes, a.status, a.created_at, a.updated_at
     FROM appointments a
     LEFT JOIN clients c ON c.id=a.client_id
     LEFT JOIN services s ON s.id=a.service_id";

fn link(id: Option<i64>, name: Option<String>) -> Option<EntityRef> {
    id.map(|id| EntityRef {
        id,
        name: name.unwrap_or_default(),
    })
}

impl AppointmentRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AppointmentRow {
            id: r.get(0)?,
            client_id: r.get(1)?,
            client_name: r.get(2)?,
            service_id: r.get(3)?,
            service_name: r.get(4)?,
            date: r.get(5)?,
            start_time: r.get(6)?,
            end_time: r.get(7)?,
            value: r.get(8)?,
            notes: r.get(9)?,
            status: r.get(10)?,
            created_at: r.get(11)?,
            updated_at: r.get(12)?,
        })
    }

    fn decode(self) -> Result<Appointment, String> {
        let end_time = match self.end_time.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Some(decode_time(t)?),
            _ => None,
        };
        let value = match self.value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Some(decode_decimal(v)?),
            _ => None,
        };
        let status = self
            .status
            .parse::<AppointmentStatus>()
            .map_err(|e| e.to_string())?;
        Ok(Appointment {
            id: self.id,
            client: link(self.client_id, self.client_name),
            service: link(self.service_id, self.service_name),
            date: decode_date(&self.date)?,
            start_time: decode_time(&self.start_time)?,
            end_time,
            value,
            notes: self.notes,
            status,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

struct TransactionRow {
    id: i64,
    kind: String,
    category: String,
    description: String,
    value: String,
    date: String,
    appointment_id: Option<i64>,
}

const TRANSACTION_COLUMNS: &str = "id, kind, category, description, value, date, appointment_id";

impl TransactionRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TransactionRow {
            id: r.get(0)?,
            kind: r.get(1)?,
            category: r.get(2)?,
            description: r.get(3)?,
            value: r.get(4)?,
            date: r.get(5)?,
            appointment_id: r.get(6)?,
        })
    }

    fn decode(self) -> Result<Transaction, String> {
        let kind = self.kind.parse::<TxKind>().map_err(|e| e.to_string())?;
        let value = decode_decimal(&self.value)?;
        if value <= Decimal::ZERO {
            return Err(format!("non-positive value {}", value));
        }
        Ok(Transaction {
            id: self.id,
            kind,
            category: self.category,
            description: self.description,
            value,
            date: decode_date(&self.date)?,
            appointment_id: self.appointment_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Fetchers

pub fn clients(conn: &Connection, session: &Session) -> StoreResult<Loaded<Client>> {
    let sql = format!(
        "SELECT {} FROM clients WHERE owner_id=?1 ORDER BY name COLLATE NOCASE, id",
        CLIENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![session.owner_id], ClientRow::read)?;
    let mut loaded = Loaded::default();
    for row in rows {
        let row = row?;
        let id = row.id;
        loaded.push("clients", id, row.decode());
    }
    debug!(count = loaded.records.len(), "fetched clients");
    Ok(loaded)
}

pub fn services(conn: &Connection, session: &Session) -> StoreResult<Loaded<Service>> {
    let sql = format!(
        "SELECT {} FROM services WHERE owner_id=?1 ORDER BY name COLLATE NOCASE, id",
        SERVICE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![session.owner_id], ServiceRow::read)?;
    let mut loaded = Loaded::default();
    for row in rows {
        let row = row?;
        let id = row.id;
        loaded.push("services", id, row.decode());
    }
    debug!(count = loaded.records.len(), "fetched services");
    Ok(loaded)
}

pub fn appointments(conn: &Connection, session: &Session) -> StoreResult<Loaded<Appointment>> {
    let sql = format!(
        "{} WHERE a.owner_id=?1 ORDER BY a.date, a.start_time, a.id",
        APPOINTMENT_SELECT
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![session.owner_id], AppointmentRow::read)?;
    let mut loaded = Loaded::default();
    for row in rows {
        let row = row?;
        let id = row.id;
        loaded.push("appointments", id, row.decode());
    }
    debug!(count = loaded.records.len(), "fetched appointments");
    Ok(loaded)
}

pub fn transactions(conn: &Connection, session: &Session) -> StoreResult<Loaded<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE owner_id=?1 ORDER BY date, id",
        TRANSACTION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![session.owner_id], TransactionRow::read)?;
    let mut loaded = Loaded::default();
    for row in rows {
        let row = row?;
        let id = row.id;
        loaded.push("transactions", id, row.decode());
    }
    debug!(count = loaded.records.len(), "fetched transactions");
    Ok(loaded)
}

/// Loads every table for the session owner in one go.
pub fn dataset(conn: &Connection, session: &Session) -> StoreResult<Dataset> {
    let clients = clients(conn, session)?;
    let services = services(conn, session)?;
    let appointments = appointments(conn, session)?;
    let transactions = transactions(conn, session)?;

    let mut malformed = clients.malformed;
    malformed.extend(services.malformed);
    malformed.extend(appointments.malformed);
    malformed.extend(transactions.malformed);

    Ok(Dataset {
        clients: clients.records,
        services: services.records,
        appointments: appointments.records,
        transactions: transactions.records,
        malformed,
    })
}

pub fn client_by_id(conn: &Connection, session: &Session, id: i64) -> StoreResult<Client> {
    let sql = format!(
        "SELECT {} FROM clients WHERE id=?1 AND owner_id=?2",
        CLIENT_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![id, session.owner_id], ClientRow::read)
        .optional()?
        .ok_or(StoreError::NotFound {
            entity: "client",
            id,
        })?;
    row.decode()
        .map_err(|reason| malformed("clients", id, reason))
}

pub fn service_by_id(conn: &Connection, session: &Session, id: i64) -> StoreResult<Service> {
    let sql = format!(
        "SELECT {} FROM services WHERE id=?1 AND owner_id=?2",
        SERVICE_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![id, session.owner_id], ServiceRow::read)
        .optional()?
        .ok_or(StoreError::NotFound {
            entity: "service",
            id,
        })?;
    row.decode()
        .map_err(|reason| malformed("services", id, reason))
}

pub fn appointment_by_id(conn: &Connection, session: &Session, id: i64) -> StoreResult<Appointment> {
    let sql = format!("{} WHERE a.id=?1 AND a.owner_id=?2", APPOINTMENT_SELECT);
    let row = conn
        .query_row(&sql, params![id, session.owner_id], AppointmentRow::read)
        .optional()?
        .ok_or(StoreError::NotFound {
            entity: "appointment",
            id,
        })?;
    row.decode()
        .map_err(|reason| malformed("appointments", id, reason))
}

pub fn transaction_by_id(conn: &Connection, session: &Session, id: i64) -> StoreResult<Transaction> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE id=?1 AND owner_id=?2",
        TRANSACTION_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![id, session.owner_id], TransactionRow::read)
        .optional()?
        .ok_or(StoreError::NotFound {
            entity: "transaction",
            id,
        })?;
    row.decode()
        .map_err(|reason| malformed("transactions", id, reason))
}

fn malformed(table: &'static str, id: i64, reason: String) -> StoreError {
    StoreError::Malformed(MalformedRecord { table, id, reason })
}

// ---------------------------------------------------------------------------
// Mutations

fn required(field: &str, value: &str) -> StoreResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(StoreError::invalid(format!("{} must not be empty", field)));
    }
    Ok(v.to_string())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Fields left as `None` keep their stored value; `Some("")` clears an
/// optional field.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

pub fn add_client(conn: &Connection, session: &Session, new: &NewClient) -> StoreResult<Client> {
    let name = required("Client name", &new.name)?;
    conn.execute(
        "INSERT INTO clients(owner_id, name, phone, email, address) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session.owner_id,
            name,
            optional_text(new.phone.as_deref()),
            optional_text(new.email.as_deref()),
            optional_text(new.address.as_deref()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, "client added");
    client_by_id(conn, session, id)
}

pub fn update_client(
    conn: &Connection,
    session: &Session,
    id: i64,
    patch: &ClientPatch,
) -> StoreResult<Client> {
    let current = client_by_id(conn, session, id)?;
    let name = match patch.name.as_deref() {
        Some(n) => required("Client name", n)?,
        None => current.name,
    };
    let merge = |new: &Option<String>, old: Option<String>| match new {
        Some(v) => optional_text(Some(v.as_str())),
        None => old,
    };
    conn.execute(
        "UPDATE clients SET name=?1, phone=?2, email=?3, address=?4 WHERE id=?5 AND owner_id=?6",
        params![
            name,
            merge(&patch.phone, current.phone),
            merge(&patch.email, current.email),
            merge(&patch.address, current.address),
            id,
            session.owner_id,
        ],
    )?;
    info!(id, "client updated");
    client_by_id(conn, session, id)
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub price: Decimal,
    pub duration_minutes: Option<u32>,
    pub active: bool,
}

/// `duration_minutes: Some(None)` clears the stored duration.
#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub duration_minutes: Option<Option<u32>>,
    pub active: Option<bool>,
}

fn check_price(price: Decimal) -> StoreResult<Decimal> {
    if price < Decimal::ZERO {
        return Err(StoreError::invalid(format!(
            "Service price must not be negative (got {})",
            price
        )));
    }
    Ok(price)
}

pub fn add_service(conn: &Connection, session: &Session, new: &NewService) -> StoreResult<Service> {
    let name = required("Service name", &new.name)?;
    let price = check_price(new.price)?;
    conn.execute(
        "INSERT INTO services(owner_id, name, price, duration_minutes, active) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session.owner_id,
            name,
            price.to_string(),
            new.duration_minutes,
            new.active,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, "service added");
    service_by_id(conn, session, id)
}

pub fn update_service(
    conn: &Connection,
    session: &Session,
    id: i64,
    patch: &ServicePatch,
) -> StoreResult<Service> {
    let current = service_by_id(conn, session, id)?;
    let name = match patch.name.as_deref() {
        Some(n) => required("Service name", n)?,
        None => current.name,
    };
    let price = check_price(patch.price.unwrap_or(current.price))?;
    conn.execute(
        "UPDATE services SET name=?1, price=?2, duration_minutes=?3, active=?4 WHERE id=?5 AND owner_id=?6",
        params![
            name,
            price.to_string(),
            patch.duration_minutes.unwrap_or(current.duration_minutes),
            patch.active.unwrap_or(current.active),
            id,
            session.owner_id,
        ],
    )?;
    info!(id, "service updated");
    service_by_id(conn, session, id)
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub client_id: Option<i64>,
    pub service_id: Option<i64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    /// Defaults to the linked service's price when absent.
    pub value: Option<Decimal>,
    pub notes: Option<String>,
}

pub fn add_appointment(
    conn: &Connection,
    session: &Session,
    new: &NewAppointment,
) -> StoreResult<Appointment> {
    if let Some(end) = new.end_time {
        if end < new.start_time {
            return Err(StoreError::invalid(format!(
                "End time {} is before start time {}",
                end.format("%H:%M"),
                new.start_time.format("%H:%M")
            )));
        }
    }
    if let Some(v) = new.value {
        if v < Decimal::ZERO {
            return Err(StoreError::invalid(format!(
                "Appointment value must not be negative (got {})",
                v
            )));
        }
    }
    if let Some(cid) = new.client_id {
        client_by_id(conn, session, cid)?;
    }
    let service = match new.service_id {
        Some(sid) => Some(service_by_id(conn, session, sid)?),
        None => None,
    };
    let value = new.value.or_else(|| service.as_ref().map(|s| s.price));

    conn.execute(
        "INSERT INTO appointments(owner_id, client_id, service_id, date, start_time, end_time, value, notes, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            session.owner_id,
            new.client_id,
            new.service_id,
            new.date.to_string(),
            new.start_time.format("%H:%M").to_string(),
            new.end_time.map(|t| t.format("%H:%M").to_string()),
            value.map(|v| v.to_string()),
            optional_text(new.notes.as_deref()),
            AppointmentStatus::Scheduled.as_str(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, date = %new.date, "appointment added");
    appointment_by_id(conn, session, id)
}

pub fn set_appointment_status(
    conn: &Connection,
    session: &Session,
    id: i64,
    status: AppointmentStatus,
) -> StoreResult<Appointment> {
    appointment_by_id(conn, session, id)?;
    conn.execute(
        "UPDATE appointments SET status=?1, updated_at=datetime('now') WHERE id=?2 AND owner_id=?3",
        params![status.as_str(), id, session.owner_id],
    )?;
    info!(id, %status, "appointment status changed");
    appointment_by_id(conn, session, id)
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub appointment: Appointment,
    /// Income booked by this call; `None` when the appointment has no value
    /// or its income was already booked.
    pub income: Option<Transaction>,
}

/// Marks an appointment completed and books its value as income, atomically.
pub fn complete_appointment(
    conn: &mut Connection,
    session: &Session,
    id: i64,
) -> StoreResult<Completion> {
    let tx = conn.transaction()?;
    let appt = appointment_by_id(&tx, session, id)?;
    if appt.status == AppointmentStatus::Cancelled {
        return Err(StoreError::invalid(format!(
            "Appointment {} is cancelled and cannot be completed",
            id
        )));
    }
    tx.execute(
        "UPDATE appointments SET status='completed', updated_at=datetime('now') WHERE id=?1 AND owner_id=?2",
        params![id, session.owner_id],
    )?;

    let already_booked: i64 = tx.query_row(
        "SELECT COUNT(*) FROM transactions WHERE appointment_id=?1 AND owner_id=?2 AND kind='income'",
        params![id, session.owner_id],
        |r| r.get(0),
    )?;
    let mut income_id = None;
    match appt.value {
        Some(v) if v > Decimal::ZERO && already_booked == 0 => {
            let description = appt
                .service
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| format!("Appointment #{}", id));
            tx.execute(
                "INSERT INTO transactions(owner_id, kind, category, description, value, date, appointment_id)
                 VALUES (?1, 'income', ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.owner_id,
                    SERVICES_CATEGORY,
                    description,
                    v.to_string(),
                    appt.date.to_string(),
                    id,
                ],
            )?;
            income_id = Some(tx.last_insert_rowid());
        }
        Some(_) if already_booked > 0 => {
            debug!(id, "income already booked for appointment");
        }
        _ => {
            warn!(id, "completed appointment has no chargeable value; no income booked");
        }
    }
    let appointment = appointment_by_id(&tx, session, id)?;
    let income = match income_id {
        Some(tid) => Some(transaction_by_id(&tx, session, tid)?),
        None => None,
    };
    tx.commit()?;
    info!(id, booked = income.is_some(), "appointment completed");
    Ok(Completion {
        appointment,
        income,
    })
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TxKind,
    pub category: String,
    pub description: String,
    pub value: Decimal,
    pub date: NaiveDate,
    pub appointment_id: Option<i64>,
}

pub fn add_transaction(
    conn: &Connection,
    session: &Session,
    new: &NewTransaction,
) -> StoreResult<Transaction> {
    let category = required("Category", &new.category)?;
    if new.value <= Decimal::ZERO {
        return Err(StoreError::invalid(format!(
            "Transaction value must be positive (got {})",
            new.value
        )));
    }
    if let Some(aid) = new.appointment_id {
        appointment_by_id(conn, session, aid)?;
    }
    conn.execute(
        "INSERT INTO transactions(owner_id, kind, category, description, value, date, appointment_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            session.owner_id,
            new.kind.as_str(),
            category,
            new.description.trim(),
            new.value.to_string(),
            new.date.to_string(),
            new.appointment_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, kind = %new.kind, "transaction recorded");
    transaction_by_id(conn, session, id)
}
