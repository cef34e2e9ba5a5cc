// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::aggregate::{Aggregation, aggregate};
use super::compare::{Comparison, compare};
use super::ledger::{LedgerSummary, by_kind, ledger_summary};
use super::period::Period;
use super::rank::{EntityRank, RankBy, top_entities, top_entities_where};
use super::round_money;
use crate::models::{Appointment, AppointmentStatus, Dataset, TxKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub period: Period,
    pub previous_period: Period,
    pub appointments: Aggregation,
    pub appointments_change: Comparison,
    pub revenue: Aggregation,
    pub revenue_change: Comparison,
    pub ledger: LedgerSummary,
    pub top_services: Vec<EntityRank>,
    pub top_clients: Vec<EntityRank>,
    pub average_ticket: Decimal,
    pub active_services: usize,
    pub new_clients: usize,
    /// Undecodable rows plus in-period records without a value.
    pub skipped: usize,
}

/// The dashboard for `period`, compared with the period right before it.
///
/// Cancelled appointments never count. Appointments for inactive services
/// are left out of the service ranking.
pub fn overview(data: &Dataset, period: &Period) -> Overview {
    let previous_period = period.previous();

    let billable: Vec<&Appointment> = data
        .appointments
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .collect();
    let appointments = aggregate(&billable, period);
    let appointments_before = aggregate(&billable, &previous_period);

    let income = by_kind(&data.transactions, TxKind::Income);
    let revenue = aggregate(&income, period);
    let revenue_before = aggregate(&income, &previous_period);

    let active: HashSet<i64> = data
        .services
        .iter()
        .filter(|s| s.active)
        .map(|s| s.id)
        .collect();
    let top_services =
        top_entities_where(&billable, period, RankBy::Service, |s| active.contains(&s.id));
    let top_clients = top_entities(&billable, period, RankBy::Client);

    let (completed_count, completed_total) = billable
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed && period.contains(a.date))
        .filter_map(|a| a.value)
        .fold((0usize, Decimal::ZERO), |(n, sum), v| (n + 1, sum + v));
    let average_ticket = if completed_count == 0 {
        Decimal::ZERO
    } else {
        round_money(completed_total / Decimal::from(completed_count))
    };

    let new_clients = data
        .clients
        .iter()
        .filter(|c| period.contains(c.created_at.date()))
        .count();

    let skipped = data.malformed.len() + appointments.skipped + revenue.skipped;
    debug!(period = %period, skipped, "overview computed");

    Overview {
        period: *period,
        previous_period,
        appointments_change: compare(appointments.figures(), appointments_before.figures()),
        appointments,
        revenue_change: compare(revenue.figures(), revenue_before.figures()),
        revenue,
        ledger: ledger_summary(&data.transactions, period),
        top_services,
        top_clients,
        average_ticket,
        active_services: active.len(),
        new_clients,
        skipped,
    }
}
