// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::compare::{Figures, Trend, trend};
use super::period::Period;
use super::{Measurable, percent, round_money};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    pub total: Decimal,
    /// Share of the period's record count, in percent.
    pub share: Decimal,
    /// Direction of `total` against the previous bucket; `None` for the first.
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub period: Period,
    pub buckets: Vec<Bucket>,
    pub count: usize,
    pub total: Decimal,
    pub average_per_day: Decimal,
    /// Records inside the period that had no value and were left out.
    pub skipped: usize,
}

impl Aggregation {
    pub fn figures(&self) -> Figures {
        Figures::new(self.count, self.total)
    }
}

/// Records inside `period` that carry a value, in input order.
pub(crate) fn counted<'a, R: Measurable>(records: &'a [R], period: &Period) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| period.contains(r.occurred_at().date()) && r.value().is_some())
        .collect()
}

/// Buckets `records` into every sub-bucket of `period`, zero-filling gaps.
///
/// Records dated outside `[start, end)` are ignored. Records inside the
/// period without a value are counted in `skipped` and contribute nothing.
pub fn aggregate<R: Measurable>(records: &[R], period: &Period) -> Aggregation {
    let keys = period.buckets();
    let key_of = period.grouping_key();
    let mut counts = vec![0usize; keys.len()];
    let mut totals = vec![Decimal::ZERO; keys.len()];
    let mut skipped = 0usize;

    for rec in records {
        let at = rec.occurred_at();
        if !period.contains(at.date()) {
            continue;
        }
        let Some(value) = rec.value() else {
            skipped += 1;
            continue;
        };
        let idx = key_of(at).index;
        if let (Some(c), Some(t)) = (counts.get_mut(idx), totals.get_mut(idx)) {
            *c += 1;
            *t += value;
        }
    }

    let count: usize = counts.iter().sum();
    let total: Decimal = totals.iter().copied().sum();
    let whole = Decimal::from(count);

    let mut buckets = Vec::with_capacity(keys.len());
    let mut prev_total: Option<Decimal> = None;
    for ((key, c), t) in keys.into_iter().zip(counts).zip(totals) {
        buckets.push(Bucket {
            label: key.label,
            count: c,
            total: t,
            share: percent(Decimal::from(c), whole),
            trend: prev_total.map(|p| trend(t, p)),
        });
        prev_total = Some(t);
    }

    let days = period.days().max(1);
    let average_per_day = round_money(total / Decimal::from(days));

    if skipped > 0 {
        debug!(skipped, period = %period, "records without value skipped");
    }

    Aggregation {
        period: *period,
        buckets,
        count,
        total,
        average_per_day,
        skipped,
    }
}
