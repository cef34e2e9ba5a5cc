// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period metrics over already-fetched records.
//!
//! Everything here is a pure function of its inputs: resolve a period, bucket
//! records into it, rank linked entities, and compare against the previous
//! period. Empty input is a valid input and yields zero-filled results.

pub mod aggregate;
pub mod compare;
pub mod ledger;
pub mod overview;
pub mod period;
pub mod rank;

pub use aggregate::{Aggregation, Bucket, aggregate};
pub use compare::{Comparison, Figures, PercentChange, Trend, compare};
pub use ledger::{CategoryShare, LedgerSummary, ledger_summary};
pub use overview::{Overview, overview};
pub use period::{BucketKey, Granularity, Period, bucket_key, resolve};
pub use rank::{EntityRank, RankBy, Ranked, top_entities, top_entities_by_bucket};

use crate::models::{Appointment, Transaction};
use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};

/// A dated, valued record that can be bucketed.
pub trait Measurable {
    fn occurred_at(&self) -> NaiveDateTime;

    /// `None` marks a record that cannot be summed; it is skipped and counted.
    fn value(&self) -> Option<Decimal>;
}

impl<T: Measurable + ?Sized> Measurable for &T {
    fn occurred_at(&self) -> NaiveDateTime {
        (**self).occurred_at()
    }

    fn value(&self) -> Option<Decimal> {
        (**self).value()
    }
}

impl Measurable for Appointment {
    fn occurred_at(&self) -> NaiveDateTime {
        self.starts_at()
    }

    fn value(&self) -> Option<Decimal> {
        self.value
    }
}

// Ledger entries carry no time of day and land in the midnight bucket.
impl Measurable for Transaction {
    fn occurred_at(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    fn value(&self) -> Option<Decimal> {
        Some(self.value)
    }
}

/// `part / whole * 100` to one decimal place, half away from zero.
/// A zero `whole` yields `0.0`.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return round1(Decimal::ZERO);
    }
    match part
        .checked_div(whole)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
    {
        Some(p) => round1(p),
        None => round1(Decimal::ZERO),
    }
}

pub(crate) fn round1(d: Decimal) -> Decimal {
    let mut r = d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    r.rescale(1);
    r
}

pub(crate) fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
