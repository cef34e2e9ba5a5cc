// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::round1;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Count and summed value of one side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Figures {
    pub count: usize,
    pub total: Decimal,
}

impl Figures {
    pub fn new(count: usize, total: Decimal) -> Self {
        Figures { count, total }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        })
    }
}

/// Relative change against a baseline.
///
/// `New` is the sentinel for a non-zero value over a zero baseline, where a
/// percentage is undefined. It serializes as the string `"new"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentChange {
    Value(Decimal),
    New,
}

impl Serialize for PercentChange {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            PercentChange::Value(d) => Serialize::serialize(d, s),
            PercentChange::New => s.serialize_str("new"),
        }
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Value(d) if *d > Decimal::ZERO => write!(f, "+{:.1}%", d),
            PercentChange::Value(d) => write!(f, "{:.1}%", d),
            PercentChange::New => f.write_str("new"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub current: Figures,
    pub previous: Figures,
    pub delta: Decimal,
    pub count_delta: i64,
    pub percent_change: PercentChange,
    pub trend: Trend,
    /// Relative change of the record count.
    pub count_change: PercentChange,
    pub count_trend: Trend,
}

/// Changes within this many percentage points either way are `Stable`.
pub fn trend_epsilon() -> Decimal {
    Decimal::new(5, 2)
}

// Unrounded change; None when the baseline is zero and current is not.
// Measured against |previous| so the sign always follows the delta.
fn raw_change(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return current.is_zero().then_some(Decimal::ZERO);
    }
    (current - previous)
        .checked_div(previous.abs())
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
}

pub fn percent_change(current: Decimal, previous: Decimal) -> PercentChange {
    match raw_change(current, previous) {
        Some(p) => PercentChange::Value(round1(p)),
        None => PercentChange::New,
    }
}

/// Direction of `current` relative to `previous`.
pub fn trend(current: Decimal, previous: Decimal) -> Trend {
    match raw_change(current, previous) {
        Some(p) if p > trend_epsilon() => Trend::Up,
        Some(p) if p < -trend_epsilon() => Trend::Down,
        Some(_) => Trend::Stable,
        None if current > previous => Trend::Up,
        None if current < previous => Trend::Down,
        None => Trend::Stable,
    }
}

pub fn compare(current: Figures, previous: Figures) -> Comparison {
    let (now, before) = (Decimal::from(current.count), Decimal::from(previous.count));
    Comparison {
        current,
        previous,
        delta: current.total - previous.total,
        count_delta: current.count as i64 - previous.count as i64,
        percent_change: percent_change(current.total, previous.total),
        trend: trend(current.total, previous.total),
        count_change: percent_change(now, before),
        count_trend: trend(now, before),
    }
}
