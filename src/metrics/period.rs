// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::MetricsError;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str() == tag)
            .ok_or_else(|| MetricsError::InvalidGranularity(s.trim().to_string()))
    }
}

/// Position and display label of a sub-bucket inside a period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BucketKey {
    pub index: usize,
    pub label: String,
}

/// Maps a moment to its sub-bucket for `granularity`.
///
/// - `day`: hour of day, `00:00`..`23:00`
/// - `week`: weekday name, Monday first
/// - `month`: week of month, days 1-7 are `Week 1`
/// - `quarter`: month name
/// - `year`: the year itself
pub fn bucket_key(granularity: Granularity, at: NaiveDateTime) -> BucketKey {
    let date = at.date();
    match granularity {
        Granularity::Day => {
            let hour = at.hour() as usize;
            BucketKey {
                index: hour,
                label: format!("{:02}:00", hour),
            }
        }
        Granularity::Week => {
            let i = date.weekday().num_days_from_monday() as usize;
            BucketKey {
                index: i,
                label: WEEKDAY_NAMES[i].to_string(),
            }
        }
        Granularity::Month => {
            let i = (date.day0() / 7) as usize;
            BucketKey {
                index: i,
                label: format!("Week {}", i + 1),
            }
        }
        Granularity::Quarter => {
            let m = date.month0() as usize;
            BucketKey {
                index: m % 3,
                label: MONTH_NAMES[m].to_string(),
            }
        }
        Granularity::Year => BucketKey {
            index: 0,
            label: date.year().to_string(),
        },
    }
}

/// Half-open date range `[start, end)` covering one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Resolves the period of size `tag` that contains `reference`.
pub fn resolve(reference: NaiveDate, tag: &str) -> Result<Period, MetricsError> {
    let granularity = tag.parse::<Granularity>()?;
    Ok(Period::containing(reference, granularity))
}

fn month_start(year: i32, month0: i32) -> NaiveDate {
    let y = year + month0.div_euclid(12);
    let m = month0.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(if month0 < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

impl Period {
    pub fn containing(reference: NaiveDate, granularity: Granularity) -> Period {
        let year = reference.year();
        let month0 = reference.month0() as i32;
        let (start, end) = match granularity {
            Granularity::Day => (
                reference,
                reference.succ_opt().unwrap_or(NaiveDate::MAX),
            ),
            Granularity::Week => {
                let back = reference.weekday().num_days_from_monday() as u64;
                let start = reference
                    .checked_sub_days(Days::new(back))
                    .unwrap_or(NaiveDate::MIN);
                let end = start
                    .checked_add_days(Days::new(7))
                    .unwrap_or(NaiveDate::MAX);
                (start, end)
            }
            Granularity::Month => (month_start(year, month0), month_start(year, month0 + 1)),
            Granularity::Quarter => {
                let first = month0 - month0 % 3;
                (month_start(year, first), month_start(year, first + 3))
            }
            Granularity::Year => (month_start(year, 0), month_start(year, 12)),
        };
        Period {
            granularity,
            start,
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The equivalent period immediately before this one.
    pub fn previous(&self) -> Period {
        Period::containing(
            self.start.pred_opt().unwrap_or(NaiveDate::MIN),
            self.granularity,
        )
    }

    pub fn next(&self) -> Period {
        Period::containing(self.end, self.granularity)
    }

    /// The grouping key function for this period's granularity.
    pub fn grouping_key(self) -> impl Fn(NaiveDateTime) -> BucketKey {
        let granularity = self.granularity;
        move |at| bucket_key(granularity, at)
    }

    /// Every sub-bucket of the period in chronological order; the position
    /// of a key in the list equals its `index`.
    pub fn buckets(&self) -> Vec<BucketKey> {
        let times: Vec<NaiveTime> = match self.granularity {
            Granularity::Day => (0..24)
                .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
                .collect(),
            _ => vec![NaiveTime::MIN],
        };
        let mut keys: Vec<BucketKey> = Vec::new();
        for day in self.start.iter_days().take_while(|d| *d < self.end) {
            for t in &times {
                let key = bucket_key(self.granularity, day.and_time(*t));
                if keys.last().map(|k| k.index) != Some(key.index) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Short human label, e.g. `2025-W07`, `2025-02`, `2025-Q1`.
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Day => self.start.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let iso = self.start.iso_week();
                format!("{}-W{:02}", iso.year(), iso.week())
            }
            Granularity::Month => self.start.format("%Y-%m").to_string(),
            Granularity::Quarter => {
                format!("{}-Q{}", self.start.year(), self.start.month0() / 3 + 1)
            }
            Granularity::Year => self.start.year().to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {})", self.label(), self.start, self.end)
    }
}
