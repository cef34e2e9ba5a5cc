// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::aggregate::counted;
use super::period::Period;
use super::{Measurable, percent};
use crate::models::{Appointment, EntityRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const TOP_N: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    Service,
    Client,
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "service" => Ok(RankBy::Service),
            "client" => Ok(RankBy::Client),
            other => Err(format!("Unknown ranking '{}', expected service|client", other)),
        }
    }
}

/// A record that links to services and clients.
pub trait Ranked: Measurable {
    fn entity(&self, by: RankBy) -> Option<&EntityRef>;
}

impl<T: Ranked + ?Sized> Ranked for &T {
    fn entity(&self, by: RankBy) -> Option<&EntityRef> {
        (**self).entity(by)
    }
}

impl Ranked for Appointment {
    fn entity(&self, by: RankBy) -> Option<&EntityRef> {
        match by {
            RankBy::Service => self.service.as_ref(),
            RankBy::Client => self.client.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRank {
    pub id: i64,
    pub name: String,
    pub count: usize,
    /// `count` over every counted record in the period, in percent.
    pub share: Decimal,
}

fn rank<'a, R, I, F>(records: I, period_total: usize, by: RankBy, keep: &F) -> Vec<EntityRank>
where
    R: Ranked + 'a,
    I: IntoIterator<Item = &'a R>,
    F: Fn(&EntityRef) -> bool,
{
    let mut tally: HashMap<i64, (&EntityRef, usize)> = HashMap::new();
    for rec in records {
        if let Some(e) = rec.entity(by).filter(|e| keep(*e)) {
            tally.entry(e.id).or_insert((e, 0)).1 += 1;
        }
    }
    let whole = Decimal::from(period_total);
    let mut ranked: Vec<EntityRank> = tally
        .into_values()
        .map(|(e, count)| EntityRank {
            id: e.id,
            name: e.name.clone(),
            count,
            share: percent(Decimal::from(count), whole),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.truncate(TOP_N);
    ranked
}

/// Top three entities across the whole period.
pub fn top_entities<R: Ranked>(records: &[R], period: &Period, by: RankBy) -> Vec<EntityRank> {
    top_entities_where(records, period, by, |_| true)
}

/// Like [`top_entities`], but only entities accepted by `keep` are ranked.
/// Shares still use every counted record in the period as the base.
pub fn top_entities_where<R, F>(
    records: &[R],
    period: &Period,
    by: RankBy,
    keep: F,
) -> Vec<EntityRank>
where
    R: Ranked,
    F: Fn(&EntityRef) -> bool,
{
    let in_period = counted(records, period);
    let total = in_period.len();
    rank(in_period, total, by, &keep)
}

/// Top three entities per bucket, aligned with [`Period::buckets`].
pub fn top_entities_by_bucket<R: Ranked>(
    records: &[R],
    period: &Period,
    by: RankBy,
) -> Vec<Vec<EntityRank>> {
    let in_period = counted(records, period);
    let total = in_period.len();
    let key_of = period.grouping_key();
    let mut per_bucket: Vec<Vec<&R>> = vec![Vec::new(); period.buckets().len()];
    for rec in in_period {
        if let Some(slot) = per_bucket.get_mut(key_of(rec.occurred_at()).index) {
            slot.push(rec);
        }
    }
    per_bucket
        .into_iter()
        .map(|recs| rank(recs, total, by, &|_: &EntityRef| true))
        .collect()
}
