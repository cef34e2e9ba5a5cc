// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::percent;
use super::period::Period;
use crate::models::{Transaction, TxKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    pub total: Decimal,
    /// Share of this kind's total, in percent.
    pub share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub period: Period,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub income_categories: Vec<CategoryShare>,
    pub expense_categories: Vec<CategoryShare>,
}

pub fn by_kind(transactions: &[Transaction], kind: TxKind) -> Vec<&Transaction> {
    transactions.iter().filter(|t| t.kind == kind).collect()
}

fn breakdown(items: &[&Transaction]) -> (usize, Decimal, Vec<CategoryShare>) {
    let mut groups: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
    for t in items {
        let e = groups
            .entry(t.category.trim())
            .or_insert((0, Decimal::ZERO));
        e.0 += 1;
        e.1 += t.value;
    }
    let total: Decimal = items.iter().map(|t| t.value).sum();
    let mut shares: Vec<CategoryShare> = groups
        .into_iter()
        .map(|(category, (count, sum))| CategoryShare {
            category: category.to_string(),
            count,
            total: sum,
            share: percent(sum, total),
        })
        .collect();
    // BTreeMap order already breaks ties by category name.
    shares.sort_by(|a, b| b.total.cmp(&a.total));
    (items.len(), total, shares)
}

/// Income, expense and net for `period`, with a per-category breakdown.
pub fn ledger_summary(transactions: &[Transaction], period: &Period) -> LedgerSummary {
    let in_period: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| period.contains(t.date))
        .collect();
    let (income_items, expense_items): (Vec<&Transaction>, Vec<&Transaction>) = in_period
        .into_iter()
        .partition(|t| t.kind == TxKind::Income);

    let (income_count, income, income_categories) = breakdown(&income_items);
    let (expense_count, expense, expense_categories) = breakdown(&expense_items);

    LedgerSummary {
        period: *period,
        income,
        expense,
        net: income - expense,
        income_count,
        expense_count,
        income_categories,
        expense_categories,
    }
}
