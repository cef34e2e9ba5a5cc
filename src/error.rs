// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while resolving report periods.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Invalid granularity '{0}', expected day|week|month|quarter|year")]
    InvalidGranularity(String),
}

/// Errors raised by the record store and its mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No active session; run `barberdash session login --owner NAME` first")]
    NoSession,

    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Stored {} row {} is malformed: {}", .0.table, .0.id, .0.reason)]
    Malformed(MalformedRecord),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }
}

/// A stored row that could not be decoded into its entity.
///
/// Rows like this are skipped by every fetcher and surfaced as a count
/// next to report results; they are never coerced into zero values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedRecord {
    pub table: &'static str,
    pub id: i64,
    pub reason: String,
}
