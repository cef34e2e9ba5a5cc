// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The signed-in owner.
//!
//! A `Session` is established by `login`, read once when a command starts and
//! handed to every fetcher and mutation. `logout` tears it down. Nothing in
//! the crate looks the owner up on its own.

use crate::error::StoreError;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use tracing::info;

const ACTIVE_OWNER_KEY: &str = "active_owner";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub owner_id: i64,
    pub owner_name: String,
}

impl Session {
    /// Loads the session stored by the last `login`.
    pub fn current(conn: &Connection) -> Result<Session, StoreError> {
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT o.id, o.name FROM settings s
                 JOIN owners o ON o.id = CAST(s.value AS INTEGER)
                 WHERE s.key=?1",
                params![ACTIVE_OWNER_KEY],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let (owner_id, owner_name) = row.ok_or(StoreError::NoSession)?;
        Ok(Session {
            owner_id,
            owner_name,
        })
    }

    /// Signs in as `name`, registering the owner on first use.
    pub fn login(conn: &Connection, name: &str) -> Result<Session, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid("Owner name must not be empty"));
        }
        conn.execute(
            "INSERT INTO owners(name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;
        let owner_id: i64 =
            conn.query_row("SELECT id FROM owners WHERE name=?1", params![name], |r| {
                r.get(0)
            })?;
        conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![ACTIVE_OWNER_KEY, owner_id.to_string()],
        )?;
        info!(owner_id, owner = name, "session started");
        Ok(Session {
            owner_id,
            owner_name: name.to_string(),
        })
    }

    /// Ends the current session; returns the owner that was signed in, if any.
    pub fn logout(conn: &Connection) -> Result<Option<Session>, StoreError> {
        let previous = match Session::current(conn) {
            Ok(s) => Some(s),
            Err(StoreError::NoSession) => None,
            Err(e) => return Err(e),
        };
        conn.execute(
            "DELETE FROM settings WHERE key=?1",
            params![ACTIVE_OWNER_KEY],
        )?;
        if let Some(ref s) = previous {
            info!(owner_id = s.owner_id, "session ended");
        }
        Ok(previous)
    }
}
