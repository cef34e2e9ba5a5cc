// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Client;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D+").expect("static regex"));

pub fn phone_digits(s: &str) -> String {
    NON_DIGIT.replace_all(s, "").into_owned()
}

/// Clients whose name contains `term` (case-insensitive) or whose phone
/// contains the digits of `term`, sorted by name.
pub fn search_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    let term = term.trim();
    let needle = term.to_lowercase();
    let digits = phone_digits(term);
    let mut hits: Vec<&Client> = clients
        .iter()
        .filter(|c| {
            if needle.is_empty() {
                return true;
            }
            if c.name.to_lowercase().contains(&needle) {
                return true;
            }
            !digits.is_empty()
                && c.phone
                    .as_deref()
                    .is_some_and(|p| phone_digits(p).contains(&digits))
        })
        .collect();
    hits.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    hits
}
