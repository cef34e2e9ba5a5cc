// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use barberdash::metrics::compare::{percent_change, trend};
use barberdash::metrics::{Figures, PercentChange, Trend, compare};
use rust_decimal::Decimal;

fn figs(total: i64) -> Figures {
    Figures::new(1, Decimal::from(total))
}

#[test]
fn zero_over_zero_is_zero() {
    let c = compare(figs(0), figs(0));
    assert_eq!(c.percent_change, PercentChange::Value(Decimal::ZERO));
    assert_eq!(c.trend, Trend::Stable);
    assert!(c.delta.is_zero());
}

#[test]
fn growth_from_zero_uses_new_sentinel() {
    let c = compare(figs(10), figs(0));
    assert_eq!(c.percent_change, PercentChange::New);
    assert_eq!(c.trend, Trend::Up);
    assert_eq!(c.delta, Decimal::from(10));
    assert_eq!(
        serde_json::to_value(c.percent_change).unwrap(),
        serde_json::json!("new")
    );
    assert_eq!(c.percent_change.to_string(), "new");
}

#[test]
fn increase_and_decrease() {
    let up = compare(figs(150), figs(100));
    assert_eq!(up.percent_change, PercentChange::Value(Decimal::from(50)));
    assert_eq!(up.trend, Trend::Up);
    assert_eq!(up.percent_change.to_string(), "+50.0%");

    let down = compare(figs(50), figs(100));
    assert_eq!(down.delta, Decimal::from(-50));
    assert_eq!(down.percent_change, PercentChange::Value(Decimal::from(-50)));
    assert_eq!(down.trend, Trend::Down);
    assert_eq!(down.percent_change.to_string(), "-50.0%");
}

#[test]
fn tiny_changes_are_stable() {
    // +0.04% is inside the band, +0.1% is outside
    let within = Decimal::new(10_004, 1);
    assert_eq!(trend(within, Decimal::from(1000)), Trend::Stable);
    let outside = Decimal::new(1001, 0);
    assert_eq!(trend(outside, Decimal::from(1000)), Trend::Up);
    assert_eq!(
        percent_change(Decimal::new(10_004, 1), Decimal::from(1000)),
        PercentChange::Value(Decimal::ZERO)
    );
}

#[test]
fn count_delta_can_be_negative() {
    let c = compare(
        Figures::new(2, Decimal::from(80)),
        Figures::new(5, Decimal::from(80)),
    );
    assert_eq!(c.count_delta, -3);
    assert_eq!(c.trend, Trend::Stable);
}

#[test]
fn percent_values_serialize_as_decimal_text() {
    let c = compare(figs(150), figs(100));
    let v = serde_json::to_value(c).unwrap();
    assert_eq!(v["percent_change"], serde_json::json!("50.0"));
    assert_eq!(v["trend"], serde_json::json!("up"));
    assert_eq!(v["count_change"], serde_json::json!("0.0"));
}

#[test]
fn count_change_is_tracked_apart_from_value() {
    let c = compare(
        Figures::new(1, Decimal::from(80)),
        Figures::new(1, Decimal::from(40)),
    );
    assert_eq!(c.percent_change, PercentChange::Value(Decimal::from(100)));
    assert_eq!(c.count_change, PercentChange::Value(Decimal::ZERO));
    assert_eq!(c.count_trend, Trend::Stable);

    let c = compare(
        Figures::new(3, Decimal::from(80)),
        Figures::new(0, Decimal::ZERO),
    );
    assert_eq!(c.count_change, PercentChange::New);
    assert_eq!(c.count_trend, Trend::Up);
}

#[test]
fn negative_baseline_keeps_the_sign_of_the_delta() {
    let c = compare(figs(50), figs(-100));
    assert_eq!(c.delta, Decimal::from(150));
    assert_eq!(c.percent_change, PercentChange::Value(Decimal::from(150)));
    assert_eq!(c.trend, Trend::Up);
}
