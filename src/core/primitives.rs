use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{KpiError, KpiResult};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> KpiResult<f64> {
    value.to_f64().ok_or_else(|| {
        KpiError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Date used when no series contributes a date.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

#[must_use]
pub fn datetime_to_unix_millis(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64
}

/// Inverse of [`datetime_to_unix_millis`], rounding to the nearest millisecond.
#[must_use]
pub fn unix_millis_to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis > i64::MAX as f64 || millis < i64::MIN as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis.round() as i64)
}

/// Whole days from `earlier` to `later`, floored (negative when `later` precedes `earlier`).
#[must_use]
pub fn whole_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
}
