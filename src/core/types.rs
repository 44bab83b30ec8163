use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::decimal_to_f64;
use crate::error::KpiResult;

/// Pixel size of the area the host gives the visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One observation as delivered by the host table.
///
/// `y` is `None` when the cell was empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub x: DateTime<Utc>,
    pub y: Option<f64>,
}

impl RawPoint {
    #[must_use]
    pub fn new(x: DateTime<Utc>, y: f64) -> Self {
        Self { x, y: Some(y) }
    }

    #[must_use]
    pub fn missing(x: DateTime<Utc>) -> Self {
        Self { x, y: None }
    }

    pub fn from_decimal(x: DateTime<Utc>, value: Decimal) -> KpiResult<Self> {
        Ok(Self::new(x, decimal_to_f64(value, "value")?))
    }
}

/// Indexed observation kept in a derived series.
///
/// Malformed observations stay in the list with `y = NaN` so that `index`
/// always matches the input position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: DateTime<Utc>,
    pub y: f64,
    pub index: usize,
}

impl Point {
    #[must_use]
    pub fn new(x: DateTime<Utc>, y: f64, index: usize) -> Self {
        Self { x, y, index }
    }

    #[must_use]
    pub fn from_raw(raw: RawPoint, index: usize) -> Self {
        Self {
            x: raw.x,
            y: raw.y.unwrap_or(f64::NAN),
            index,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.y.is_finite()
    }
}

/// Opaque identity token passed through from the host for selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectionId(String);

impl SelectionId {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
