use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_millis, unix_millis_to_datetime};
use crate::core::scale::AxisScale;
use crate::error::{KpiError, KpiResult};

/// Value types an [`Axis`] can be bound to.
///
/// Temporal axes map through unix milliseconds, so the scale ratio is the
/// elapsed-time ratio.
pub trait AxisValue: Copy + PartialOrd {
    fn to_scalar(self) -> f64;
    fn from_scalar(value: f64) -> Option<Self>;
}

impl AxisValue for f64 {
    fn to_scalar(self) -> f64 {
        self
    }

    fn from_scalar(value: f64) -> Option<Self> {
        Some(value)
    }
}

impl AxisValue for DateTime<Utc> {
    fn to_scalar(self) -> f64 {
        datetime_to_unix_millis(self)
    }

    fn from_scalar(value: f64) -> Option<Self> {
        unix_millis_to_datetime(value)
    }
}

/// Axis bounds with the scale bound to them.
///
/// `initial_*` holds the data-derived extent. `min`/`max` are the active
/// bounds, which differ from the initial ones only after an override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis<T> {
    min: T,
    initial_min: T,
    max: T,
    initial_max: T,
    scale: AxisScale,
}

impl<T: AxisValue> Axis<T> {
    /// Creates an axis whose active bounds equal the data-derived extent.
    pub fn from_extent(min: T, max: T) -> KpiResult<Self> {
        if min > max {
            return Err(KpiError::InvalidData(
                "axis extent min must not exceed max".to_owned(),
            ));
        }

        Ok(Self {
            min,
            initial_min: min,
            max,
            initial_max: max,
            scale: AxisScale::new(min.to_scalar(), max.to_scalar())?,
        })
    }

    /// Fits the extent of `values`, or uses `fallback` when there are none.
    pub fn fit<I>(values: I, fallback: (T, T)) -> KpiResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut extent: Option<(T, T)> = None;
        for value in values {
            extent = Some(match extent {
                None => (value, value),
                Some((min, max)) => (
                    if value < min { value } else { min },
                    if value > max { value } else { max },
                ),
            });
        }

        let (min, max) = extent.unwrap_or(fallback);
        Self::from_extent(min, max)
    }

    /// Returns a copy with the active bounds replaced where an override is given.
    ///
    /// The initial extent is kept so hosts can always reset to the data.
    pub fn with_override(self, min: Option<T>, max: Option<T>) -> KpiResult<Self> {
        if min.is_none() && max.is_none() {
            return Ok(self);
        }

        let min = min.unwrap_or(self.min);
        let max = max.unwrap_or(self.max);
        Ok(Self {
            min,
            max,
            scale: AxisScale::new(min.to_scalar(), max.to_scalar())?,
            ..self
        })
    }

    #[must_use]
    pub fn min(&self) -> T {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> T {
        self.max
    }

    #[must_use]
    pub fn initial_min(&self) -> T {
        self.initial_min
    }

    #[must_use]
    pub fn initial_max(&self) -> T {
        self.initial_max
    }

    #[must_use]
    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.min.to_scalar() != self.initial_min.to_scalar()
            || self.max.to_scalar() != self.initial_max.to_scalar()
    }

    /// Normalized position of `value` between the active bounds.
    #[must_use]
    pub fn apply(&self, value: T) -> f64 {
        self.scale.apply(value.to_scalar())
    }

    #[must_use]
    pub fn invert(&self, ratio: f64) -> Option<T> {
        T::from_scalar(self.scale.invert(ratio))
    }
}
