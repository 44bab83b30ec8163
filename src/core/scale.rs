use serde::{Deserialize, Serialize};

use crate::error::{KpiError, KpiResult};

/// Linear mapping from a scalar domain to an output range.
///
/// The default range is the normalized `[0, 1]`. A degenerate domain
/// (`start == end`) maps every input to the middle of the range instead of
/// dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl AxisScale {
    /// Creates a scale over `[domain_start, domain_end]` with a normalized range.
    pub fn new(domain_start: f64, domain_end: f64) -> KpiResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() {
            return Err(KpiError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start: 0.0,
            range_end: 1.0,
        })
    }

    /// Rebinds the output range, e.g. to a pixel extent.
    pub fn with_range(self, range_start: f64, range_end: f64) -> KpiResult<Self> {
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(KpiError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            range_start,
            range_end,
            ..self
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.domain_start == self.domain_end
    }

    /// Maps a domain value into the output range.
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        if self.is_degenerate() {
            return (self.range_start + self.range_end) / 2.0;
        }

        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Maps an output-range value back into the domain.
    ///
    /// A degenerate domain inverts to its single value. A collapsed range
    /// inverts to the domain start.
    #[must_use]
    pub fn invert(self, value: f64) -> f64 {
        let range_span = self.range_end - self.range_start;
        if self.is_degenerate() || range_span == 0.0 {
            return self.domain_start;
        }

        let normalized = (value - self.range_start) / range_span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }
}
