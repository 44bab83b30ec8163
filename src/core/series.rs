use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::axis::Axis;
use crate::core::format::{
    DateFormatter, NOT_AVAILABLE_LABEL, ValueFormat, ValueFormatter, format_value_with_fallback,
};
use crate::core::primitives::{epoch, whole_days_between};
use crate::core::smoothing::smooth_points;
use crate::core::types::{Point, RawPoint, SelectionId};
use crate::error::KpiResult;

/// How a series is painted in the chart area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RenderingMode {
    #[default]
    Line,
    /// Gradient-filled area under the line.
    Area,
}

/// Optional replacement bounds for a value axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AxisRangeOverride {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AxisRangeOverride {
    #[must_use]
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

/// Per-series visual configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesSettings {
    pub rendering_mode: RenderingMode,
    pub values: ValueFormat,
    pub variance: ValueFormat,
    pub y_range: AxisRangeOverride,
    pub sparkline_range: AxisRangeOverride,
    /// Text used when the value or variance is not available.
    pub fallback_text: String,
}

impl Default for SeriesSettings {
    fn default() -> Self {
        Self {
            rendering_mode: RenderingMode::default(),
            values: ValueFormat::number(),
            variance: ValueFormat::percent(0),
            y_range: AxisRangeOverride::default(),
            sparkline_range: AxisRangeOverride::default(),
            fallback_text: NOT_AVAILABLE_LABEL.to_owned(),
        }
    }
}

/// One named input series, in host row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub name: String,
    pub points: Vec<RawPoint>,
    #[serde(default)]
    pub selection_id: SelectionId,
    #[serde(default)]
    pub settings: SeriesSettings,
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Warning level reported by the host for this series.
    #[serde(default)]
    pub warning_state: u8,
}

impl RawSeries {
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<RawPoint>) -> Self {
        Self {
            name: name.into(),
            points,
            selection_id: SelectionId::default(),
            settings: SeriesSettings::default(),
            tooltip: None,
            warning_state: 0,
        }
    }

    #[must_use]
    pub fn with_selection_id(mut self, selection_id: SelectionId) -> Self {
        self.selection_id = selection_id;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SeriesSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    #[must_use]
    pub fn with_warning_state(mut self, warning_state: u8) -> Self {
        self.warning_state = warning_state;
        self
    }

    /// Date of the last valid observation by input order.
    #[must_use]
    pub fn latest_valid_date(&self) -> Option<DateTime<Utc>> {
        self.points
            .iter()
            .rev()
            .find(|point| point.y.is_some_and(f64::is_finite))
            .map(|point| point.x)
    }

    /// Date of the first valid observation by input order.
    #[must_use]
    pub fn first_valid_date(&self) -> Option<DateTime<Utc>> {
        self.points
            .iter()
            .find(|point| point.y.is_some_and(f64::is_finite))
            .map(|point| point.x)
    }
}

/// Which observation the variance is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum VarianceReference {
    /// First valid observation of the series.
    #[default]
    FirstPoint,
    /// Last valid observation at or before `latest_date - days`.
    DaysBack(u32),
    /// Last valid observation at or before the given date.
    AtDate(DateTime<Utc>),
    /// A fixed reference value.
    Value(f64),
}

impl VarianceReference {
    /// Cut-off date for the date-based rules.
    #[must_use]
    pub fn cutoff_date(self, latest_date: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::DaysBack(days) => {
                latest_date.checked_sub_signed(Duration::days(i64::from(days)))
            }
            Self::AtDate(date) => Some(date),
            Self::FirstPoint | Self::Value(_) => None,
        }
    }
}

/// Global inputs shared by every series of one rebuild.
///
/// `latest_date` must already be resolved across all series.
pub struct DeriveContext<'a> {
    pub latest_date: DateTime<Utc>,
    pub reference: VarianceReference,
    /// Sub-intervals per smoothed interval; `None` disables smoothing.
    pub smoothing_steps: Option<u8>,
    pub stale_threshold_days: u32,
    /// Whether the host's gradient fill hides a line drawn on top of it.
    pub gradient_suppresses_line: bool,
    pub date_pattern: &'a str,
    pub value_formatter: &'a dyn ValueFormatter,
    pub date_formatter: &'a dyn DateFormatter,
}

/// Derived statistics and display text for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub index: usize,
    pub points: Vec<Point>,
    pub smoothed_points: Vec<Point>,
    /// Last valid point by index; `None` when the series has no valid data.
    pub current: Option<Point>,
    pub x: Axis<DateTime<Utc>>,
    pub y: Axis<f64>,
    pub y_sparkline: Axis<f64>,
    /// Relative change of `current` against the reference; NaN when undefined.
    pub variance: f64,
    pub formatted_value: String,
    pub formatted_variance: String,
    pub formatted_date: String,
    /// Whole days from `current` to the global latest date.
    pub date_difference: Option<i64>,
    /// Set only when `date_difference` exceeds the staleness threshold.
    pub stale_date_difference: Option<i64>,
    pub tooltip: String,
    pub formatted_tooltip: String,
    pub selection_id: SelectionId,
    pub settings: SeriesSettings,
    pub is_line: bool,
    pub warning_state: u8,
}

impl Series {
    /// Current value, or NaN when the series has no valid data.
    #[must_use]
    pub fn current_value(&self) -> f64 {
        self.current.map_or(f64::NAN, |point| point.y)
    }

    #[must_use]
    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }

    #[must_use]
    pub fn is_variance_valid(&self) -> bool {
        self.variance.is_finite()
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale_date_difference.is_some()
    }
}

/// Warning level contributed by a stale series.
pub const STALE_WARNING_STATE: u8 = 1;

/// Derives one series record. Malformed points never fail the derivation.
pub fn derive_series(index: usize, raw: &RawSeries, context: &DeriveContext<'_>) -> KpiResult<Series> {
    let points: Vec<Point> = raw
        .points
        .iter()
        .enumerate()
        .map(|(position, point)| Point::from_raw(*point, position))
        .collect();

    let malformed = points.iter().filter(|point| !point.is_valid()).count();
    if malformed > 0 {
        trace!(series = %raw.name, malformed, "kept malformed points as gaps");
    }

    let current = points.iter().rev().find(|point| point.is_valid()).copied();

    let reference_value = resolve_reference_value(&points, context);
    let variance = relative_change(current.map_or(f64::NAN, |point| point.y), reference_value);

    let date_difference = current.map(|point| whole_days_between(point.x, context.latest_date));
    let stale_date_difference = date_difference
        .filter(|days| *days > i64::from(context.stale_threshold_days));

    let smoothed_points = match context.smoothing_steps {
        Some(steps) => smooth_points(&points, steps),
        None => points.clone(),
    };

    let valid = || points.iter().filter(|point| point.is_valid());
    let x = Axis::fit(
        valid().map(|point| point.x),
        (epoch(), epoch() + Duration::milliseconds(1)),
    )?;
    let y_data = Axis::fit(valid().map(|point| point.y), (0.0, 1.0))?;
    let y = y_data.with_override(raw.settings.y_range.min, raw.settings.y_range.max)?;
    let y_sparkline = y_data.with_override(
        raw.settings.sparkline_range.min,
        raw.settings.sparkline_range.max,
    )?;

    let settings = &raw.settings;
    let fallback = settings.fallback_text.as_str();
    let formatted_value = format_value_with_fallback(
        context.value_formatter,
        current.map_or(f64::NAN, |point| point.y),
        &settings.values,
        fallback,
    );
    let formatted_variance = format_value_with_fallback(
        context.value_formatter,
        variance,
        &settings.variance,
        fallback,
    );
    let formatted_date = current.map_or_else(
        || fallback.to_owned(),
        |point| {
            context
                .date_formatter
                .format_date(point.x, context.date_pattern)
        },
    );

    let tooltip = raw.tooltip.clone().unwrap_or_else(|| raw.name.clone());
    let formatted_tooltip = format!("{tooltip}: {formatted_value} ({formatted_variance})");

    let is_line =
        settings.rendering_mode == RenderingMode::Area && context.gradient_suppresses_line;

    let warning_state = if stale_date_difference.is_some() {
        raw.warning_state.max(STALE_WARNING_STATE)
    } else {
        raw.warning_state
    };

    Ok(Series {
        name: raw.name.clone(),
        index,
        points,
        smoothed_points,
        current,
        x,
        y,
        y_sparkline,
        variance,
        formatted_value,
        formatted_variance,
        formatted_date,
        date_difference,
        stale_date_difference,
        tooltip,
        formatted_tooltip,
        selection_id: raw.selection_id.clone(),
        settings: raw.settings.clone(),
        is_line,
        warning_state,
    })
}

/// `(current - reference) / |reference|`, or NaN when the reference is unusable.
#[must_use]
pub fn relative_change(current: f64, reference: f64) -> f64 {
    if !reference.is_finite() || reference == 0.0 {
        return f64::NAN;
    }
    (current - reference) / reference.abs()
}

fn resolve_reference_value(points: &[Point], context: &DeriveContext<'_>) -> f64 {
    let reference = match context.reference {
        VarianceReference::Value(value) => return value,
        VarianceReference::FirstPoint => points.iter().find(|point| point.is_valid()),
        rule => {
            let cutoff = rule.cutoff_date(context.latest_date);
            points
                .iter()
                .rev()
                .find(|point| point.is_valid() && cutoff.is_some_and(|date| point.x <= date))
        }
    };
    reference.map_or(f64::NAN, |point| point.y)
}
