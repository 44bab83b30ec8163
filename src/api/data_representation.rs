use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::format::{
    DEFAULT_DATE_PATTERN, DateFormatter, DefaultDateFormatter, DefaultValueFormatter,
    ValueFormatter, is_valid_date_pattern,
};
use crate::core::primitives::epoch;
use crate::core::smoothing::{DEFAULT_SMOOTHING_STEPS, MAX_SMOOTHING_STEPS};
use crate::core::{
    DeriveContext, RawSeries, Series, VarianceReference, Viewport, ViewportSize,
    classify_viewport, derive_series,
};
use crate::error::{KpiError, KpiResult};
use crate::render::{KpiLabel, LabelSettings, render_kpi_label};

/// Field the series list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortKey {
    /// Input order.
    #[default]
    Index,
    Name,
    /// Current value; series without data sort last.
    Value,
    /// Variance; series without a variance sort last.
    Variance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SeriesSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SeriesSort {
    #[must_use]
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Global inputs of one rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub variance_reference: VarianceReference,
    #[serde(default)]
    pub stale_threshold_days: u32,
    /// Sub-intervals per smoothed interval; `None` disables smoothing.
    #[serde(default)]
    pub smoothing_steps: Option<u8>,
    #[serde(default = "default_gradient_suppresses_line")]
    pub gradient_suppresses_line: bool,
    #[serde(default)]
    pub sort: SeriesSort,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
}

fn default_gradient_suppresses_line() -> bool {
    true
}

fn default_date_pattern() -> String {
    DEFAULT_DATE_PATTERN.to_owned()
}

impl RepresentationConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            variance_reference: VarianceReference::default(),
            stale_threshold_days: 0,
            smoothing_steps: None,
            gradient_suppresses_line: default_gradient_suppresses_line(),
            sort: SeriesSort::default(),
            subtitle: None,
            date_pattern: default_date_pattern(),
        }
    }

    #[must_use]
    pub fn with_variance_reference(mut self, reference: VarianceReference) -> Self {
        self.variance_reference = reference;
        self
    }

    #[must_use]
    pub fn with_stale_threshold_days(mut self, days: u32) -> Self {
        self.stale_threshold_days = days;
        self
    }

    /// Enables smoothing with the default density.
    #[must_use]
    pub fn with_smoothing(self, enabled: bool) -> Self {
        self.with_smoothing_steps(enabled.then_some(DEFAULT_SMOOTHING_STEPS))
    }

    #[must_use]
    pub fn with_smoothing_steps(mut self, steps: Option<u8>) -> Self {
        self.smoothing_steps = steps;
        self
    }

    #[must_use]
    pub fn with_gradient_suppresses_line(mut self, suppresses: bool) -> Self {
        self.gradient_suppresses_line = suppresses;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SeriesSort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle;
        self
    }

    #[must_use]
    pub fn with_date_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.date_pattern = pattern.into();
        self
    }

    pub fn validate(&self) -> KpiResult<()> {
        if !is_valid_date_pattern(&self.date_pattern) {
            return Err(KpiError::InvalidConfig(format!(
                "date pattern `{}` is not a valid strftime pattern",
                self.date_pattern
            )));
        }
        if let Some(steps) = self.smoothing_steps {
            if steps == 0 || steps > MAX_SMOOTHING_STEPS {
                return Err(KpiError::InvalidConfig(format!(
                    "smoothing steps must be in [1, {MAX_SMOOTHING_STEPS}]"
                )));
            }
        }
        Ok(())
    }
}

/// Derived model of every series plus cross-series aggregates.
///
/// Rebuilt in full on each input or configuration change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRepresentation {
    pub series: Vec<Series>,
    /// Positions into `series` in display order.
    pub sorted_order: Vec<usize>,
    pub warning_state: u8,
    /// Latest valid observation date across series; the epoch when there is none.
    pub latest_date: DateTime<Utc>,
    /// Largest per-series staleness, if any series is stale.
    pub stale_date_difference: Option<i64>,
    /// Reference date the variance rule resolved to.
    pub percent_calc_date: DateTime<Utc>,
    pub subtitle: Option<String>,
    pub viewport: Viewport,
    pub viewport_size: ViewportSize,
}

impl DataRepresentation {
    pub fn sorted_series(&self) -> impl Iterator<Item = &Series> {
        self.sorted_order
            .iter()
            .filter_map(|position| self.series.get(*position))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Label groups for every series, in display order.
    #[must_use]
    pub fn labels(&self, settings: &LabelSettings) -> Vec<KpiLabel> {
        self.sorted_series()
            .map(|series| render_kpi_label(series, settings))
            .collect()
    }

    pub fn to_json_pretty(&self) -> KpiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            KpiError::InvalidData(format!("failed to serialize data representation: {e}"))
        })
    }
}

/// Turns raw series into a [`DataRepresentation`].
///
/// Formatters are required capabilities; a build without them fails once
/// with [`KpiError::MissingFormatter`].
#[derive(Clone)]
pub struct DataRepresentationBuilder {
    config: RepresentationConfig,
    value_formatter: Option<Arc<dyn ValueFormatter>>,
    date_formatter: Option<Arc<dyn DateFormatter>>,
}

impl DataRepresentationBuilder {
    #[must_use]
    pub fn new(config: RepresentationConfig) -> Self {
        Self {
            config,
            value_formatter: None,
            date_formatter: None,
        }
    }

    #[must_use]
    pub fn with_default_formatters(self) -> Self {
        self.with_value_formatter(Arc::new(DefaultValueFormatter))
            .with_date_formatter(Arc::new(DefaultDateFormatter))
    }

    #[must_use]
    pub fn with_value_formatter(mut self, formatter: Arc<dyn ValueFormatter>) -> Self {
        self.value_formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn with_date_formatter(mut self, formatter: Arc<dyn DateFormatter>) -> Self {
        self.date_formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn config(&self) -> &RepresentationConfig {
        &self.config
    }

    pub fn build(&self, input: &[RawSeries]) -> KpiResult<DataRepresentation> {
        let value_formatter = self
            .value_formatter
            .as_deref()
            .ok_or(KpiError::MissingFormatter("value"))?;
        let date_formatter = self
            .date_formatter
            .as_deref()
            .ok_or(KpiError::MissingFormatter("date"))?;
        self.config.validate()?;

        // Dates first: per-series day math needs the global latest date.
        let latest_date = input
            .iter()
            .filter_map(RawSeries::latest_valid_date)
            .max()
            .unwrap_or_else(epoch);
        let percent_calc_date = resolve_percent_calc_date(
            input,
            self.config.variance_reference,
            latest_date,
        );
        trace!(%latest_date, %percent_calc_date, "resolved global dates");

        let context = DeriveContext {
            latest_date,
            reference: self.config.variance_reference,
            smoothing_steps: self.config.smoothing_steps,
            stale_threshold_days: self.config.stale_threshold_days,
            gradient_suppresses_line: self.config.gradient_suppresses_line,
            date_pattern: &self.config.date_pattern,
            value_formatter,
            date_formatter,
        };

        let series = input
            .iter()
            .enumerate()
            .map(|(index, raw)| derive_series(index, raw, &context))
            .collect::<KpiResult<Vec<_>>>()?;

        let warning_state = series
            .iter()
            .map(|entry| entry.warning_state)
            .max()
            .unwrap_or(0);
        let stale_date_difference = series
            .iter()
            .filter_map(|entry| entry.stale_date_difference)
            .max();
        let sorted_order = sort_order(&series, self.config.sort);
        let viewport_size = classify_viewport(self.config.viewport);

        debug!(
            series_count = series.len(),
            point_count = series.iter().map(|entry| entry.points.len()).sum::<usize>(),
            warning_state,
            viewport_size = viewport_size.as_str(),
            "built data representation"
        );

        Ok(DataRepresentation {
            series,
            sorted_order,
            warning_state,
            latest_date,
            stale_date_difference,
            percent_calc_date,
            subtitle: self.config.subtitle.clone(),
            viewport: self.config.viewport,
            viewport_size,
        })
    }
}

fn resolve_percent_calc_date(
    input: &[RawSeries],
    reference: VarianceReference,
    latest_date: DateTime<Utc>,
) -> DateTime<Utc> {
    match reference {
        VarianceReference::FirstPoint => input
            .iter()
            .filter_map(RawSeries::first_valid_date)
            .min()
            .unwrap_or(latest_date),
        VarianceReference::Value(_) => latest_date,
        rule => rule.cutoff_date(latest_date).unwrap_or_else(epoch),
    }
}

/// Stable ordering of series positions; ties keep input order.
fn sort_order(series: &[Series], sort: SeriesSort) -> Vec<usize> {
    let mut order: Vec<usize> = (0..series.len()).collect();
    if sort.key == SortKey::Index && sort.direction == SortDirection::Ascending {
        return order;
    }

    order.sort_by(|&left, &right| {
        let (a, b) = (&series[left], &series[right]);
        let ordering = match sort.key {
            SortKey::Index => sort.direction.apply(a.index.cmp(&b.index)),
            SortKey::Name => sort.direction.apply(a.name.cmp(&b.name)),
            SortKey::Value => {
                compare_finite_first(a.current_value(), b.current_value(), sort.direction)
            }
            SortKey::Variance => compare_finite_first(a.variance, b.variance, sort.direction),
        };
        ordering.then(a.index.cmp(&b.index))
    });
    order
}

fn compare_finite_first(a: f64, b: f64, direction: SortDirection) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => direction.apply(OrderedFloat(a).cmp(&OrderedFloat(b))),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
