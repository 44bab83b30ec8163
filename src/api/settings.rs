//! Typed visual settings.
//!
//! Hosts hand over settings as a loose `object -> property -> value` bag.
//! [`KpiSettings::from_property_bag`] maps every known key explicitly onto the
//! typed tree, keeping defaults for absent or mistyped values, and then
//! validates and clamps once. The result is an immutable snapshot for one
//! rebuild.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::format::{
    DEFAULT_DATE_PATTERN, DisplayUnits, MAX_PRECISION, NOT_AVAILABLE_LABEL, NumberLocale,
    ValueFormat, is_valid_date_pattern,
};
use crate::core::smoothing::{DEFAULT_SMOOTHING_STEPS, MAX_SMOOTHING_STEPS};
use crate::core::{RenderingMode, SeriesSettings, VarianceReference, Viewport};
use crate::error::{KpiError, KpiResult};
use crate::render::{Color, LabelSettings};

use super::data_representation::{RepresentationConfig, SeriesSort, SortDirection, SortKey};

pub const MIN_COLUMNS: u8 = 1;
pub const MAX_COLUMNS: u8 = 15;

/// Host settings as `object name -> property name -> JSON value`.
pub type PropertyBag = IndexMap<String, IndexMap<String, Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Sparkline grid columns; `None` lets the layout decide.
    pub columns: Option<u8>,
    pub toggle_sparkline_on_hover: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: None,
            toggle_sparkline_on_hover: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateSettings {
    pub format: String,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            format: DEFAULT_DATE_PATTERN.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceSettings {
    pub reference: VarianceReference,
    pub format: ValueFormat,
}

impl Default for VarianceSettings {
    fn default() -> Self {
        Self {
            reference: VarianceReference::default(),
            format: ValueFormat::percent(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StalenessSettings {
    pub threshold_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    pub rendering_mode: RenderingMode,
    pub smoothing: bool,
    pub smoothing_steps: u8,
    pub gradient_suppresses_line: bool,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            rendering_mode: RenderingMode::default(),
            smoothing: true,
            smoothing_steps: DEFAULT_SMOOTHING_STEPS,
            gradient_suppresses_line: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SubtitleSettings {
    pub show: bool,
    pub text: Option<String>,
}

/// Complete settings snapshot of the visual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiSettings {
    pub grid: GridSettings,
    pub kpi: LabelSettings,
    pub date: DateSettings,
    pub values: ValueFormat,
    pub variance: VarianceSettings,
    pub staleness: StalenessSettings,
    pub line: LineSettings,
    pub sort: SeriesSort,
    pub subtitle: SubtitleSettings,
    pub fallback_text: String,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            kpi: LabelSettings::default(),
            date: DateSettings::default(),
            values: ValueFormat::number(),
            variance: VarianceSettings::default(),
            staleness: StalenessSettings::default(),
            line: LineSettings::default(),
            sort: SeriesSort::default(),
            subtitle: SubtitleSettings::default(),
            fallback_text: NOT_AVAILABLE_LABEL.to_owned(),
        }
    }
}

impl KpiSettings {
    /// Maps a host property bag onto typed settings, then validates.
    pub fn from_property_bag(bag: &PropertyBag) -> KpiResult<Self> {
        let reader = PropertyReader { bag };
        let defaults = Self::default();

        let locale = reader.locale("values", "locale", defaults.values.locale);
        let values = ValueFormat {
            display_units: reader.display_units("values", "displayUnits", defaults.values.display_units),
            precision: reader.precision("values", "precision", defaults.values.precision),
            percent: false,
            locale,
        };
        let variance_format = ValueFormat {
            display_units: reader.display_units(
                "variance",
                "displayUnits",
                defaults.variance.format.display_units,
            ),
            precision: reader.precision("variance", "precision", defaults.variance.format.precision),
            percent: true,
            locale,
        };

        let kpi_defaults = defaults.kpi;
        let kpi = LabelSettings {
            series_name_color: reader.color("kpi", "seriesNameColor", kpi_defaults.series_name_color),
            series_name_font_size: reader.f64(
                "kpi",
                "seriesNameFontSize",
                kpi_defaults.series_name_font_size,
            ),
            is_series_name_shown: reader.bool(
                "kpi",
                "isSeriesNameShown",
                kpi_defaults.is_series_name_shown,
            ),
            value_color: reader.color("kpi", "valueColor", kpi_defaults.value_color),
            value_font_size: reader.f64("kpi", "valueFontSize", kpi_defaults.value_font_size),
            is_value_shown: reader.bool("kpi", "isValueShown", kpi_defaults.is_value_shown),
            variance_color: reader.color("kpi", "varianceColor", kpi_defaults.variance_color),
            variance_font_size: reader.f64(
                "kpi",
                "varianceFontSize",
                kpi_defaults.variance_font_size,
            ),
            variance_not_available_color: reader.color(
                "kpi",
                "varianceNotAvailableColor",
                kpi_defaults.variance_not_available_color,
            ),
            variance_not_available_font_size: reader.f64(
                "kpi",
                "varianceNotAvailableFontSize",
                kpi_defaults.variance_not_available_font_size,
            ),
            is_variance_shown: reader.bool("kpi", "isVarianceShown", kpi_defaults.is_variance_shown),
            date_color: reader.color("kpi", "dateColor", kpi_defaults.date_color),
            date_font_size: reader.f64("kpi", "dateFontSize", kpi_defaults.date_font_size),
            is_date_shown: reader.bool("kpi", "isDateShown", kpi_defaults.is_date_shown),
            auto_adjust_font_size: reader.bool(
                "kpi",
                "autoAdjustFontSize",
                kpi_defaults.auto_adjust_font_size,
            ),
        };

        let settings = Self {
            grid: GridSettings {
                columns: reader
                    .optional_f64("grid", "columns")
                    .and_then(clamp_columns),
                toggle_sparkline_on_hover: reader.bool(
                    "grid",
                    "toggleSparklineOnHover",
                    defaults.grid.toggle_sparkline_on_hover,
                ),
            },
            kpi,
            date: DateSettings {
                format: reader.string("date", "format", &defaults.date.format),
            },
            values,
            variance: VarianceSettings {
                reference: reader.variance_reference(defaults.variance.reference),
                format: variance_format,
            },
            staleness: StalenessSettings {
                threshold_days: reader.u32(
                    "staleness",
                    "threshold",
                    defaults.staleness.threshold_days,
                ),
            },
            line: LineSettings {
                rendering_mode: reader.rendering_mode("line", "type", defaults.line.rendering_mode),
                smoothing: reader.bool("line", "smoothing", defaults.line.smoothing),
                smoothing_steps: reader
                    .u32("line", "smoothingSteps", u32::from(defaults.line.smoothing_steps))
                    .min(u32::from(u8::MAX)) as u8,
                gradient_suppresses_line: reader.bool(
                    "line",
                    "gradientSuppressesLine",
                    defaults.line.gradient_suppresses_line,
                ),
            },
            sort: SeriesSort {
                key: reader.sort_key("sort", "key", defaults.sort.key),
                direction: reader.sort_direction("sort", "direction", defaults.sort.direction),
            },
            subtitle: SubtitleSettings {
                show: reader.bool("subtitle", "show", defaults.subtitle.show),
                text: reader.optional_string("subtitle", "text"),
            },
            fallback_text: reader.string("values", "fallbackText", &defaults.fallback_text),
        };

        debug!(
            objects = bag.len(),
            properties = bag.values().map(IndexMap::len).sum::<usize>(),
            "mapped settings property bag"
        );
        settings.validated()
    }

    pub fn from_json_str(input: &str) -> KpiResult<Self> {
        let settings: Self = serde_json::from_str(input)
            .map_err(|e| KpiError::InvalidConfig(format!("failed to parse settings json: {e}")))?;
        settings.validated()
    }

    pub fn to_json_pretty(&self) -> KpiResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KpiError::InvalidConfig(format!("failed to serialize settings: {e}")))
    }

    /// Clamps bounded values and rejects contract violations.
    pub fn validated(mut self) -> KpiResult<Self> {
        if let Some(columns) = self.grid.columns {
            self.grid.columns = clamp_columns(f64::from(columns));
        }

        self.kpi = self.kpi.clamped();
        for color in [
            self.kpi.series_name_color,
            self.kpi.value_color,
            self.kpi.variance_color,
            self.kpi.variance_not_available_color,
            self.kpi.date_color,
        ] {
            color.validate()?;
        }

        if !is_valid_date_pattern(&self.date.format) {
            return Err(KpiError::InvalidConfig(format!(
                "date format `{}` is not a valid strftime pattern",
                self.date.format
            )));
        }

        for (name, format) in [("values", self.values), ("variance", self.variance.format)] {
            if format.precision.is_some_and(|precision| precision > MAX_PRECISION) {
                return Err(KpiError::InvalidConfig(format!(
                    "{name} precision must be <= {MAX_PRECISION}"
                )));
            }
        }

        let steps = self.line.smoothing_steps.clamp(1, MAX_SMOOTHING_STEPS);
        if steps != self.line.smoothing_steps {
            warn!(
                requested = self.line.smoothing_steps,
                clamped = steps,
                "clamped smoothing steps"
            );
            self.line.smoothing_steps = steps;
        }

        Ok(self)
    }

    /// Per-series settings every series starts from.
    #[must_use]
    pub fn series_settings(&self) -> SeriesSettings {
        SeriesSettings {
            rendering_mode: self.line.rendering_mode,
            values: self.values,
            variance: self.variance.format,
            fallback_text: self.fallback_text.clone(),
            ..SeriesSettings::default()
        }
    }

    /// Global rebuild inputs for a viewport.
    #[must_use]
    pub fn representation_config(&self, viewport: Viewport) -> RepresentationConfig {
        RepresentationConfig::new(viewport)
            .with_variance_reference(self.variance.reference)
            .with_stale_threshold_days(self.staleness.threshold_days)
            .with_smoothing_steps(self.line.smoothing.then_some(self.line.smoothing_steps))
            .with_gradient_suppresses_line(self.line.gradient_suppresses_line)
            .with_sort(self.sort)
            .with_subtitle(
                self.subtitle
                    .show
                    .then(|| self.subtitle.text.clone())
                    .flatten(),
            )
            .with_date_pattern(self.date.format.clone())
    }
}

fn clamp_columns(columns: f64) -> Option<u8> {
    if columns.is_nan() {
        return None;
    }
    let clamped = columns
        .round()
        .clamp(f64::from(MIN_COLUMNS), f64::from(MAX_COLUMNS));
    if clamped != columns {
        warn!(requested = columns, clamped, "clamped grid columns");
    }
    Some(clamped as u8)
}

struct PropertyReader<'a> {
    bag: &'a PropertyBag,
}

impl PropertyReader<'_> {
    fn value(&self, object: &str, property: &str) -> Option<&Value> {
        self.bag
            .get(object)
            .and_then(|properties| properties.get(property))
            .filter(|value| !value.is_null())
    }

    fn mismatch(object: &str, property: &str, expected: &str, value: &Value) {
        warn!(
            object,
            property,
            expected,
            found = %value,
            "ignoring mistyped setting, keeping default"
        );
    }

    fn bool(&self, object: &str, property: &str, default: bool) -> bool {
        match self.value(object, property) {
            None => default,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                Self::mismatch(object, property, "bool", other);
                default
            }
        }
    }

    fn optional_f64(&self, object: &str, property: &str) -> Option<f64> {
        let value = self.value(object, property)?;
        let number = value.as_f64();
        if number.is_none() {
            Self::mismatch(object, property, "number", value);
        }
        number
    }

    fn f64(&self, object: &str, property: &str, default: f64) -> f64 {
        self.optional_f64(object, property).unwrap_or(default)
    }

    fn u32(&self, object: &str, property: &str, default: u32) -> u32 {
        match self.optional_f64(object, property) {
            Some(number) if number.is_finite() => number.round().clamp(0.0, f64::from(u32::MAX)) as u32,
            _ => default,
        }
    }

    fn optional_string(&self, object: &str, property: &str) -> Option<String> {
        let value = self.value(object, property)?;
        match value.as_str() {
            Some(text) => Some(text.to_owned()),
            None => {
                Self::mismatch(object, property, "string", value);
                None
            }
        }
    }

    fn string(&self, object: &str, property: &str, default: &str) -> String {
        self.optional_string(object, property)
            .unwrap_or_else(|| default.to_owned())
    }

    /// Accepts `"#rrggbb"` or the `{ "solid": { "color": "#rrggbb" } }` fill shape.
    fn color(&self, object: &str, property: &str, default: Color) -> Color {
        let Some(value) = self.value(object, property) else {
            return default;
        };
        let hex = value
            .as_str()
            .or_else(|| value.pointer("/solid/color").and_then(Value::as_str));
        match hex.map(Color::from_hex) {
            Some(Ok(color)) => color,
            _ => {
                Self::mismatch(object, property, "color", value);
                default
            }
        }
    }

    fn precision(&self, object: &str, property: &str, default: Option<u8>) -> Option<u8> {
        match self.value(object, property) {
            None => default,
            Some(value) => match value.as_u64() {
                Some(precision) => Some(precision.min(u64::from(u8::MAX)) as u8),
                None => {
                    Self::mismatch(object, property, "unsigned integer", value);
                    default
                }
            },
        }
    }

    /// Host display-unit codes: 0 auto, 1 none, then the unit divisor.
    fn display_units(&self, object: &str, property: &str, default: DisplayUnits) -> DisplayUnits {
        let Some(value) = self.value(object, property) else {
            return default;
        };
        match value.as_f64() {
            Some(code) if code == 0.0 => DisplayUnits::Auto,
            Some(code) if code == 1.0 => DisplayUnits::None,
            Some(code) if code == 1e3 => DisplayUnits::Thousands,
            Some(code) if code == 1e6 => DisplayUnits::Millions,
            Some(code) if code == 1e9 => DisplayUnits::Billions,
            Some(code) if code == 1e12 => DisplayUnits::Trillions,
            _ => {
                Self::mismatch(object, property, "display units code", value);
                default
            }
        }
    }

    fn locale(&self, object: &str, property: &str, default: NumberLocale) -> NumberLocale {
        self.keyword(object, property, default, |keyword| match keyword {
            "en-US" => Some(NumberLocale::EnUs),
            "es-ES" => Some(NumberLocale::EsEs),
            _ => None,
        })
    }

    fn rendering_mode(&self, object: &str, property: &str, default: RenderingMode) -> RenderingMode {
        self.keyword(object, property, default, |keyword| match keyword {
            "line" => Some(RenderingMode::Line),
            "area" => Some(RenderingMode::Area),
            _ => None,
        })
    }

    fn sort_key(&self, object: &str, property: &str, default: SortKey) -> SortKey {
        self.keyword(object, property, default, |keyword| match keyword {
            "index" => Some(SortKey::Index),
            "name" => Some(SortKey::Name),
            "value" => Some(SortKey::Value),
            "variance" => Some(SortKey::Variance),
            _ => None,
        })
    }

    fn sort_direction(&self, object: &str, property: &str, default: SortDirection) -> SortDirection {
        self.keyword(object, property, default, |keyword| match keyword {
            "ascending" => Some(SortDirection::Ascending),
            "descending" => Some(SortDirection::Descending),
            _ => None,
        })
    }

    fn variance_reference(&self, default: VarianceReference) -> VarianceReference {
        let Some(rule) = self.optional_string("variance", "reference") else {
            return default;
        };
        match rule.as_str() {
            "firstPoint" => VarianceReference::FirstPoint,
            "daysBack" => VarianceReference::DaysBack(self.u32("variance", "daysBack", 0)),
            "atDate" => match self
                .optional_string("variance", "date")
                .and_then(|text| DateTime::parse_from_rfc3339(&text).ok())
            {
                Some(date) => VarianceReference::AtDate(date.with_timezone(&Utc)),
                None => {
                    warn!("variance reference `atDate` without a valid RFC 3339 date");
                    default
                }
            },
            "value" => VarianceReference::Value(self.f64("variance", "value", f64::NAN)),
            other => {
                warn!(reference = other, "unknown variance reference, keeping default");
                default
            }
        }
    }

    fn keyword<T: Copy>(
        &self,
        object: &str,
        property: &str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> T {
        let Some(value) = self.value(object, property) else {
            return default;
        };
        match value.as_str().and_then(&parse) {
            Some(parsed) => parsed,
            None => {
                Self::mismatch(object, property, "keyword", value);
                default
            }
        }
    }
}
