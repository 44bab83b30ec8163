//! KPI label fragments for one series.
//!
//! A label is three ordered groups: header (series name), body (value and
//! variance) and footer (days since the latest observation). The output is
//! paint-agnostic; each fragment maps to one text node in the host.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Series;

use super::primitives::Color;

pub const MIN_FONT_SIZE_PT: f64 = 8.0;
pub const MAX_FONT_SIZE_PT: f64 = 40.0;

/// Font size of a fragment; `Auto` leaves sizing to the host's fit logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FontSize {
    Points(f64),
    Auto,
}

/// Extra style hook attached to a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentSelector {
    /// Variance cannot be computed while font sizes are automatic.
    VarianceNotAvailable,
}

impl FragmentSelector {
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::VarianceNotAvailable => "varianceNotAvailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelFragment {
    pub text: String,
    pub color: Color,
    pub font_size: FontSize,
    pub visible: bool,
    pub fallback_selector: Option<FragmentSelector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGroups {
    pub header: SmallVec<[LabelFragment; 1]>,
    pub body: SmallVec<[LabelFragment; 2]>,
    pub footer: SmallVec<[LabelFragment; 1]>,
}

/// Result of rendering one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KpiLabel {
    /// The series has no points; the whole label group must be suppressed.
    Hidden,
    Visible(LabelGroups),
}

impl KpiLabel {
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    #[must_use]
    pub fn groups(&self) -> Option<&LabelGroups> {
        match self {
            Self::Hidden => None,
            Self::Visible(groups) => Some(groups),
        }
    }
}

/// Colors, sizes and visibility of the label roles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub series_name_color: Color,
    pub series_name_font_size: f64,
    pub is_series_name_shown: bool,
    pub value_color: Color,
    pub value_font_size: f64,
    pub is_value_shown: bool,
    pub variance_color: Color,
    pub variance_font_size: f64,
    pub variance_not_available_color: Color,
    pub variance_not_available_font_size: f64,
    pub is_variance_shown: bool,
    pub date_color: Color,
    pub date_font_size: f64,
    pub is_date_shown: bool,
    pub auto_adjust_font_size: bool,
}

impl Default for LabelSettings {
    fn default() -> Self {
        let text = Color::rgb(0.0, 0.0, 0.0);
        let muted = Color::rgb(0.4, 0.4, 0.4);
        Self {
            series_name_color: text,
            series_name_font_size: 11.0,
            is_series_name_shown: true,
            value_color: text,
            value_font_size: 11.0,
            is_value_shown: true,
            variance_color: text,
            variance_font_size: 11.0,
            variance_not_available_color: muted,
            variance_not_available_font_size: 9.0,
            is_variance_shown: true,
            date_color: text,
            date_font_size: 9.0,
            is_date_shown: true,
            auto_adjust_font_size: false,
        }
    }
}

impl LabelSettings {
    /// Returns a copy with every font size clamped into the supported range.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        for size in [
            &mut self.series_name_font_size,
            &mut self.value_font_size,
            &mut self.variance_font_size,
            &mut self.variance_not_available_font_size,
            &mut self.date_font_size,
        ] {
            *size = clamp_font_size(*size);
        }
        self
    }

    fn font_size(&self, explicit: f64) -> FontSize {
        if self.auto_adjust_font_size {
            FontSize::Auto
        } else {
            FontSize::Points(explicit)
        }
    }
}

fn clamp_font_size(size: f64) -> f64 {
    if size.is_finite() {
        size.clamp(MIN_FONT_SIZE_PT, MAX_FONT_SIZE_PT)
    } else {
        MIN_FONT_SIZE_PT
    }
}

/// Builds the label groups for `series`.
#[must_use]
pub fn render_kpi_label(series: &Series, settings: &LabelSettings) -> KpiLabel {
    if !series.has_points() {
        return KpiLabel::Hidden;
    }

    let header = SmallVec::from_buf([LabelFragment {
        text: series.name.clone(),
        color: settings.series_name_color,
        font_size: settings.font_size(settings.series_name_font_size),
        visible: settings.is_series_name_shown,
        fallback_selector: None,
    }]);

    let variance_valid = series.is_variance_valid();
    let (variance_color, variance_font_size) = if variance_valid {
        (settings.variance_color, settings.variance_font_size)
    } else {
        (
            settings.variance_not_available_color,
            settings.variance_not_available_font_size,
        )
    };
    let variance_selector = (!variance_valid && settings.auto_adjust_font_size)
        .then_some(FragmentSelector::VarianceNotAvailable);

    let body = SmallVec::from_buf([
        LabelFragment {
            text: series.formatted_value.clone(),
            color: settings.value_color,
            font_size: settings.font_size(settings.value_font_size),
            visible: settings.is_value_shown,
            fallback_selector: None,
        },
        LabelFragment {
            text: format!("({})", series.formatted_variance),
            color: variance_color,
            font_size: settings.font_size(variance_font_size),
            visible: settings.is_variance_shown,
            fallback_selector: variance_selector,
        },
    ]);

    let footer_text = match series.date_difference {
        Some(days) => format!("{days} days"),
        None => format!("{} days", series.settings.fallback_text),
    };
    let footer = SmallVec::from_buf([LabelFragment {
        text: footer_text,
        color: settings.date_color,
        font_size: settings.font_size(settings.date_font_size),
        visible: settings.is_date_shown,
        fallback_selector: None,
    }]);

    KpiLabel::Visible(LabelGroups {
        header,
        body,
        footer,
    })
}
