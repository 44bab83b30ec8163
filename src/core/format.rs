use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Text shown in place of a value that cannot be computed.
pub const NOT_AVAILABLE_LABEL: &str = "N/A";
pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";
pub const MAX_PRECISION: u8 = 12;

/// Locale preset for decimal and group separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NumberLocale {
    #[default]
    EnUs,
    EsEs,
}

impl NumberLocale {
    fn separators(self) -> (char, char) {
        match self {
            Self::EnUs => ('.', ','),
            Self::EsEs => (',', '.'),
        }
    }
}

/// Scaling applied before a number is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DisplayUnits {
    #[default]
    None,
    /// Picks the largest unit not exceeding the magnitude of the value.
    Auto,
    Thousands,
    Millions,
    Billions,
    Trillions,
}

impl DisplayUnits {
    fn resolve(self, value: f64) -> (f64, &'static str) {
        let magnitude = value.abs();
        let unit = match self {
            Self::Auto if magnitude >= 1e12 => Self::Trillions,
            Self::Auto if magnitude >= 1e9 => Self::Billions,
            Self::Auto if magnitude >= 1e6 => Self::Millions,
            Self::Auto if magnitude >= 1e3 => Self::Thousands,
            Self::Auto => Self::None,
            other => other,
        };
        match unit {
            Self::Thousands => (1e3, "K"),
            Self::Millions => (1e6, "M"),
            Self::Billions => (1e9, "bn"),
            Self::Trillions => (1e12, "T"),
            Self::None | Self::Auto => (1.0, ""),
        }
    }
}

/// Number format options handed to a [`ValueFormatter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValueFormat {
    pub display_units: DisplayUnits,
    /// Fixed number of decimals; `None` prints up to two and trims zeros.
    pub precision: Option<u8>,
    pub percent: bool,
    pub locale: NumberLocale,
}

impl ValueFormat {
    #[must_use]
    pub fn number() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn percent(precision: u8) -> Self {
        Self {
            precision: Some(precision),
            percent: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_display_units(mut self, display_units: DisplayUnits) -> Self {
        self.display_units = display_units;
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: Option<u8>) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }
}

/// Host capability turning a number into display text.
pub trait ValueFormatter: Send + Sync {
    fn format_value(&self, value: f64, format: &ValueFormat) -> String;
}

/// Host capability turning a date into display text.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: DateTime<Utc>, pattern: &str) -> String;
}

/// Formats `value`, or returns `fallback` when it is not finite.
#[must_use]
pub fn format_value_with_fallback(
    formatter: &dyn ValueFormatter,
    value: f64,
    format: &ValueFormat,
    fallback: &str,
) -> String {
    if value.is_finite() {
        formatter.format_value(value, format)
    } else {
        fallback.to_owned()
    }
}

/// Returns `true` when `pattern` is a non-empty, well-formed strftime pattern.
#[must_use]
pub fn is_valid_date_pattern(pattern: &str) -> bool {
    !pattern.is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueFormatter;

impl ValueFormatter for DefaultValueFormatter {
    fn format_value(&self, value: f64, format: &ValueFormat) -> String {
        if !value.is_finite() {
            return NOT_AVAILABLE_LABEL.to_owned();
        }

        let value = if format.percent { value * 100.0 } else { value };
        let (divisor, suffix) = format.display_units.resolve(value);
        let scaled = value / divisor;

        let mut text = format_decimal(scaled, format.precision, format.locale);
        text.push_str(suffix);
        if format.percent {
            text.push('%');
        }
        text
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDateFormatter;

impl DateFormatter for DefaultDateFormatter {
    fn format_date(&self, date: DateTime<Utc>, pattern: &str) -> String {
        let mut text = String::new();
        if write!(text, "{}", date.format(pattern)).is_err() {
            return date.format(DEFAULT_DATE_PATTERN).to_string();
        }
        text
    }
}

fn format_decimal(value: f64, precision: Option<u8>, locale: NumberLocale) -> String {
    let decimals = u32::from(precision.unwrap_or(2).min(MAX_PRECISION));
    let plain = match Decimal::from_f64(value) {
        Some(decimal) => {
            let rounded =
                decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            if precision.is_some() {
                format!("{rounded:.prec$}", prec = decimals as usize)
            } else {
                rounded.normalize().to_string()
            }
        }
        None => format!("{value:.prec$}", prec = decimals as usize),
    };

    localize(&plain, locale)
}

fn localize(plain: &str, locale: NumberLocale) -> String {
    let (decimal_separator, group_separator) = locale.separators();
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut text = String::with_capacity(plain.len() + integer.len() / 3 + 1);
    text.push_str(sign);
    for (position, digit) in integer.chars().enumerate() {
        if position > 0 && (integer.len() - position) % 3 == 0 {
            text.push(group_separator);
        }
        text.push(digit);
    }
    if let Some(fraction) = fraction {
        text.push(decimal_separator);
        text.push_str(fraction);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::{NumberLocale, format_decimal, is_valid_date_pattern};

    #[test]
    fn decimal_groups_thousands_per_locale() {
        assert_eq!(format_decimal(1234567.891, Some(2), NumberLocale::EnUs), "1,234,567.89");
        assert_eq!(format_decimal(1234567.891, Some(2), NumberLocale::EsEs), "1.234.567,89");
    }

    #[test]
    fn decimal_without_precision_trims_trailing_zeros() {
        assert_eq!(format_decimal(12.5, None, NumberLocale::EnUs), "12.5");
        assert_eq!(format_decimal(-3.0, None, NumberLocale::EnUs), "-3");
    }

    #[test]
    fn date_pattern_validation_rejects_bad_specifiers() {
        assert!(is_valid_date_pattern("%Y-%m-%d"));
        assert!(!is_valid_date_pattern("%Q"));
        assert!(!is_valid_date_pattern(""));
    }
}
