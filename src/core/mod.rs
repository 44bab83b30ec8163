pub mod axis;
pub mod format;
pub mod primitives;
pub mod scale;
pub mod series;
pub mod smoothing;
pub mod types;
pub mod viewport_size;

pub use axis::{Axis, AxisValue};
pub use format::{
    DateFormatter, DefaultDateFormatter, DefaultValueFormatter, DisplayUnits, NumberLocale,
    ValueFormat, ValueFormatter,
};
pub use scale::AxisScale;
pub use series::{
    AxisRangeOverride, DeriveContext, RawSeries, RenderingMode, Series, SeriesSettings,
    VarianceReference, derive_series, relative_change,
};
pub use smoothing::smooth_points;
pub use types::{Point, RawPoint, SelectionId, Viewport};
pub use viewport_size::{ViewportSize, classify_viewport};
