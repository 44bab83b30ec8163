//! kpi-rs: derived data model and label logic for multi-series KPI visuals.
//!
//! Raw date/value series go through [`DataRepresentationBuilder`] into a
//! [`DataRepresentation`] snapshot (per-series statistics, smoothed curves,
//! axis scales, formatted text). [`render::render_kpi_label`] turns one
//! derived series into header/body/footer label fragments. Painting and
//! event transport stay with the host.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{DataRepresentation, DataRepresentationBuilder, KpiSettings, RepresentationConfig};
pub use error::{KpiError, KpiResult};
