pub mod data_representation;
pub mod settings;

pub use data_representation::{
    DataRepresentation, DataRepresentationBuilder, RepresentationConfig, SeriesSort,
    SortDirection, SortKey,
};
pub use settings::{
    DateSettings, GridSettings, KpiSettings, LineSettings, MAX_COLUMNS, MIN_COLUMNS, PropertyBag,
    StalenessSettings, SubtitleSettings, VarianceSettings,
};
