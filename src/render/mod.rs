pub mod kpi_label;
pub mod primitives;

pub use kpi_label::{
    FontSize, FragmentSelector, KpiLabel, LabelFragment, LabelGroups, LabelSettings,
    render_kpi_label,
};
pub use primitives::Color;
