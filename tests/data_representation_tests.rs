use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use kpi_rs::api::{SeriesSort, SortDirection, SortKey};
use kpi_rs::core::{
    DateFormatter, DefaultValueFormatter, RawPoint, RawSeries, VarianceReference, Viewport,
    ViewportSize,
};
use kpi_rs::render::LabelSettings;
use kpi_rs::{DataRepresentationBuilder, KpiError, RepresentationConfig};

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid date")
        + Duration::days(n)
}

fn builder(config: RepresentationConfig) -> DataRepresentationBuilder {
    DataRepresentationBuilder::new(config).with_default_formatters()
}

fn viewport() -> Viewport {
    Viewport::new(320, 160)
}

fn series(name: &str, values: &[(i64, f64)]) -> RawSeries {
    RawSeries::new(
        name,
        values
            .iter()
            .map(|(offset, value)| RawPoint::new(day(*offset), *value))
            .collect(),
    )
}

#[test]
fn empty_input_builds_empty_representation() {
    let representation = builder(RepresentationConfig::new(viewport()))
        .build(&[])
        .expect("build");

    assert!(representation.is_empty());
    assert!(representation.sorted_order.is_empty());
    assert_eq!(representation.warning_state, 0);
    assert_eq!(representation.latest_date, DateTime::<Utc>::default());
    assert_eq!(representation.stale_date_difference, None);
    assert_eq!(representation.sorted_series().count(), 0);
}

#[test]
fn staleness_is_measured_against_global_latest_date() {
    let input = [
        series("Old", &[(0, 1.0), (1, 2.0)]),
        series("Fresh", &[(0, 5.0), (6, 8.0)]),
    ];
    let config = RepresentationConfig::new(viewport()).with_stale_threshold_days(3);

    let representation = builder(config).build(&input).expect("build");

    assert_eq!(representation.latest_date, day(6));
    assert_eq!(representation.series[0].date_difference, Some(5));
    assert_eq!(representation.series[0].stale_date_difference, Some(5));
    assert_eq!(representation.series[1].date_difference, Some(0));
    assert_eq!(representation.series[1].stale_date_difference, None);
    assert_eq!(representation.stale_date_difference, Some(5));
    assert_eq!(representation.warning_state, 1);
}

#[test]
fn host_warning_state_is_aggregated_by_max() {
    let input = [
        series("A", &[(0, 1.0)]).with_warning_state(2),
        series("B", &[(0, 1.0)]),
    ];

    let representation = builder(RepresentationConfig::new(viewport()))
        .build(&input)
        .expect("build");

    assert_eq!(representation.warning_state, 2);
}

#[test]
fn missing_formatters_fail_the_build() {
    let input = [series("A", &[(0, 1.0)])];

    let no_formatters = DataRepresentationBuilder::new(RepresentationConfig::new(viewport()));
    assert!(matches!(
        no_formatters.build(&input),
        Err(KpiError::MissingFormatter("value"))
    ));

    let value_only = DataRepresentationBuilder::new(RepresentationConfig::new(viewport()))
        .with_value_formatter(Arc::new(DefaultValueFormatter));
    assert!(matches!(
        value_only.build(&input),
        Err(KpiError::MissingFormatter("date"))
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let bad_pattern = RepresentationConfig::new(viewport()).with_date_pattern("%Q");
    assert!(matches!(
        builder(bad_pattern).build(&[]),
        Err(KpiError::InvalidConfig(_))
    ));

    let bad_steps = RepresentationConfig::new(viewport()).with_smoothing_steps(Some(0));
    assert!(matches!(
        builder(bad_steps).build(&[]),
        Err(KpiError::InvalidConfig(_))
    ));
}

#[test]
fn rebuilds_from_identical_inputs_are_identical() {
    let input = [
        series("B", &[(0, 3.0), (2, 9.0)]),
        series("A", &[(0, 3.0), (2, 9.0)]),
        series("C", &[(1, 2.0), (2, 1.0)]),
    ];
    let config = RepresentationConfig::new(viewport())
        .with_smoothing(true)
        .with_sort(SeriesSort::new(SortKey::Variance, SortDirection::Descending));
    let builder = builder(config);

    let first = builder.build(&input).expect("build");
    let second = builder.build(&input).expect("build");

    assert_eq!(first, second);
    // Equal variance keeps input order.
    assert_eq!(first.sorted_order, vec![0, 1, 2]);
}

#[test]
fn sorting_by_value_puts_missing_data_last() {
    let input = [
        series("Mid", &[(0, 5.0)]),
        RawSeries::new("Empty", Vec::new()),
        series("High", &[(0, 9.0)]),
        series("Low", &[(0, 1.0)]),
    ];

    let ascending = builder(
        RepresentationConfig::new(viewport())
            .with_sort(SeriesSort::new(SortKey::Value, SortDirection::Ascending)),
    )
    .build(&input)
    .expect("build");
    assert_eq!(ascending.sorted_order, vec![3, 0, 2, 1]);

    let descending = builder(
        RepresentationConfig::new(viewport())
            .with_sort(SeriesSort::new(SortKey::Value, SortDirection::Descending)),
    )
    .build(&input)
    .expect("build");
    assert_eq!(descending.sorted_order, vec![2, 0, 3, 1]);

    let names: Vec<&str> = descending
        .sorted_series()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, ["High", "Mid", "Low", "Empty"]);
}

#[test]
fn sorting_by_name_is_lexicographic() {
    let input = [
        series("beta", &[(0, 1.0)]),
        series("alpha", &[(0, 1.0)]),
        series("gamma", &[(0, 1.0)]),
    ];

    let representation = builder(
        RepresentationConfig::new(viewport())
            .with_sort(SeriesSort::new(SortKey::Name, SortDirection::Ascending)),
    )
    .build(&input)
    .expect("build");

    assert_eq!(representation.sorted_order, vec![1, 0, 2]);
}

#[test]
fn viewport_and_subtitle_are_carried_through() {
    let config = RepresentationConfig::new(Viewport::new(1_000, 500))
        .with_subtitle(Some("Last 30 days".to_owned()));

    let representation = builder(config).build(&[]).expect("build");

    assert_eq!(representation.viewport_size, ViewportSize::Enormous);
    assert_eq!(representation.viewport, Viewport::new(1_000, 500));
    assert_eq!(representation.subtitle.as_deref(), Some("Last 30 days"));
}

#[test]
fn percent_calc_date_follows_the_reference_rule() {
    let input = [
        series("A", &[(2, 1.0), (10, 2.0)]),
        series("B", &[(1, 1.0), (8, 2.0)]),
    ];

    let first_point = builder(RepresentationConfig::new(viewport()))
        .build(&input)
        .expect("build");
    assert_eq!(first_point.percent_calc_date, day(1));

    let days_back = builder(
        RepresentationConfig::new(viewport())
            .with_variance_reference(VarianceReference::DaysBack(7)),
    )
    .build(&input)
    .expect("build");
    assert_eq!(days_back.percent_calc_date, day(3));

    let fixed = builder(
        RepresentationConfig::new(viewport())
            .with_variance_reference(VarianceReference::Value(1.0)),
    )
    .build(&input)
    .expect("build");
    assert_eq!(fixed.percent_calc_date, day(10));
}

struct IsoWeekFormatter;

impl DateFormatter for IsoWeekFormatter {
    fn format_date(&self, date: DateTime<Utc>, _pattern: &str) -> String {
        date.format("%G-W%V").to_string()
    }
}

#[test]
fn injected_date_formatter_is_used() {
    let input = [series("A", &[(0, 1.0)])];

    let representation = DataRepresentationBuilder::new(RepresentationConfig::new(viewport()))
        .with_value_formatter(Arc::new(DefaultValueFormatter))
        .with_date_formatter(Arc::new(IsoWeekFormatter))
        .build(&input)
        .expect("build");

    assert_eq!(representation.series[0].formatted_date, "2024-W01");
}

#[test]
fn labels_follow_sorted_order_and_hide_empty_series() {
    let input = [
        RawSeries::new("Empty", Vec::new()),
        series("Full", &[(0, 2.0), (1, 4.0)]),
    ];

    let representation = builder(
        RepresentationConfig::new(viewport())
            .with_sort(SeriesSort::new(SortKey::Index, SortDirection::Descending)),
    )
    .build(&input)
    .expect("build");

    let labels = representation.labels(&LabelSettings::default());
    assert_eq!(labels.len(), 2);
    assert!(!labels[0].is_hidden());
    assert!(labels[1].is_hidden());
}

#[test]
fn representation_serializes_to_json() {
    let input = [series("A", &[(0, 1.0), (1, 2.0)])];

    let representation = builder(RepresentationConfig::new(viewport()))
        .build(&input)
        .expect("build");
    let json = representation.to_json_pretty().expect("json");

    assert!(json.contains("\"series\""));
    assert!(json.contains("\"viewport_size\": \"Normal\""));
}
