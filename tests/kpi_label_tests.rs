use chrono::{DateTime, Duration, TimeZone, Utc};
use kpi_rs::core::{
    DefaultDateFormatter, DefaultValueFormatter, DeriveContext, RawPoint, RawSeries, Series,
    VarianceReference, derive_series,
};
use kpi_rs::render::{Color, FontSize, FragmentSelector, KpiLabel, LabelSettings, render_kpi_label};

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
        .single()
        .expect("valid date")
        + Duration::days(n)
}

fn derive(raw: &RawSeries, latest_date: DateTime<Utc>) -> Series {
    let context = DeriveContext {
        latest_date,
        reference: VarianceReference::FirstPoint,
        smoothing_steps: None,
        stale_threshold_days: 0,
        gradient_suppresses_line: true,
        date_pattern: "%Y-%m-%d",
        value_formatter: &DefaultValueFormatter,
        date_formatter: &DefaultDateFormatter,
    };
    derive_series(0, raw, &context).expect("derive")
}

fn valid_series() -> Series {
    derive(
        &RawSeries::new(
            "Orders",
            vec![RawPoint::new(day(0), 200.0), RawPoint::new(day(2), 250.0)],
        ),
        day(4),
    )
}

fn invalid_variance_series() -> Series {
    derive(
        &RawSeries::new(
            "Refunds",
            vec![RawPoint::new(day(0), 0.0), RawPoint::new(day(1), 3.0)],
        ),
        day(1),
    )
}

fn groups(label: &KpiLabel) -> &kpi_rs::render::LabelGroups {
    label.groups().expect("visible label")
}

#[test]
fn series_without_points_hides_the_label() {
    let series = derive(&RawSeries::new("Nothing", Vec::new()), day(0));

    let label = render_kpi_label(&series, &LabelSettings::default());

    assert!(label.is_hidden());
    assert!(label.groups().is_none());
}

#[test]
fn label_has_header_body_and_footer_in_order() {
    let label = render_kpi_label(&valid_series(), &LabelSettings::default());
    let groups = groups(&label);

    assert_eq!(groups.header.len(), 1);
    assert_eq!(groups.header[0].text, "Orders");
    assert_eq!(groups.body.len(), 2);
    assert_eq!(groups.body[0].text, "250");
    assert_eq!(groups.body[1].text, "(25%)");
    assert_eq!(groups.footer.len(), 1);
    assert_eq!(groups.footer[0].text, "2 days");
}

#[test]
fn explicit_sizes_and_colors_are_used_when_not_auto() {
    let settings = LabelSettings {
        value_color: Color::rgb(1.0, 0.0, 0.0),
        value_font_size: 24.0,
        ..LabelSettings::default()
    };

    let label = render_kpi_label(&valid_series(), &settings);
    let value = &groups(&label).body[0];

    assert_eq!(value.color, Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(value.font_size, FontSize::Points(24.0));
    assert_eq!(value.fallback_selector, None);
}

#[test]
fn auto_font_size_applies_to_every_fragment() {
    let settings = LabelSettings {
        auto_adjust_font_size: true,
        ..LabelSettings::default()
    };

    let label = render_kpi_label(&valid_series(), &settings);
    let groups = groups(&label);

    let fragments = groups
        .header
        .iter()
        .chain(groups.body.iter())
        .chain(groups.footer.iter());
    for fragment in fragments {
        assert_eq!(fragment.font_size, FontSize::Auto);
    }
}

#[test]
fn invalid_variance_uses_not_available_style() {
    let settings = LabelSettings::default();

    let label = render_kpi_label(&invalid_variance_series(), &settings);
    let variance = &groups(&label).body[1];

    assert_eq!(variance.text, "(N/A)");
    assert_eq!(variance.color, settings.variance_not_available_color);
    assert_eq!(
        variance.font_size,
        FontSize::Points(settings.variance_not_available_font_size)
    );
    assert_eq!(variance.fallback_selector, None);
}

#[test]
fn fallback_selector_requires_invalid_variance_and_auto_size() {
    let auto = LabelSettings {
        auto_adjust_font_size: true,
        ..LabelSettings::default()
    };

    let invalid = render_kpi_label(&invalid_variance_series(), &auto);
    let selector = groups(&invalid).body[1].fallback_selector;
    assert_eq!(selector, Some(FragmentSelector::VarianceNotAvailable));
    assert_eq!(
        selector.map(FragmentSelector::class_name),
        Some("varianceNotAvailable")
    );

    let valid = render_kpi_label(&valid_series(), &auto);
    assert_eq!(groups(&valid).body[1].fallback_selector, None);
}

#[test]
fn visibility_flags_are_carried_per_fragment() {
    let settings = LabelSettings {
        is_series_name_shown: false,
        is_date_shown: false,
        ..LabelSettings::default()
    };

    let label = render_kpi_label(&valid_series(), &settings);
    let groups = groups(&label);

    assert!(!groups.header[0].visible);
    assert!(groups.body[0].visible);
    assert!(groups.body[1].visible);
    assert!(!groups.footer[0].visible);
}

#[test]
fn negative_day_difference_is_rendered_as_is() {
    let mut series = valid_series();
    series.date_difference = Some(-3);

    let label = render_kpi_label(&series, &LabelSettings::default());

    assert_eq!(groups(&label).footer[0].text, "-3 days");
}

#[test]
fn missing_day_difference_uses_fallback_text() {
    let mut series = valid_series();
    series.date_difference = None;

    let label = render_kpi_label(&series, &LabelSettings::default());

    assert_eq!(groups(&label).footer[0].text, "N/A days");
}

#[test]
fn clamped_settings_bound_font_sizes() {
    let settings = LabelSettings {
        series_name_font_size: 2.0,
        value_font_size: 120.0,
        date_font_size: f64::NAN,
        ..LabelSettings::default()
    }
    .clamped();

    assert_eq!(settings.series_name_font_size, 8.0);
    assert_eq!(settings.value_font_size, 40.0);
    assert_eq!(settings.date_font_size, 8.0);
    assert_eq!(settings.variance_font_size, 11.0);
}
