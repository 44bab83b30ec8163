use kpi_rs::core::{Axis, AxisScale};
use proptest::prelude::*;

proptest! {
    #[test]
    fn fitted_axis_normalizes_its_own_bounds(
        values in proptest::collection::vec(-1_000_000.0f64..1_000_000.0, 1..64)
    ) {
        let axis = Axis::fit(values.iter().copied(), (0.0, 1.0)).expect("fit");

        prop_assert!(axis.initial_min() <= axis.initial_max());
        if axis.scale().is_degenerate() {
            prop_assert_eq!(axis.apply(axis.min()), 0.5);
            prop_assert_eq!(axis.apply(axis.max()), 0.5);
        } else {
            prop_assert_eq!(axis.apply(axis.min()), 0.0);
            prop_assert_eq!(axis.apply(axis.max()), 1.0);
        }
    }

    #[test]
    fn degenerate_scale_is_constant(
        bound in -1_000_000.0f64..1_000_000.0,
        value in proptest::num::f64::ANY
    ) {
        let scale = AxisScale::new(bound, bound).expect("degenerate scale");
        prop_assert_eq!(scale.apply(value), 0.5);
    }

    #[test]
    fn scale_round_trip_property(
        domain_start in -1_000_000.0f64..1_000_000.0,
        domain_span in 0.001f64..1_000_000.0,
        value_factor in 0.0f64..1.0
    ) {
        let domain_end = domain_start + domain_span;
        let value = domain_start + value_factor * domain_span;

        let scale = AxisScale::new(domain_start, domain_end)
            .expect("valid scale")
            .with_range(0.0, 2048.0)
            .expect("pixel range");

        let px = scale.apply(value);
        let recovered = scale.invert(px);
        prop_assert!((recovered - value).abs() <= 1e-6);
    }

    #[test]
    fn scale_is_monotonic(
        a in -1_000.0f64..1_000.0,
        b in -1_000.0f64..1_000.0
    ) {
        let scale = AxisScale::new(-1_000.0, 1_000.0).expect("valid scale");
        if a <= b {
            prop_assert!(scale.apply(a) <= scale.apply(b));
        } else {
            prop_assert!(scale.apply(a) >= scale.apply(b));
        }
    }
}
