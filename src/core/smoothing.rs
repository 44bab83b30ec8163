//! Shape-preserving curve densification for line and area rendering.
//!
//! Uses Fritsch–Carlson monotone cubic Hermite interpolation. The curve passes
//! through every source point and each interpolated value stays between the
//! two source values it sits between.

use crate::core::primitives::{datetime_to_unix_millis, unix_millis_to_datetime};
use crate::core::types::Point;

pub const DEFAULT_SMOOTHING_STEPS: u8 = 8;
pub const MAX_SMOOTHING_STEPS: u8 = 32;

/// Densifies `points`, splitting each smoothable interval into `steps` sub-intervals.
///
/// An interval is smoothable when both ends are valid and time strictly
/// increases across it. Other intervals are kept as-is. Interpolated points
/// carry the index of their left source point.
#[must_use]
pub fn smooth_points(points: &[Point], steps: u8) -> Vec<Point> {
    if points.len() < 2 || steps < 2 {
        return points.to_vec();
    }

    let tangents = monotone_tangents(points);
    let mut smoothed = Vec::with_capacity(points.len() * usize::from(steps));

    for (position, point) in points.iter().enumerate() {
        smoothed.push(*point);

        let Some(next) = points.get(position + 1) else {
            continue;
        };
        let (Some(m0), Some(m1)) = (tangents[position], tangents[position + 1]) else {
            continue;
        };
        if !is_smoothable(point, next) {
            continue;
        }

        let x0 = datetime_to_unix_millis(point.x);
        let h = datetime_to_unix_millis(next.x) - x0;
        let (low, high) = if point.y <= next.y {
            (point.y, next.y)
        } else {
            (next.y, point.y)
        };

        for step in 1..steps {
            let t = f64::from(step) / f64::from(steps);
            let Some(x) = unix_millis_to_datetime(x0 + t * h) else {
                continue;
            };
            let y = hermite(t, h, point.y, next.y, m0, m1).clamp(low, high);
            smoothed.push(Point::new(x, y, point.index));
        }
    }

    smoothed
}

fn is_smoothable(left: &Point, right: &Point) -> bool {
    left.is_valid() && right.is_valid() && right.x > left.x
}

/// Per-point tangents; `None` for points outside any smoothable run.
fn monotone_tangents(points: &[Point]) -> Vec<Option<f64>> {
    let mut tangents = vec![None; points.len()];

    let mut run_start = 0;
    while run_start < points.len() {
        let mut run_end = run_start;
        while run_end + 1 < points.len() && is_smoothable(&points[run_end], &points[run_end + 1])
        {
            run_end += 1;
        }

        if run_end > run_start {
            let run = &points[run_start..=run_end];
            for (offset, tangent) in run_tangents(run).into_iter().enumerate() {
                tangents[run_start + offset] = Some(tangent);
            }
        }

        run_start = run_end + 1;
    }

    tangents
}

fn run_tangents(run: &[Point]) -> Vec<f64> {
    let secants: Vec<f64> = run
        .windows(2)
        .map(|pair| {
            let h = datetime_to_unix_millis(pair[1].x) - datetime_to_unix_millis(pair[0].x);
            (pair[1].y - pair[0].y) / h
        })
        .collect();

    let last = run.len() - 1;
    let mut tangents = vec![0.0; run.len()];
    tangents[0] = secants[0];
    tangents[last] = secants[last - 1];
    for k in 1..last {
        let (before, after) = (secants[k - 1], secants[k]);
        tangents[k] = if before * after <= 0.0 {
            0.0
        } else {
            (before + after) / 2.0
        };
    }

    for (k, secant) in secants.iter().copied().enumerate() {
        if secant == 0.0 {
            tangents[k] = 0.0;
            tangents[k + 1] = 0.0;
            continue;
        }

        let alpha = tangents[k] / secant;
        let beta = tangents[k + 1] / secant;
        if alpha < 0.0 {
            tangents[k] = 0.0;
        }
        if beta < 0.0 {
            tangents[k + 1] = 0.0;
        }

        let magnitude = alpha * alpha + beta * beta;
        if magnitude > 9.0 {
            let tau = 3.0 / magnitude.sqrt();
            tangents[k] = tau * alpha * secant;
            tangents[k + 1] = tau * beta * secant;
        }
    }

    tangents
}

fn hermite(t: f64, h: f64, y0: f64, y1: f64, m0: f64, m1: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * y0 + h10 * h * m0 + h01 * y1 + h11 * h * m1
}
