//! The part of an under-strand hidden by the strand passing over it.

use kurbo::{Affine, Point, Vec2};

use crate::{
    curve::{Axis, Curve},
    interval::Interval,
};

/// How far along the over-strand the shadow extends, as a multiple of the
/// half-width.
///
/// The shadow is the band of half-width `w` around the over-strand's tangent
/// line, cut off at `SHADOW_MARGIN * w` on either side of the crossing. The
/// value is empirical.
pub const SHADOW_MARGIN: f64 = 3.0;

/// Finds the range of curve time on `under` hidden by a crossing.
///
/// The over-strand passes through `over_pt` in direction `over_dir`, and
/// crosses `under` at curve time `ta`. The returned interval is bracketed by
/// the closest times before and after `ta` at which `under` leaves the
/// shadow. For closed curves the bracket may wrap around, in which case the
/// interval reaches below `0` or past `under.size()`.
///
/// If the under-strand never leaves the shadow, the whole domain is hidden.
/// If `over_dir` is zero there is no well-defined shadow, and the returned
/// interval is the single time `ta`.
pub fn find_shadowed_time(
    under: &Curve,
    over_pt: Point,
    over_dir: Vec2,
    ta: f64,
    half_width: f64,
) -> Interval {
    let len = over_dir.hypot();
    if !(len > 0.0) || !len.is_finite() {
        tracing::debug!(?over_pt, "degenerate over-strand tangent; nothing hidden");
        return Interval::new(ta, ta);
    }
    let tangent = over_dir / len;
    let normal = Vec2::new(-tangent.y, tangent.x);
    // Orthonormal, so this is invertible.
    let frame = Affine::new([
        tangent.x, tangent.y, normal.x, normal.y, over_pt.x, over_pt.y,
    ]);
    let local = under.transform(frame.inverse());

    let mut times = Vec::new();
    for k in 0..local.size() {
        let offset = k as f64;
        for (axis, value) in [
            (Axis::Y, half_width),
            (Axis::Y, -half_width),
            (Axis::X, SHADOW_MARGIN * half_width),
            (Axis::X, -SHADOW_MARGIN * half_width),
        ] {
            times.extend(
                local
                    .coordinate_roots(k, axis, value)
                    .into_iter()
                    .map(|t| t + offset),
            );
        }
    }
    times.sort_by(f64::total_cmp);
    times.dedup();

    let period = under.size() as f64;
    let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
        return Interval::new(0.0, period);
    };

    let rk = times.partition_point(|&t| t <= ta);
    let tmax = match times.get(rk) {
        Some(&t) => t,
        None if under.is_closed() => first + period,
        None => period,
    };
    let tmin = match rk.checked_sub(1) {
        Some(k) => times[k],
        None if under.is_closed() => last - period,
        None => 0.0,
    };
    Interval::new(tmin, tmax)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(i: Interval, min: f64, max: f64) {
        assert!(
            (i.min() - min).abs() < 1e-9 && (i.max() - max).abs() < 1e-9,
            "{i:?} vs [{min}, {max}]"
        );
    }

    #[test]
    fn straight_crossing() {
        let under = Curve::polyline([(0.0, -10.0), (0.0, 10.0)]);
        let hidden = find_shadowed_time(&under, Point::ZERO, Vec2::new(20.0, 0.0), 0.5, 2.5);
        assert_close(hidden, 0.375, 0.625);
    }

    #[test]
    fn tangent_direction_and_length_do_not_matter() {
        let under = Curve::polyline([(0.0, -10.0), (0.0, 10.0)]);
        for dir in [Vec2::new(-1.0, 0.0), Vec2::new(1e-3, 0.0), Vec2::new(5.0, 0.0)] {
            let hidden = find_shadowed_time(&under, Point::ZERO, dir, 0.5, 2.5);
            assert_close(hidden, 0.375, 0.625);
        }
    }

    #[test]
    fn shallow_crossing_is_cut_off_by_the_margin() {
        // The under-strand has slope 1/10, so it only leaves the band
        // |y| <= 1 at |x| = 10, well past the margin at |x| = 3.
        let under = Curve::polyline([(-20.0, -2.0), (20.0, 2.0)]);
        let hidden = find_shadowed_time(&under, Point::ZERO, Vec2::new(1.0, 0.0), 0.5, 1.0);
        assert_close(hidden, 0.5 - 3.0 / 40.0, 0.5 + 3.0 / 40.0);
    }

    #[test]
    fn brackets_span_segments() {
        let under = Curve::polyline([(0.0, -10.0), (0.0, 1.0), (0.0, 10.0)]);
        let hidden = find_shadowed_time(&under, Point::ZERO, Vec2::new(1.0, 0.0), 10.0 / 11.0, 2.0);
        assert_close(hidden, 8.0 / 11.0, 1.0 + 1.0 / 9.0);
    }

    #[test]
    fn open_curve_without_bracket_extends_to_the_end() {
        let under = Curve::polyline([(0.0, 0.0), (0.0, 10.0)]);
        let hidden = find_shadowed_time(&under, Point::ZERO, Vec2::new(1.0, 0.0), 0.0, 2.0);
        assert_close(hidden, 0.0, 0.2);
    }

    #[test]
    fn closed_curve_wraps() {
        // The crossing is at the very start of a square; the last root is on
        // the closing segment.
        let under = Curve::polygon([(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]);
        let hidden = find_shadowed_time(&under, Point::ZERO, Vec2::new(1.0, 1.0), 0.0, 1.0);
        assert!(hidden.min() < 0.0);
        assert!(hidden.max() > 0.0 && hidden.max() < 1.0);
    }

    #[test]
    fn never_leaving_the_shadow_hides_everything() {
        let under = Curve::polyline([(0.0, -0.5), (0.0, 0.5)]);
        let hidden = find_shadowed_time(&under, Point::ZERO, Vec2::new(1.0, 0.0), 0.5, 2.0);
        assert_eq!(hidden, Interval::new(0.0, 1.0));
    }

    #[test]
    fn zero_tangent_hides_nothing() {
        let under = Curve::polyline([(0.0, -10.0), (0.0, 10.0)]);
        let hidden = find_shadowed_time(&under, Point::ZERO, Vec2::ZERO, 0.5, 2.5);
        assert!(hidden.is_singular());
    }
}
