//! Piecewise-polynomial curves, addressed by "curve time".
//!
//! A [`Curve`] is a contiguous run of `kurbo` segments. Curve time runs from
//! `0` to [`Curve::size`]: the integer part picks a segment and the
//! fractional part is the parameter within it, so `t = 2.25` is a quarter of
//! the way along the third segment. The end of the last segment is `t = size`.

use arrayvec::ArrayVec;
use kurbo::{
    common::solve_cubic, Affine, BezPath, Line, ParamCurve as _, ParamCurveDeriv as _, PathEl,
    PathSeg, Point, Vec2,
};

use crate::interval::Interval;

/// One of the two coordinate axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    fn coord(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// A single connected piece of a path, possibly closed.
///
/// If the curve is closed and its last segment doesn't end where the first one
/// starts, a straight closing segment is stored explicitly. A closing segment
/// of zero length is never stored, so [`Curve::size`] only counts it when it
/// is non-degenerate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    segs: Vec<PathSeg>,
    closed: bool,
}

impl Curve {
    /// Creates a curve from a list of contiguous segments.
    ///
    /// If `closed` is true and the segments don't already return to their
    /// starting point, a straight closing segment is appended.
    pub fn new(mut segs: Vec<PathSeg>, closed: bool) -> Self {
        if closed {
            if let (Some(first), Some(last)) = (segs.first(), segs.last()) {
                let (start, end) = (first.start(), last.end());
                if start != end {
                    segs.push(PathSeg::Line(Line::new(end, start)));
                }
            }
        }
        Curve { segs, closed }
    }

    /// Creates an open polyline through the given points.
    pub fn polyline<P: Into<Point>>(ps: impl IntoIterator<Item = P>) -> Self {
        Curve::from_points(ps, false)
    }

    /// Creates a closed polygon through the given points.
    pub fn polygon<P: Into<Point>>(ps: impl IntoIterator<Item = P>) -> Self {
        Curve::from_points(ps, true)
    }

    fn from_points<P: Into<Point>>(ps: impl IntoIterator<Item = P>, closed: bool) -> Self {
        let ps: Vec<Point> = ps.into_iter().map(Into::into).collect();
        let segs = ps
            .windows(2)
            .map(|pair| PathSeg::Line(Line::new(pair[0], pair[1])))
            .collect();
        Curve::new(segs, closed)
    }

    /// Splits a `kurbo` path into its subpaths.
    ///
    /// Subpaths without any segments are skipped.
    pub fn from_bez_path(path: &BezPath) -> Vec<Curve> {
        let mut ret = Vec::new();
        let mut segs = Vec::new();
        let mut start = None;
        let mut last = None;

        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    if !segs.is_empty() {
                        ret.push(Curve::new(std::mem::take(&mut segs), false));
                    }
                    start = Some(p);
                    last = Some(p);
                }
                PathEl::LineTo(p1) => {
                    if let Some(p0) = last {
                        segs.push(PathSeg::Line(Line::new(p0, p1)));
                    } else {
                        start = Some(p1);
                    }
                    last = Some(p1);
                }
                PathEl::QuadTo(p1, p2) => {
                    if let Some(p0) = last {
                        segs.push(PathSeg::Quad(kurbo::QuadBez::new(p0, p1, p2)));
                    } else {
                        start = Some(p2);
                    }
                    last = Some(p2);
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    if let Some(p0) = last {
                        segs.push(PathSeg::Cubic(kurbo::CubicBez::new(p0, p1, p2, p3)));
                    } else {
                        start = Some(p3);
                    }
                    last = Some(p3);
                }
                PathEl::ClosePath => {
                    if !segs.is_empty() {
                        ret.push(Curve::new(std::mem::take(&mut segs), true));
                    }
                    last = start;
                }
            }
        }

        if !segs.is_empty() {
            ret.push(Curve::new(segs, false));
        }
        ret
    }

    /// The first subpath of a `kurbo` path, or an empty curve if there isn't one.
    pub fn from_subpath(path: &BezPath) -> Curve {
        Curve::from_bez_path(path)
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    /// Converts back to a `kurbo` path, closing it if this curve is closed.
    pub fn to_bez_path(&self) -> BezPath {
        let mut ret = BezPath::new();
        self.append_to(&mut ret);
        ret
    }

    /// Appends this curve to `path` as a new subpath.
    pub fn append_to(&self, path: &mut BezPath) {
        let Some(first) = self.segs.first() else {
            return;
        };
        path.move_to(first.start());
        for seg in &self.segs {
            push_seg(path, *seg);
        }
        if self.closed {
            path.close_path();
        }
    }

    /// The number of segments, including a non-degenerate closing segment.
    pub fn size(&self) -> usize {
        self.segs.len()
    }

    /// Is this curve empty?
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// Is this curve closed?
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// All the segments of this curve, in order.
    pub fn segments(&self) -> &[PathSeg] {
        &self.segs
    }

    /// The segment at index `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k` is out of bounds.
    pub fn segment(&self, k: usize) -> PathSeg {
        self.segs[k]
    }

    /// The length of our domain, as an interval.
    pub fn domain(&self) -> Interval {
        Interval::new(0.0, self.size() as f64)
    }

    /// Are all of our control points finite?
    pub fn is_finite(&self) -> bool {
        self.segs.iter().all(|s| s.is_finite())
    }

    /// Are any of our control points NaN?
    pub fn is_nan(&self) -> bool {
        self.segs.iter().any(|s| s.is_nan())
    }

    /// Splits curve time into a segment index and a parameter within that segment.
    ///
    /// Times outside the domain are clamped to it, and `t == size` maps to
    /// the end of the last segment.
    ///
    /// # Panics
    ///
    /// Panics if the curve is empty.
    pub fn locate(&self, t: f64) -> (usize, f64) {
        assert!(!self.is_empty(), "locating a time on an empty curve");
        let n = self.size();
        if t <= 0.0 {
            return (0, 0.0);
        }
        let idx = t.floor();
        if idx >= n as f64 {
            (n - 1, 1.0)
        } else {
            (idx as usize, t - idx)
        }
    }

    /// The point at curve time `t`.
    pub fn eval(&self, t: f64) -> Point {
        let (k, t) = self.locate(t);
        self.segs[k].eval(t)
    }

    /// The point and first derivative at curve time `t`.
    pub fn point_and_deriv(&self, t: f64) -> (Point, Vec2) {
        let (k, t) = self.locate(t);
        let seg = self.segs[k];
        (seg.eval(t), seg_deriv(seg, t))
    }

    /// Applies an affine transformation to every segment.
    pub fn transform(&self, affine: Affine) -> Curve {
        Curve {
            segs: self.segs.iter().map(|s| affine * *s).collect(),
            closed: self.closed,
        }
    }

    /// The sub-arc of this curve between two curve times.
    ///
    /// `range` is clamped to our domain; it does not wrap around for closed
    /// curves. The result is a single open subpath.
    pub fn portion(&self, range: Interval) -> BezPath {
        let mut ret = BezPath::new();
        if self.is_empty() {
            return ret;
        }
        let n = self.size();
        let a = range.min().clamp(0.0, n as f64);
        let b = range.max().clamp(0.0, n as f64);
        ret.move_to(self.eval(a));

        let first = (a.floor() as usize).min(n - 1);
        let last = (b.ceil() as usize).clamp(first + 1, n);
        for k in first..last {
            let lo = (a - k as f64).max(0.0);
            let hi = (b - k as f64).min(1.0);
            if hi > lo {
                push_seg(&mut ret, self.segs[k].subsegment(lo..hi));
            }
        }
        ret
    }

    /// The times in `[0, 1]` at which segment `k` has the given coordinate.
    pub fn coordinate_roots(&self, k: usize, axis: Axis, value: f64) -> ArrayVec<f64, 3> {
        let c = match self.segs[k] {
            // `to_cubic` puts a line's control points on its endpoints, which
            // changes its parametrization.
            PathSeg::Line(l) => {
                let (p0, p1) = (axis.coord(l.p0), axis.coord(l.p1));
                let mut ret = ArrayVec::new();
                if p1 != p0 {
                    let t = (value - p0) / (p1 - p0);
                    if (-ROOT_SLOP..=1.0 + ROOT_SLOP).contains(&t) {
                        ret.push(t.clamp(0.0, 1.0));
                    }
                }
                return ret;
            }
            PathSeg::Quad(q) => q.raise(),
            PathSeg::Cubic(c) => c,
        };
        let (p0, p1, p2, p3) = (
            axis.coord(c.p0),
            axis.coord(c.p1),
            axis.coord(c.p2),
            axis.coord(c.p3),
        );
        let c3 = p3 - 3.0 * p2 + 3.0 * p1 - p0;
        let c2 = 3.0 * (p2 - 2.0 * p1 + p0);
        let c1 = 3.0 * (p1 - p0);
        let c0 = p0 - value;

        solve_cubic_in_unit_interval(c0, c1, c2, c3)
            .into_iter()
            .filter(|t| (-ROOT_SLOP..=1.0 + ROOT_SLOP).contains(t))
            .map(|t| t.clamp(0.0, 1.0))
            .collect()
    }
}

// Roots this close to the unit interval are snapped onto it.
const ROOT_SLOP: f64 = 1e-9;

/// Does this segment stay at a single point?
pub fn is_point(seg: PathSeg) -> bool {
    match seg {
        PathSeg::Line(l) => l.p0 == l.p1,
        PathSeg::Quad(q) => q.p0 == q.p1 && q.p0 == q.p2,
        PathSeg::Cubic(c) => c.p0 == c.p1 && c.p0 == c.p2 && c.p0 == c.p3,
    }
}

/// The first derivative of a segment.
pub fn seg_deriv(seg: PathSeg, t: f64) -> Vec2 {
    match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
    }
}

pub(crate) fn push_seg(path: &mut BezPath, seg: PathSeg) {
    match seg {
        PathSeg::Line(l) => path.line_to(l.p1),
        PathSeg::Quad(q) => path.quad_to(q.p1, q.p2),
        PathSeg::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
    }
}

// Tries to solve a cubic, but only looks for accurate solutions in the interval [0.0, 1.0].
//
// This doesn't actually filter out solutions outside that interval, it only
// makes some tweaks for better numerical stability inside it.
fn solve_cubic_in_unit_interval(c0: f64, c1: f64, c2: f64, c3: f64) -> ArrayVec<f64, 3> {
    // For small t we can drop c3 when it's tiny compared to the other
    // coefficients. Zeroing it perturbs the cubic by about 1/T, while keeping
    // it costs a relative error of about T * 1e-15 in the roots, so T = 1e7
    // balances the two.
    let mut new_c3 = c3;
    let mut new_c2 = c2;
    if c3.abs() < c2.abs().max(c1.abs()) / 1e7 {
        new_c3 = 0.0;
        if c2.abs() < c1.abs().max(c0.abs()) / 1e7 {
            new_c2 = 0.0;
        }
    }
    let mut roots = solve_cubic(c0, c1, new_c2, new_c3);

    // A few Newton steps against the original coefficients recover the
    // accuracy lost above.
    let val_at = |x: f64| c3 * x * x * x + c2 * x * x + c1 * x + c0;
    let deriv_at = |x: f64| 3.0 * c3 * x * x + 2.0 * c2 * x + c1;
    for x in &mut roots {
        for _ in 0..3 {
            let val = val_at(*x);
            if val.abs() <= 1e-14 {
                break;
            }
            let step = val / deriv_at(*x);
            if !step.is_finite() {
                break;
            }
            // Near a double root the full step can be huge, so limit it to
            // about sqrt(val).
            let step = step.abs().min(val.abs().sqrt()).copysign(step);
            *x -= step;
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{CubicBez, QuadBez};

    fn square() -> Curve {
        Curve::polygon([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn closing_segment_counts_when_nondegenerate() {
        let sq = square();
        assert_eq!(sq.size(), 4);
        assert!(sq.is_closed());

        let explicit = Curve::polygon([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(explicit.size(), 3);

        let open = Curve::polyline([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(open.size(), 3);
    }

    #[test]
    fn bez_path_round_trip() {
        let path =
            BezPath::from_svg("M0,0 L10,0 Q15,5 10,10 C5,15 0,5 0,0 Z M20,20 L30,30").unwrap();
        let curves = Curve::from_bez_path(&path);
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].size(), 3);
        assert!(curves[0].is_closed());
        assert_eq!(curves[1].size(), 1);
        assert!(!curves[1].is_closed());

        let again = Curve::from_bez_path(&curves[0].to_bez_path());
        assert_eq!(again, vec![curves[0].clone()]);
    }

    #[test]
    fn locate_and_eval() {
        let sq = square();
        assert_eq!(sq.locate(2.25), (2, 0.25));
        assert_eq!(sq.locate(4.0), (3, 1.0));
        assert_eq!(sq.locate(-1.0), (0, 0.0));
        assert_eq!(sq.eval(1.5), Point::new(1.0, 0.5));
        assert_eq!(sq.eval(4.0), Point::new(0.0, 0.0));

        let (p, d) = sq.point_and_deriv(0.5);
        assert_eq!(p, Point::new(0.5, 0.0));
        assert_eq!(d, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn derivatives_of_each_kind() {
        let q = PathSeg::Quad(QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 0.0)));
        assert_eq!(seg_deriv(q, 0.0), Vec2::new(2.0, 2.0));
        let c = PathSeg::Cubic(CubicBez::new((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)));
        assert!((seg_deriv(c, 0.3) - Vec2::new(3.0, 0.0)).hypot() < 1e-12);
    }

    #[test]
    fn portion_spanning_segments() {
        let sq = square();
        let p = sq.portion(Interval::new(0.5, 2.5));
        let curves = Curve::from_bez_path(&p);
        assert_eq!(curves.len(), 1);
        let c = &curves[0];
        assert_eq!(c.size(), 3);
        assert!(!c.is_closed());
        assert_eq!(c.eval(0.0), Point::new(0.5, 0.0));
        assert_eq!(c.eval(3.0), Point::new(0.5, 1.0));
    }

    #[test]
    fn portion_on_segment_boundaries() {
        let sq = square();
        let c = Curve::from_subpath(&sq.portion(Interval::new(1.0, 3.0)));
        assert_eq!(c.size(), 2);
        assert_eq!(c.eval(0.0), Point::new(1.0, 0.0));
        assert_eq!(c.eval(2.0), Point::new(0.0, 1.0));
    }

    #[test]
    fn roots_on_a_cubic() {
        let c = Curve::new(
            vec![PathSeg::Cubic(CubicBez::new(
                (0.0, 0.0),
                (0.0, 3.0),
                (1.0, -3.0),
                (1.0, 0.0),
            ))],
            false,
        );
        let roots = c.coordinate_roots(0, Axis::Y, 0.0);
        assert_eq!(roots.len(), 3);
        for t in roots {
            assert!(c.eval(t).y.abs() < 1e-9);
        }
        assert!(c.coordinate_roots(0, Axis::Y, 10.0).is_empty());
        let xs = c.coordinate_roots(0, Axis::X, 0.5);
        assert_eq!(xs.len(), 1);
        assert!((xs[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn roots_on_a_line() {
        let c = Curve::polyline([(0.0, -2.0), (0.0, 2.0)]);
        let roots = c.coordinate_roots(0, Axis::Y, 1.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 0.75).abs() < 1e-12);

        // A line's time is proportional to arclength, unlike its cubic form.
        let c = Curve::polyline([(-10.0, 0.0), (10.0, 0.0)]);
        let roots = c.coordinate_roots(0, Axis::X, 2.5);
        assert_eq!(roots.as_slice(), &[0.625]);
        assert!(c.coordinate_roots(0, Axis::Y, 0.0).is_empty());
        assert!(c.coordinate_roots(0, Axis::X, 11.0).is_empty());
    }
}
