//! Intersections between segments, and of a segment with itself.
//!
//! Both functions return pairs of segment parameters in `[0, 1]`. Endpoints
//! count, so two consecutive segments of a path always "intersect" at their
//! shared point; it's up to the caller to throw those away.
//!
//! NaN input coordinates produce NaN parameters rather than a panic.

use arrayvec::ArrayVec;
use kurbo::{
    CubicBez, Line, ParamCurve as _, ParamCurveNearest as _, PathSeg, Point, Rect, Shape as _,
};

use crate::curve::{is_point, seg_deriv};

// Subdivision stops once both parameter ranges are this small.
const LEAF_WIDTH: f64 = 1.0 / 65536.0;

// Candidates this close together (in parameter space, on both curves) are
// considered to be the same intersection.
const CLUSTER_WIDTH: f64 = 64.0 * LEAF_WIDTH;

// The maximum number of bounding box pairs we'll examine. Overlapping curves
// would otherwise make the subdivision explode.
const MAX_BOX_PAIRS: usize = 1 << 14;

const NEWTON_STEPS: usize = 8;

/// Finds all the places where two segments meet.
///
/// The result contains at most one pair per geometric crossing, in no
/// particular order. Collinear overlapping lines report nothing.
pub fn segment_intersections(a: PathSeg, b: PathSeg) -> Vec<(f64, f64)> {
    if a.is_nan() || b.is_nan() {
        return vec![(f64::NAN, f64::NAN)];
    }
    let ca = a.to_cubic();
    let cb = b.to_cubic();
    let tol = tolerance(ca, cb);

    // A segment that doesn't move meets the other one at most once, and
    // subdividing it would find the same point over and over.
    match (is_point(a), is_point(b)) {
        (true, true) => {
            let touching = (a.start() - b.start()).hypot() <= tol;
            return if touching { vec![(0.0, 0.0)] } else { Vec::new() };
        }
        (true, false) => {
            return point_on(b, a.start(), tol).map(|t| (0.0, t)).into_iter().collect();
        }
        (false, true) => {
            return point_on(a, b.start(), tol).map(|s| (s, 0.0)).into_iter().collect();
        }
        (false, false) => {}
    }

    if let (PathSeg::Line(la), PathSeg::Line(lb)) = (a, b) {
        return line_intersection(la, lb).into_iter().collect();
    }

    let mut search = Subdivision {
        a,
        b,
        tolerance: tol,
        box_pairs: 0,
        candidates: Vec::new(),
    };
    search.recurse(ca, 0.0..1.0, cb, 0.0..1.0);
    if search.box_pairs >= MAX_BOX_PAIRS {
        tracing::debug!("intersection search hit its budget; the segments probably overlap");
    }
    cluster(search.candidates)
}

/// Finds the places where a segment crosses itself.
///
/// Only cubics can do that, and a cubic has at most one loop. The returned
/// pair has its smaller parameter first. Cusps (where the two parameters would
/// coincide) are not reported.
pub fn self_intersections(seg: PathSeg) -> ArrayVec<(f64, f64), 1> {
    let mut ret = ArrayVec::new();
    let PathSeg::Cubic(c) = seg else {
        return ret;
    };
    if seg.is_nan() {
        ret.push((f64::NAN, f64::NAN));
        return ret;
    }

    // Write the cubic as a t^3 + b t^2 + c t + p0. The loop parameters are the
    // two roots of a quadratic whose coefficients come from the cross products
    // of a, b and c.
    let a = -c.p0.to_vec2() + 3.0 * c.p1.to_vec2() - 3.0 * c.p2.to_vec2() + c.p3.to_vec2();
    let b = 3.0 * c.p0.to_vec2() - 6.0 * c.p1.to_vec2() + 3.0 * c.p2.to_vec2();
    let cc = 3.0 * (c.p1 - c.p0);

    let m = a.y * b.x - a.x * b.y;
    let n = a.x * cc.y - a.y * cc.x;
    let k = (-3.0 * a.x * a.x * cc.y * cc.y
        + 6.0 * a.x * a.y * cc.x * cc.y
        + 4.0 * a.x * b.x * b.y * cc.y
        - 4.0 * a.x * b.y * b.y * cc.x
        - 3.0 * a.y * a.y * cc.x * cc.x
        - 4.0 * a.y * b.x * b.x * cc.y
        + 4.0 * a.y * b.x * b.y * cc.x)
        / (m * m);

    // NaN (from m == 0) fails all of these comparisons too.
    if !(k > 0.0) {
        return ret;
    }
    let t0 = (n / m - k.sqrt()) / 2.0;
    let t1 = (n / m + k.sqrt()) / 2.0;
    let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    let inside = |t: f64| (0.0..=1.0).contains(&t);
    if inside(t0) && inside(t1) && t0 < t1 {
        ret.push((t0, t1));
    }
    ret
}

// A distance below which two points are considered equal, scaled to the
// size of the input.
fn tolerance(a: CubicBez, b: CubicBez) -> f64 {
    let bbox = a.bounding_box().union(b.bounding_box());
    let scale = bbox
        .min_x()
        .abs()
        .max(bbox.max_x().abs())
        .max(bbox.min_y().abs())
        .max(bbox.max_y().abs());
    (scale * 1e-9).max(1e-12)
}

// The parameter of the point of `seg` closest to `p`, if it's close enough to
// count as touching.
fn point_on(seg: PathSeg, p: Point, tol: f64) -> Option<f64> {
    let nearest = seg.nearest(p, 1e-12);
    (nearest.distance_sq.sqrt() <= 1e3 * tol).then_some(nearest.t)
}

fn line_intersection(a: Line, b: Line) -> Option<(f64, f64)> {
    let da = a.p1 - a.p0;
    let db = b.p1 - b.p0;
    let denom = da.cross(db);
    if denom.is_nan() {
        return Some((f64::NAN, f64::NAN));
    }
    if denom == 0.0 {
        return None;
    }
    let offset = b.p0 - a.p0;
    let s = offset.cross(db) / denom;
    let t = offset.cross(da) / denom;

    // Allow for a little rounding error at the endpoints: the shared point of
    // two consecutive segments must be found so that it can be recognized.
    let slop = 1e-12;
    let inside = |x: f64| (-slop..=1.0 + slop).contains(&x);
    (inside(s) && inside(t)).then(|| (s.clamp(0.0, 1.0), t.clamp(0.0, 1.0)))
}

struct Candidate {
    s: f64,
    t: f64,
    residual: f64,
}

struct Subdivision {
    a: PathSeg,
    b: PathSeg,
    tolerance: f64,
    box_pairs: usize,
    candidates: Vec<Candidate>,
}

impl Subdivision {
    fn recurse(
        &mut self,
        ca: CubicBez,
        ra: std::ops::Range<f64>,
        cb: CubicBez,
        rb: std::ops::Range<f64>,
    ) {
        if self.box_pairs >= MAX_BOX_PAIRS {
            return;
        }
        self.box_pairs += 1;

        if !boxes_meet(ca.bounding_box(), cb.bounding_box(), self.tolerance) {
            return;
        }

        let wa = ra.end - ra.start;
        let wb = rb.end - rb.start;
        if wa <= LEAF_WIDTH && wb <= LEAF_WIDTH {
            self.add_candidate(0.5 * (ra.start + ra.end), 0.5 * (rb.start + rb.end));
            return;
        }

        // Split whichever curve has the wider parameter range (or both).
        let mid_a = 0.5 * (ra.start + ra.end);
        let mid_b = 0.5 * (rb.start + rb.end);
        let halves_a: ArrayVec<_, 2> = if wa > LEAF_WIDTH {
            let (l, r) = ca.subdivide();
            [(l, ra.start..mid_a), (r, mid_a..ra.end)].into_iter().collect()
        } else {
            [(ca, ra)].into_iter().collect()
        };
        let halves_b: ArrayVec<_, 2> = if wb > LEAF_WIDTH {
            let (l, r) = cb.subdivide();
            [(l, rb.start..mid_b), (r, mid_b..rb.end)].into_iter().collect()
        } else {
            [(cb, rb)].into_iter().collect()
        };

        for (sub_a, sub_ra) in &halves_a {
            for (sub_b, sub_rb) in &halves_b {
                self.recurse(*sub_a, sub_ra.clone(), *sub_b, sub_rb.clone());
            }
        }
    }

    fn add_candidate(&mut self, s: f64, t: f64) {
        let (s, t, residual) = polish(self.a, self.b, s, t);
        if residual <= 1e3 * self.tolerance {
            self.candidates.push(Candidate { s, t, residual });
        }
    }
}

fn boxes_meet(a: Rect, b: Rect, eps: f64) -> bool {
    a.x0 <= b.x1 + eps && b.x0 <= a.x1 + eps && a.y0 <= b.y1 + eps && b.y0 <= a.y1 + eps
}

// Newton iteration on A(s) - B(t) = 0. Returns the polished parameters and
// the remaining distance between the two points.
fn polish(a: PathSeg, b: PathSeg, mut s: f64, mut t: f64) -> (f64, f64, f64) {
    let dist = |s: f64, t: f64| (a.eval(s) - b.eval(t)).hypot();
    let mut best = (s, t, dist(s, t));

    for _ in 0..NEWTON_STEPS {
        let f = a.eval(s) - b.eval(t);
        let da = seg_deriv(a, s);
        let db = -seg_deriv(b, t);
        let det = da.cross(db);
        if det == 0.0 || !det.is_finite() {
            break;
        }
        // Solve [da db] (ds, dt) = -f by Cramer's rule.
        let ds = -f.cross(db) / det;
        let dt = -da.cross(f) / det;
        s = (s + ds).clamp(0.0, 1.0);
        t = (t + dt).clamp(0.0, 1.0);

        let d = dist(s, t);
        if d < best.2 {
            best = (s, t, d);
        }
        if d == 0.0 {
            break;
        }
    }
    best
}

// Merges candidates that are close together on both curves, keeping the one
// with the smallest residual from each group.
fn cluster(mut candidates: Vec<Candidate>) -> Vec<(f64, f64)> {
    candidates.sort_by(|x, y| x.s.total_cmp(&y.s));

    let mut groups: Vec<Candidate> = Vec::new();
    for c in candidates {
        let same = groups.iter_mut().rev().find(|g| {
            (g.s - c.s).abs() <= CLUSTER_WIDTH && (g.t - c.t).abs() <= CLUSTER_WIDTH
        });
        match same {
            Some(g) => {
                if c.residual < g.residual {
                    *g = c;
                }
            }
            None => groups.push(c),
        }
    }
    groups.into_iter().map(|c| (c.s, c.t)).collect()
}
