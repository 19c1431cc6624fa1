//! Cutting the hidden parts out of under-strands.
//!
//! Each component is carved on its own: we start with its whole domain, and
//! for every crossing where it goes under we remove the shadow of the strand
//! on top. Whatever survives is emitted as a list of open arcs.

use kurbo::{BezPath, PathEl, Point, Vec2};

use crate::{
    config::KnotConfig,
    crossing::{CrossingPoint, CrossingPoints, Sign},
    curve::Curve,
    interval::{subtract_periodic, Interval},
    shadow::find_shadowed_time,
    Error,
};

/// The handedness of a crossing in the current geometry.
///
/// This is `+1` if the tangent of strand `j` points clockwise from the
/// tangent of strand `i` (in a y-up frame), and `-1` otherwise.
pub fn geometric_sign(paths: &[Curve], cp: &CrossingPoint) -> Result<Sign, Error> {
    let (_, di) = component(paths, cp.i)?.point_and_deriv(cp.ti);
    let (_, dj) = component(paths, cp.j)?.point_and_deriv(cp.tj);
    Ok(if di.cross(dj) < 0.0 {
        Sign::Positive
    } else {
        Sign::Negative
    })
}

// The component at one end of a crossing. Crossings never touch empty curves,
// so finding one here means the crossings are out of date.
fn component(paths: &[Curve], idx: usize) -> Result<&Curve, Error> {
    paths
        .get(idx)
        .filter(|c| !c.is_empty())
        .ok_or(Error::UnknownComponent { component: idx })
}

/// One strand passing under another at a crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Underpass {
    /// The component that goes under.
    pub under: usize,
    /// The component on top.
    pub over: usize,
    /// The time of the crossing on the under-strand.
    pub t_under: f64,
    /// The position of the crossing on the over-strand.
    pub over_pt: Point,
    /// The tangent of the over-strand at the crossing.
    pub over_dir: Vec2,
}

/// If component `i0` goes under at this crossing, says how.
///
/// The stored sign is compared against the current handedness of the
/// crossing. If they agree, strand `i` goes under; if they disagree, strand
/// `j` does. A flat sign means neither.
pub fn underpass(
    paths: &[Curve],
    cp: &CrossingPoint,
    i0: usize,
) -> Result<Option<Underpass>, Error> {
    let orientation = cp.sign.as_i32() * geometric_sign(paths, cp)?.as_i32();
    let (under, t_under, over, t_over) = if orientation > 0 && cp.i == i0 {
        (cp.i, cp.ti, cp.j, cp.tj)
    } else if orientation < 0 && cp.j == i0 {
        (cp.j, cp.tj, cp.i, cp.ti)
    } else {
        return Ok(None);
    };
    let (over_pt, over_dir) = component(paths, over)?.point_and_deriv(t_over);
    Ok(Some(Underpass {
        under,
        over,
        t_under,
        over_pt,
        over_dir,
    }))
}

/// The parts of component `i0` that remain visible.
///
/// `widths` holds the stroke width of each component.
pub fn visible_domain(
    paths: &[Curve],
    widths: &[f64],
    crossings: &CrossingPoints,
    i0: usize,
    config: &KnotConfig,
) -> Result<Vec<Interval>, Error> {
    let curve = paths
        .get(i0)
        .ok_or(Error::UnknownComponent { component: i0 })?;
    if curve.is_empty() {
        return Ok(Vec::new());
    }
    let period = curve.size() as f64;
    let mut domain = vec![curve.domain()];

    for cp in crossings.touching(i0) {
        let Some(up) = underpass(paths, cp, i0)? else {
            continue;
        };
        let own = widths.get(up.under).copied().unwrap_or(0.0);
        let other = widths.get(up.over).copied().unwrap_or(0.0);
        let half_width = config.half_width(own, other);
        let hidden = find_shadowed_time(curve, up.over_pt, up.over_dir, up.t_under, half_width);
        tracing::trace!(
            under = up.under,
            over = up.over,
            t = up.t_under,
            ?hidden,
            "hiding part of an under-strand"
        );
        domain = subtract_periodic(hidden, &domain, period);
    }
    Ok(domain)
}

/// Appends the visible arcs of `curve` to `out`.
///
/// For a closed curve whose domain still contains both its start and its
/// end, the arcs on either side of the start are really one arc, and they are
/// emitted as a single subpath. If nothing was removed at all the curve is
/// emitted whole, and closed curves stay closed.
pub fn append_visible_arcs(curve: &Curve, domain: &[Interval], out: &mut BezPath) {
    let (Some(first), Some(last)) = (domain.first(), domain.last()) else {
        return;
    };
    let period = curve.size() as f64;

    if domain.len() == 1 && *first == curve.domain() {
        curve.append_to(out);
        return;
    }

    let mut pieces = domain;
    if curve.is_closed() && first.min() == 0.0 && last.max() == period {
        let mut joined = curve.portion(*last);
        stitch(&mut joined, &curve.portion(*first));
        out.extend(joined);
        pieces = &domain[1..domain.len() - 1];
    }

    for piece in pieces {
        out.extend(curve.portion(*piece));
    }
}

// Appends `tail` to the end of `head`, bridging any gap with a straight line.
fn stitch(head: &mut BezPath, tail: &BezPath) {
    let mut els = tail.elements().iter();
    if let Some(&PathEl::MoveTo(p)) = els.next() {
        let end = head.elements().last().and_then(PathEl::end_point);
        if end != Some(p) {
            head.line_to(p);
        }
    }
    for el in els {
        head.push(*el);
    }
}

/// Carves every component in `paths`, returning all the visible arcs.
pub fn carve(
    paths: &[Curve],
    widths: &[f64],
    crossings: &CrossingPoints,
    config: &KnotConfig,
) -> Result<BezPath, Error> {
    let mut out = BezPath::new();
    for (i0, curve) in paths.iter().enumerate() {
        let domain = visible_domain(paths, widths, crossings, i0, config)?;
        append_visible_arcs(curve, &domain, &mut out);
    }
    Ok(out)
}
