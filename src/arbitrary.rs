//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;
use kurbo::{CubicBez, Line, PathSeg, Point, QuadBez};

use crate::{crossing::Sign, curve::Curve};

// Coordinates stay in a range where the intersection tolerances are
// meaningful.
const COORD_RANGE: f64 = 1e3;

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

fn float(u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    float_in_range(-COORD_RANGE, COORD_RANGE, u)
}

/// Generate a float, but give it a chance to be close to another float.
fn another_float(orig: f64, u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    let close: bool = u.arbitrary()?;
    if close {
        let ulps: i32 = u.int_in_range(-32..=32)?;
        let scale = 1.0f64 + ulps as f64 * f64::EPSILON;
        Ok((orig * scale).clamp(-COORD_RANGE, COORD_RANGE))
    } else {
        float(u)
    }
}

/// Generate an arbitrary point.
pub fn point(u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(float(u)?, float(u)?))
}

// A point that has a chance of being almost the same as `orig`.
fn another_point(orig: Point, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(another_float(orig.x, u)?, another_float(orig.y, u)?))
}

/// Generate an arbitrary segment starting at `p0`.
pub fn segment_from(p0: Point, u: &mut Unstructured<'_>) -> Result<PathSeg, arbitrary::Error> {
    Ok(match u.int_in_range(0..=2)? {
        0 => PathSeg::Line(Line::new(p0, another_point(p0, u)?)),
        1 => PathSeg::Quad(QuadBez::new(p0, point(u)?, point(u)?)),
        _ => PathSeg::Cubic(CubicBez::new(
            p0,
            another_point(p0, u)?,
            point(u)?,
            point(u)?,
        )),
    })
}

/// Generate an arbitrary curve with between one and four segments.
pub fn curve(u: &mut Unstructured<'_>) -> Result<Curve, arbitrary::Error> {
    let len = u.int_in_range(1..=4)?;
    let mut p = point(u)?;
    let mut segs = Vec::with_capacity(len);
    for _ in 0..len {
        let seg = segment_from(p, u)?;
        p = kurbo::ParamCurve::end(&seg);
        segs.push(seg);
    }
    Ok(Curve::new(segs, u.arbitrary()?))
}

/// Generate between one and three arbitrary curves.
pub fn curves(u: &mut Unstructured<'_>) -> Result<Vec<Curve>, arbitrary::Error> {
    let len = u.int_in_range(1..=3)?;
    (0..len).map(|_| curve(u)).collect()
}

/// Generate an arbitrary sign.
pub fn sign(u: &mut Unstructured<'_>) -> Result<Sign, arbitrary::Error> {
    Ok(Sign::from_i32(u.int_in_range(-1..=1)?))
}

/// Generate a stroke width, possibly zero.
pub fn width(u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    float_in_range(0.0, 20.0, u)
}
