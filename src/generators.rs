//! Utilities for generating examples, benchmarks, and test cases.

use kurbo::{CubicBez, PathSeg, Point};

use crate::curve::Curve;

/// Two straight strands crossing at the origin, each of length `2 * size`.
pub fn crossing_lines(size: f64) -> Vec<Curve> {
    vec![
        Curve::polyline([(-size, 0.0), (size, 0.0)]),
        Curve::polyline([(0.0, -size), (0.0, size)]),
    ]
}

/// A closed "bow-tie" polygon that crosses itself once, at `(size / 2, size / 2)`.
pub fn figure_eight(size: f64) -> Curve {
    Curve::polygon([(0.0, 0.0), (size, size), (size, 0.0), (0.0, size)])
}

/// A single cubic segment with a loop in it.
pub fn cubic_loop() -> Curve {
    Curve::new(
        vec![PathSeg::Cubic(CubicBez::new(
            (0.0, 0.0),
            (150.0, 100.0),
            (-50.0, 100.0),
            (100.0, 0.0),
        ))],
        false,
    )
}

/// The star polygon `{n/k}`: `n` points on a circle, joined to every `k`th
/// point.
///
/// If `n` and `k` are coprime, this is a single closed curve with `n * (k - 1)`
/// self-crossings.
pub fn star(n: usize, k: usize, radius: f64) -> Curve {
    let step = std::f64::consts::TAU * k as f64 / n as f64;
    Curve::polygon((0..n).map(|i| {
        let theta = std::f64::consts::FRAC_PI_2 + i as f64 * step;
        (radius * theta.cos(), radius * theta.sin())
    }))
}

/// A closed curve made of `petals` loops around the origin, built from cubics.
///
/// Consecutive petals overlap, so every petal crosses its two neighbors.
pub fn rosette(petals: usize, radius: f64) -> Curve {
    let step = std::f64::consts::TAU / petals as f64;
    let dir = |theta: f64| Point::new(theta.cos(), theta.sin());
    let segs = (0..petals)
        .map(|i| {
            let a = i as f64 * step;
            let b = a + step;
            let p0 = (0.25 * radius * dir(a).to_vec2()).to_point();
            let p3 = (0.25 * radius * dir(b).to_vec2()).to_point();
            let p1 = (1.4 * radius * dir(a + 1.5 * step).to_vec2()).to_point();
            let p2 = (1.4 * radius * dir(b - 1.5 * step).to_vec2()).to_point();
            PathSeg::Cubic(CubicBez::new(p0, p1, p2, p3))
        })
        .collect();
    Curve::new(segs, true)
}

/// A square grid of `n` horizontal and `n` vertical strands.
///
/// Every horizontal strand crosses every vertical strand, so there are `n * n`
/// crossings, none of them at a vertex. With a non-zero `amplitude` the
/// strands wiggle, one cubic per grid cell.
pub fn woven_grid(n: usize, spacing: f64, amplitude: f64) -> Vec<Curve> {
    let strand = |offset: f64, horizontal: bool| {
        let pt = |along: f64, across: f64| {
            if horizontal {
                Point::new(along, across)
            } else {
                Point::new(across, along)
            }
        };
        let segs = (0..n)
            .map(|cell| {
                let a = cell as f64 * spacing;
                let b = a + spacing;
                let sign = if cell % 2 == 0 { 1.0 } else { -1.0 };
                let wiggle = sign * amplitude;
                PathSeg::Cubic(CubicBez::new(
                    pt(a, offset),
                    pt(a + spacing / 3.0, offset + wiggle),
                    pt(b - spacing / 3.0, offset - wiggle),
                    pt(b, offset),
                ))
            })
            .collect();
        Curve::new(segs, false)
    };

    let mut ret = Vec::with_capacity(2 * n);
    for i in 0..n {
        let offset = (i as f64 + 0.5) * spacing;
        ret.push(strand(offset, true));
    }
    for i in 0..n {
        let offset = (i as f64 + 0.5) * spacing;
        ret.push(strand(offset, false));
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossing::CrossingPoints;

    #[test]
    fn star_crossings() {
        assert_eq!(CrossingPoints::build(&[star(5, 2, 50.0)]).len(), 5);
        assert_eq!(CrossingPoints::build(&[star(7, 3, 50.0)]).len(), 14);
        assert!(CrossingPoints::build(&[star(6, 1, 50.0)]).is_empty());
    }

    #[test]
    fn grid_crossings() {
        for amplitude in [0.0, 2.0] {
            let grid = woven_grid(3, 10.0, amplitude);
            let cps = CrossingPoints::build(&grid);
            cps.check_invariants();
            assert_eq!(cps.len(), 9);
            assert!(cps.iter().all(|(_, cp)| cp.i < 3 && cp.j >= 3));
        }
    }

    #[test]
    fn loops_and_rosettes() {
        let cps = CrossingPoints::build(&[cubic_loop()]);
        assert_eq!(cps.len(), 1);
        assert_eq!(cps.keys(), vec![(0, 0, 0, 1)]);

        let cps = CrossingPoints::build(&crossing_lines(5.0));
        assert_eq!(cps.len(), 1);

        let cps = CrossingPoints::build(&[rosette(6, 40.0)]);
        cps.check_invariants();
        assert!(!cps.is_empty());
    }
}
