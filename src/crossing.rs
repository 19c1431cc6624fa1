//! Crossing points between curves, and their identities.
//!
//! Every time the geometry changes, the whole set of crossings is found again
//! from scratch. What survives from one computation to the next is the sign of
//! each crossing (which strand goes over), and for that to work each crossing
//! needs an identity that doesn't depend on floating-point positions. We use
//! the pair of components that meet, together with the "occurrence rank" of
//! the crossing along each of them: the crossing `(i, j, ni, nj)` is the
//! `ni`th crossing along component `i` (counting from its start) and the `nj`th
//! crossing along component `j`.

use std::collections::BTreeMap;

use kurbo::{ParamCurve as _, Point};

use crate::{
    curve::{is_point, Curve},
    intersect::{segment_intersections, self_intersections},
    num::CheapOrderedFloat,
};

/// How many `f64`s each crossing takes up in the flattened representation.
pub const FLAT_LEN: usize = 9;

// Intersections closer than this (in curve time) to a point shared by two
// consecutive segments are just that shared point.
const ZERO: f64 = 1e-4;

/// Which of the two strands is on top at a crossing.
///
/// The sign doesn't directly say "strand `i` is over". It's compared against
/// the orientation of the two strands' tangents, so that flipping the order in
/// which the strands were recorded doesn't flip the picture.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Sign {
    /// `-1`
    Negative,
    /// `0`: neither strand is hidden.
    #[default]
    Flat,
    /// `+1`
    Positive,
}

impl Sign {
    /// The sign of an integer.
    pub fn from_i32(x: i32) -> Sign {
        match x.signum() {
            -1 => Sign::Negative,
            0 => Sign::Flat,
            _ => Sign::Positive,
        }
    }

    /// Reads a persisted sign.
    ///
    /// The value is truncated towards zero first, the same as converting it
    /// to an integer would do.
    pub fn from_f64(x: f64) -> Sign {
        if x.is_nan() {
            Sign::Flat
        } else {
            Sign::from_i32(x.trunc().clamp(-1.0, 1.0) as i32)
        }
    }

    /// `-1`, `0` or `1`.
    pub fn as_i32(self) -> i32 {
        match self {
            Sign::Negative => -1,
            Sign::Flat => 0,
            Sign::Positive => 1,
        }
    }

    /// `-1.0`, `0.0` or `1.0`.
    pub fn to_f64(self) -> f64 {
        f64::from(self.as_i32())
    }

    /// The next sign in the cycle `+1 → -1 → 0 → +1`.
    ///
    /// This is `((s + 2) mod 3) - 1`.
    pub fn cycle(self) -> Sign {
        Sign::from_i32((self.as_i32() + 2).rem_euclid(3) - 1)
    }
}

/// An index into a [`CrossingPoints`].
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct CrossingIdx(pub usize);

impl std::fmt::Debug for CrossingIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c_{}", self.0)
    }
}

/// A place where two components (or one component and itself) cross.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CrossingPoint {
    /// Where the crossing is. This is only used for matching crossings up
    /// after the topology changes.
    pub pt: Point,
    /// Which strand goes over.
    pub sign: Sign,
    /// The first component. We always have `i <= j`.
    pub i: usize,
    /// The second component; equal to `i` for self-crossings.
    pub j: usize,
    /// The rank of this crossing along component `i`.
    pub ni: usize,
    /// The rank of this crossing along component `j`.
    pub nj: usize,
    /// The curve time of this crossing on component `i`.
    pub ti: f64,
    /// The curve time of this crossing on component `j`.
    pub tj: f64,
}

impl CrossingPoint {
    /// Does this crossing involve the given component?
    pub fn touches(&self, component: usize) -> bool {
        self.i == component || self.j == component
    }

    /// Is this crossing the `rank`th one along `component`?
    pub fn is_occurrence(&self, component: usize, rank: usize) -> bool {
        (self.i == component && self.ni == rank) || (self.j == component && self.nj == rank)
    }

    /// The topological identity of this crossing.
    pub fn key(&self) -> (usize, usize, usize, usize) {
        (self.i, self.j, self.ni, self.nj)
    }

    fn write_flat(&self, out: &mut Vec<f64>) {
        out.extend_from_slice(&[
            self.pt.x,
            self.pt.y,
            self.i as f64,
            self.j as f64,
            self.ni as f64,
            self.nj as f64,
            self.ti,
            self.tj,
            self.sign.to_f64(),
        ]);
    }

    fn read_flat(chunk: &[f64]) -> Self {
        debug_assert_eq!(chunk.len(), FLAT_LEN);
        CrossingPoint {
            pt: Point::new(chunk[0], chunk[1]),
            i: chunk[2] as usize,
            j: chunk[3] as usize,
            ni: chunk[4] as usize,
            nj: chunk[5] as usize,
            ti: chunk[6],
            tj: chunk[7],
            sign: Sign::from_f64(chunk[8]),
        }
    }
}

/// All the crossings in a collection of curves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrossingPoints {
    points: Vec<CrossingPoint>,
}

// One unordered pair of segments to check for intersections.
//
// Components satisfy `i <= j`. When `i == j` we also have `ii <= jj`, and
// `ii == jj` means looking for self-intersections of a single segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SegPair {
    i: usize,
    ii: usize,
    j: usize,
    jj: usize,
}

// Every pair of segments that needs checking, in the order (i, ii, j, jj).
// That order is the order in which crossings get recorded.
fn segment_pairs(paths: &[Curve]) -> impl Iterator<Item = SegPair> + '_ {
    (0..paths.len()).flat_map(move |i| {
        (0..paths[i].size()).flat_map(move |ii| {
            (i..paths.len()).flat_map(move |j| {
                let jj_start = if i == j { ii } else { 0 };
                (jj_start..paths[j].size()).map(move |jj| SegPair { i, ii, j, jj })
            })
        })
    })
}

// Are two curve times on the same curve the same place? For closed curves the
// start and end coincide.
fn same_time(curve: &Curve, a: f64, b: f64) -> bool {
    let d = (a - b).abs();
    let d = if curve.is_closed() {
        d.min((curve.size() as f64 - d).abs())
    } else {
        d
    };
    d <= ZERO
}

// Is the stretch of curve between times `a` and `b` a single place? It is if
// it's very short, or if everything longer in it is a zero-length segment.
fn collapsed(curve: &Curve, a: f64, b: f64) -> bool {
    let (lo, hi) = (a.min(b), a.max(b));
    if hi - lo <= ZERO {
        return true;
    }
    let first = lo.floor() as usize;
    let last = (hi.ceil() as usize).min(curve.size());
    (first..last).all(|k| {
        let covered = hi.min((k + 1) as f64) - lo.max(k as f64);
        covered <= ZERO || is_point(curve.segment(k))
    })
}

fn same_place(curve: &Curve, a: f64, b: f64) -> bool {
    same_time(curve, a, b) || collapsed(curve, a, b)
}

impl CrossingPoints {
    /// Finds all the crossings between (and within) the given curves.
    ///
    /// Signs all start out [`Sign::Flat`]; use [`CrossingPoints::inherit_signs`]
    /// to carry them over from a previous computation.
    pub fn build(paths: &[Curve]) -> CrossingPoints {
        let mut points: Vec<CrossingPoint> = Vec::new();

        for SegPair { i, ii, j, jj } in segment_pairs(paths) {
            let seg_i = paths[i].segment(ii);
            let seg_j = paths[j].segment(jj);
            let times: Vec<(f64, f64)> = if i == j && ii == jj {
                self_intersections(seg_i).into_iter().collect()
            } else {
                segment_intersections(seg_i, seg_j)
            };

            for (s, t) in times {
                if s.is_nan() || t.is_nan() {
                    tracing::warn!(i, ii, j, jj, "intersection search returned NaN");
                    continue;
                }
                let ti = s + ii as f64;
                let tj = t + jj as f64;
                if i == j && collapsed(&paths[i], ti, tj) {
                    // The end of one segment is the start of the next, maybe
                    // with some zero-length segments in between.
                    continue;
                }
                if i == j
                    && ii == 0
                    && jj + 1 == paths[i].size()
                    && paths[i].is_closed()
                    && s.abs() <= ZERO
                    && (t - 1.0).abs() <= ZERO
                {
                    // The end of a closed path is its start.
                    continue;
                }
                // A crossing exactly at a vertex is found once for each of
                // the segments meeting there, including zero-length ones.
                let duplicate = points.iter().any(|cp| {
                    cp.i == i
                        && cp.j == j
                        && same_place(&paths[i], cp.ti, ti)
                        && same_place(&paths[j], cp.tj, tj)
                });
                if duplicate {
                    continue;
                }

                points.push(CrossingPoint {
                    pt: seg_i.eval(s),
                    sign: Sign::Flat,
                    i,
                    j,
                    ni: 0,
                    nj: 0,
                    ti,
                    tj,
                });
            }
        }

        let mut ret = CrossingPoints { points };
        ret.assign_ranks(paths.len());
        tracing::debug!(
            components = paths.len(),
            crossings = ret.len(),
            "found crossings"
        );

        #[cfg(feature = "slow-asserts")]
        ret.check_invariants();

        ret
    }

    // Numbers the crossings along each component in order of increasing time.
    // Crossings at exactly the same time share a map key, and only the one
    // recorded last gets numbered.
    fn assign_ranks(&mut self, components: usize) {
        for c in 0..components {
            let mut cuts: BTreeMap<CheapOrderedFloat, usize> = BTreeMap::new();
            for (k, cp) in self.points.iter().enumerate() {
                if cp.i == c {
                    cuts.insert(cp.ti.into(), k);
                }
                if cp.j == c {
                    cuts.insert(cp.tj.into(), k);
                }
            }
            for (count, (t, k)) in cuts.into_iter().enumerate() {
                let cp = &mut self.points[k];
                if cp.i == c && cp.ti == t.into_inner() {
                    cp.ni = count;
                } else {
                    cp.nj = count;
                }
            }
        }
    }

    /// Reads crossings back from their flattened representation.
    ///
    /// If the length of `input` isn't a multiple of [`FLAT_LEN`], the data is
    /// ignored and the result is empty.
    pub fn from_flat(input: &[f64]) -> CrossingPoints {
        if input.len() % FLAT_LEN != 0 {
            tracing::warn!(
                len = input.len(),
                "ignoring crossing data with a bad length"
            );
            return CrossingPoints::default();
        }
        CrossingPoints {
            points: input
                .chunks_exact(FLAT_LEN)
                .map(CrossingPoint::read_flat)
                .collect(),
        }
    }

    /// Flattens the crossings into a list of numbers, [`FLAT_LEN`] per crossing.
    ///
    /// The fields are written in the order `pt.x, pt.y, i, j, ni, nj, ti, tj, sign`.
    pub fn to_flat(&self) -> Vec<f64> {
        let mut ret = Vec::with_capacity(self.points.len() * FLAT_LEN);
        for cp in &self.points {
            cp.write_flat(&mut ret);
        }
        ret
    }

    /// The number of crossings.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Are there no crossings at all?
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over all crossings, in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = (CrossingIdx, &CrossingPoint)> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, cp)| (CrossingIdx(idx), cp))
    }

    /// Iterates over the crossings involving a component.
    pub fn touching(&self, component: usize) -> impl Iterator<Item = &CrossingPoint> + '_ {
        self.points.iter().filter(move |cp| cp.touches(component))
    }

    /// The topological identities of all crossings, in order.
    pub fn keys(&self) -> Vec<(usize, usize, usize, usize)> {
        self.points.iter().map(CrossingPoint::key).collect()
    }

    /// Finds the `rank`th crossing along `component`.
    pub fn find(&self, component: usize, rank: usize) -> Option<&CrossingPoint> {
        self.points
            .iter()
            .find(|cp| cp.is_occurrence(component, rank))
    }

    /// Finds the `rank`th crossing along `component`, or a default crossing if
    /// there isn't one.
    ///
    /// A miss means that whoever asked is out of sync with the geometry, so
    /// it gets logged.
    pub fn get(&self, component: usize, rank: usize) -> CrossingPoint {
        match self.find(component, rank) {
            Some(cp) => *cp,
            None => {
                tracing::warn!(component, rank, "crossing not found");
                CrossingPoint::default()
            }
        }
    }

    /// The sign of the `rank`th crossing along `component`.
    pub fn sign_of(&self, component: usize, rank: usize) -> Option<Sign> {
        self.find(component, rank).map(|cp| cp.sign)
    }

    /// Changes the sign of the `rank`th crossing along `component`.
    ///
    /// Returns false if there is no such crossing.
    pub fn set_sign(&mut self, component: usize, rank: usize, sign: Sign) -> bool {
        match self
            .points
            .iter_mut()
            .find(|cp| cp.is_occurrence(component, rank))
        {
            Some(cp) => {
                cp.sign = sign;
                true
            }
            None => false,
        }
    }

    /// Changes the sign of the crossing at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn set_sign_at(&mut self, idx: CrossingIdx, sign: Sign) {
        self.points[idx.0].sign = sign;
    }

    /// The crossing closest to `p`, if there are any crossings.
    ///
    /// Ties go to the crossing that was found first.
    pub fn nearest(&self, p: Point) -> Option<CrossingIdx> {
        let mut best: Option<(CrossingIdx, f64)> = None;
        for (idx, cp) in self.iter() {
            let dist = cp.pt.distance(p);
            if best.is_none_or(|(_, d)| d > dist) {
                best = Some((idx, dist));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Copies signs over from an older computation.
    ///
    /// If every crossing has the same identity as the crossing at the same
    /// position in `old`, the signs are copied one-to-one. Otherwise the
    /// topology has changed, and each crossing takes the sign of the nearest
    /// old crossing, or `default` if `old` is empty.
    ///
    /// Returns true if the topology changed.
    pub fn inherit_signs(&mut self, old: &CrossingPoints, default: Sign) -> bool {
        self.inherit_signs_within(old, default, None)
    }

    /// Like [`CrossingPoints::inherit_signs`], but when matching by position
    /// an old crossing further away than `max_distance` is ignored and the
    /// crossing gets `default` instead.
    pub fn inherit_signs_within(
        &mut self,
        old: &CrossingPoints,
        default: Sign,
        max_distance: Option<f64>,
    ) -> bool {
        let topology_changed = self
            .points
            .iter()
            .enumerate()
            .any(|(n, cp)| old.points.get(n).is_none_or(|o| o.key() != cp.key()));

        if !topology_changed {
            for (cp, o) in self.points.iter_mut().zip(&old.points) {
                cp.sign = o.sign;
            }
            return false;
        }

        tracing::debug!(
            old = old.len(),
            new = self.len(),
            "crossing topology changed; matching signs by position"
        );
        for cp in &mut self.points {
            cp.sign = old
                .nearest(cp.pt)
                .map(|idx| &old.points[idx.0])
                .filter(|o| max_distance.is_none_or(|max| o.pt.distance(cp.pt) <= max))
                .map_or(default, |o| o.sign);
        }
        true
    }

    /// Checks that the occurrence ranks along each component are exactly
    /// `0, 1, ..., k - 1`.
    ///
    /// # Panics
    ///
    /// Panics if they aren't.
    pub fn check_invariants(&self) {
        let mut ranks: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for cp in &self.points {
            assert!(cp.i <= cp.j, "components out of order: {cp:?}");
            ranks.entry(cp.i).or_default().push(cp.ni);
            ranks.entry(cp.j).or_default().push(cp.nj);
        }
        for (component, mut rs) in ranks {
            rs.sort_unstable();
            let expected: Vec<usize> = (0..rs.len()).collect();
            assert_eq!(rs, expected, "bad ranks on component {component}");
        }
    }
}

impl std::ops::Index<CrossingIdx> for CrossingPoints {
    type Output = CrossingPoint;

    fn index(&self, index: CrossingIdx) -> &Self::Output {
        &self.points[index.0]
    }
}
