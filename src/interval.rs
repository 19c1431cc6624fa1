//! Closed intervals of curve time, and removing them from a domain.
//!
//! A curve's domain starts out as the single interval `[0, size]`. Every
//! crossing where the curve passes underneath another one removes a piece of
//! it, so in general the domain is a sorted list of disjoint intervals. For
//! closed curves the domain is periodic, and a hidden piece may wrap around
//! the parametrization origin.

/// A closed interval `[min, max]` of the real line.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    min: f64,
    max: f64,
}

impl Interval {
    /// Creates the interval spanned by two endpoints, in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Interval { min: a, max: b }
        } else {
            Interval { min: b, max: a }
        }
    }

    /// The smaller endpoint.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// The larger endpoint.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// `max - min`.
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    /// The midpoint.
    pub fn middle(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    /// Does this interval consist of a single point?
    pub fn is_singular(&self) -> bool {
        self.min == self.max
    }

    /// Is `t` inside this (closed) interval?
    pub fn contains(&self, t: f64) -> bool {
        self.min <= t && t <= self.max
    }

    /// Translates both endpoints by `delta`.
    pub fn shifted(&self, delta: f64) -> Self {
        Interval {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// The intersection of two intervals, if they meet.
    ///
    /// Intervals that just touch have a singular intersection.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(Interval { min, max })
    }

    /// Converts to a range, for use with `kurbo`'s `subsegment`-style APIs.
    pub fn to_range(&self) -> std::ops::Range<f64> {
        self.min..self.max
    }
}

/// Removes `hidden` from a sorted list of disjoint intervals.
///
/// The result is again sorted and disjoint. Pieces that shrink to a single
/// point are dropped, so removing the whole domain leaves nothing at all.
/// Removing a singular interval leaves the domain untouched.
pub fn complement_of(hidden: Interval, domain: &[Interval]) -> Vec<Interval> {
    let (Some(first), Some(last)) = (domain.first(), domain.last()) else {
        return Vec::new();
    };
    if hidden.is_singular() {
        return domain.to_vec();
    }

    let before = Interval::new(first.min, hidden.min);
    let after = Interval::new(hidden.max, last.max);

    let mut ret = Vec::with_capacity(domain.len() + 1);
    // If `hidden` sticks out of the domain on one side, `before` or `after`
    // flips around and meets the domain in at most one point, which gets
    // dropped along with the other singular pieces.
    for piece in domain {
        for side in [&before, &after] {
            if let Some(i) = piece.intersect(side).filter(|i| !i.is_singular()) {
                ret.push(i);
            }
        }
    }
    ret
}

/// Removes `hidden` from the domain of a curve with the given period.
///
/// `hidden` may stick out past either end of `[0, period]`, as happens for
/// the shadow of a crossing close to the parametrization origin of a closed
/// curve. In that case it is split into the piece touching `0` and the piece
/// touching `period`, and both are removed.
pub fn subtract_periodic(hidden: Interval, domain: &[Interval], period: f64) -> Vec<Interval> {
    let hidden = if hidden.max > period {
        hidden.shifted(-period)
    } else {
        hidden
    };

    if hidden.min < 0.0 {
        let domain = complement_of(Interval::new(0.0, hidden.max), domain);
        complement_of(Interval::new(hidden.min + period, period), &domain)
    } else {
        complement_of(hidden, domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full(period: f64) -> Vec<Interval> {
        vec![Interval::new(0.0, period)]
    }

    #[test]
    fn new_sorts_endpoints() {
        let i = Interval::new(3.0, 1.0);
        assert_eq!((i.min(), i.max()), (1.0, 3.0));
        assert_eq!(i.extent(), 2.0);
        assert_eq!(i.middle(), 2.0);
    }

    #[test]
    fn touching_intervals_meet_in_a_point() {
        let a = Interval::new(0.0, 1.0);
        let b = Interval::new(1.0, 2.0);
        let c = Interval::new(1.5, 2.0);
        assert!(a.intersect(&b).unwrap().is_singular());
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn remove_middle() {
        let dom = complement_of(Interval::new(1.0, 2.0), &full(4.0));
        assert_eq!(dom, vec![Interval::new(0.0, 1.0), Interval::new(2.0, 4.0)]);

        let dom = complement_of(Interval::new(2.5, 3.0), &dom);
        assert_eq!(
            dom,
            vec![
                Interval::new(0.0, 1.0),
                Interval::new(2.0, 2.5),
                Interval::new(3.0, 4.0)
            ]
        );
    }

    #[test]
    fn remove_overlapping_two_pieces() {
        let dom = vec![Interval::new(0.0, 1.0), Interval::new(2.0, 4.0)];
        let dom = complement_of(Interval::new(0.5, 3.0), &dom);
        assert_eq!(dom, vec![Interval::new(0.0, 0.5), Interval::new(3.0, 4.0)]);
    }

    #[test]
    fn remove_at_ends() {
        let dom = complement_of(Interval::new(0.0, 1.0), &full(4.0));
        assert_eq!(dom, vec![Interval::new(1.0, 4.0)]);
        let dom = complement_of(Interval::new(3.0, 4.0), &dom);
        assert_eq!(dom, vec![Interval::new(1.0, 3.0)]);
    }

    #[test]
    fn hidden_sticking_out_of_an_open_domain() {
        let dom = complement_of(Interval::new(-1.0, 1.0), &full(4.0));
        assert_eq!(dom, vec![Interval::new(1.0, 4.0)]);
        let dom = complement_of(Interval::new(3.0, 5.0), &full(4.0));
        assert_eq!(dom, vec![Interval::new(0.0, 3.0)]);
    }

    #[test]
    fn empty_domain_stays_empty() {
        assert!(complement_of(Interval::new(0.0, 1.0), &[]).is_empty());
    }

    #[test]
    fn periodic_wrap_below_zero() {
        let dom = subtract_periodic(Interval::new(-0.5, 0.25), &full(3.0), 3.0);
        assert_eq!(dom, vec![Interval::new(0.25, 2.5)]);
    }

    #[test]
    fn periodic_wrap_past_period() {
        let dom = subtract_periodic(Interval::new(2.5, 3.25), &full(3.0), 3.0);
        assert_eq!(dom, vec![Interval::new(0.25, 2.5)]);
    }

    #[test]
    fn periodic_without_wrap() {
        let dom = subtract_periodic(Interval::new(1.0, 2.0), &full(3.0), 3.0);
        assert_eq!(dom, vec![Interval::new(0.0, 1.0), Interval::new(2.0, 3.0)]);
    }

    proptest! {
        #[test]
        fn removing_a_point_changes_nothing(period in 0.5f64..100.0, frac in 0.0f64..1.0) {
            let t = frac * period;
            let dom = full(period);
            prop_assert_eq!(complement_of(Interval::new(t, t), &dom), dom);
        }

        #[test]
        fn removing_everything_leaves_nothing(period in 0.5f64..100.0, slack in 0.0f64..2.0) {
            let hidden = Interval::new(-slack, period + slack);
            prop_assert!(complement_of(hidden, &full(period)).is_empty());
        }

        #[test]
        fn result_is_sorted_disjoint_and_avoids_hidden(
            period in 1.0f64..50.0,
            cuts in prop::collection::vec((0.0f64..1.0, 0.0f64..0.2), 0..8),
        ) {
            let mut dom = full(period);
            let mut removed = Vec::new();
            for (start, len) in cuts {
                let hidden = Interval::new(start * period, (start + len) * period);
                removed.push(hidden);
                dom = subtract_periodic(hidden, &dom, period);
            }
            for pair in dom.windows(2) {
                prop_assert!(pair[0].max() <= pair[1].min());
            }
            for piece in &dom {
                prop_assert!(!piece.is_singular());
                prop_assert!(piece.min() >= 0.0 && piece.max() <= period);
                let mid = piece.middle();
                for hidden in &removed {
                    let wrapped = hidden.shifted(-period);
                    prop_assert!(!(hidden.min() < mid && mid < hidden.max()));
                    prop_assert!(!(wrapped.min() < mid && mid < wrapped.max()));
                }
            }
        }
    }
}
