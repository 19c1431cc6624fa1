//! Ordering helpers for floats.

/// A wrapper for `f64` that implements `Ord`.
///
/// Unlike the more principled wrappers in the `ordered_float` crate, this
/// one just panics when comparing NaNs -- it doesn't order them, nor does
/// it guard against them on construction. Every float we sort has already
/// been checked for NaN, so the cheap version is enough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheapOrderedFloat(f64);

impl CheapOrderedFloat {
    /// Retrieve the inner `f64`.
    pub fn into_inner(self) -> f64 {
        self.0
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(x: f64) -> Self {
        CheapOrderedFloat(x)
    }
}

// Now comes the fishy stuff.
impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 < other.0 {
            std::cmp::Ordering::Less
        } else if self.0 > other.0 {
            std::cmp::Ordering::Greater
        } else if self.0 == other.0 {
            std::cmp::Ordering::Equal
        } else {
            panic!("tried to compare NaN: {self:?} vs {other:?}");
        }
    }
}
