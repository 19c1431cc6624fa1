//! User-facing settings of the knot effect.

use crate::crossing::Sign;

/// Settings controlling how wide the gaps at crossings are, and how signs are
/// carried over when the geometry changes.
///
/// Missing fields take their default values when deserializing, so a stored
/// configuration from an older version still loads.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct KnotConfig {
    /// The base size of the gap left in the under-strand.
    pub interruption_width: f64,
    /// If true, `interruption_width` is multiplied by the under-strand's
    /// stroke width.
    pub prop_to_stroke_width: bool,
    /// If true, the under-strand's stroke width is added to the gap.
    pub add_stroke_width: bool,
    /// If true, the over-strand's stroke width is added to the gap.
    pub add_other_stroke_width: bool,
    /// The size of the on-canvas crossing switcher.
    pub switcher_size: f64,
    /// The sign given to crossings that can't inherit one.
    pub default_sign: Sign,
    /// When the topology changes, crossings only inherit the sign of an old
    /// crossing at most this far away. `None` means no limit.
    pub max_inherit_distance: Option<f64>,
}

impl Default for KnotConfig {
    fn default() -> Self {
        KnotConfig {
            interruption_width: 3.0,
            prop_to_stroke_width: true,
            add_stroke_width: true,
            add_other_stroke_width: true,
            switcher_size: 15.0,
            default_sign: Sign::Positive,
            max_inherit_distance: None,
        }
    }
}

impl KnotConfig {
    /// Half the width of the gap cut into a strand of width `own` where it
    /// passes under a strand of width `other`.
    pub fn half_width(&self, own: f64, other: f64) -> f64 {
        let mut width = self.interruption_width;
        if self.prop_to_stroke_width {
            width *= own;
        }
        if self.add_stroke_width {
            width += own;
        }
        if self.add_other_stroke_width {
            width += other;
        }
        width / 2.0
    }
}
