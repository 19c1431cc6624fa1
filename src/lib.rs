#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
pub mod carve;
pub mod config;
pub mod crossing;
pub mod curve;
pub mod effect;
pub mod intersect;
pub mod interval;
mod num;
pub mod shadow;

#[cfg(any(test, feature = "generators"))]
pub mod generators;

pub use config::KnotConfig;
pub use crossing::{CrossingIdx, CrossingPoint, CrossingPoints, Sign};
pub use curve::Curve;
pub use effect::{CanvasHandle, ClickModifier, CrossingSwitcher, KnotEffect};
pub use interval::Interval;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Something went wrong while running the knot effect.
pub enum Error {
    /// At least one of the inputs was infinite.
    Infinity,
    /// At least one of the inputs was not a number.
    NaN,
    /// The number of stroke widths didn't match the number of curves.
    WidthMismatch {
        /// How many curves there were.
        paths: usize,
        /// How many stroke widths there were.
        widths: usize,
    },
    /// A curve component couldn't be found among the curves the crossings
    /// were computed from.
    ///
    /// This means that the crossing data is out of sync with the geometry.
    UnknownComponent {
        /// The index of the missing component.
        component: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Infinity => write!(f, "one of the inputs was infinite"),
            Error::NaN => write!(f, "one of the inputs had a NaN"),
            Error::WidthMismatch { paths, widths } => {
                write!(f, "got {widths} stroke widths for {paths} curves")
            }
            Error::UnknownComponent { component } => {
                write!(f, "curve component {component} was not recognized")
            }
        }
    }
}

impl std::error::Error for Error {}
