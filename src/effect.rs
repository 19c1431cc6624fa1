//! The knot effect as a host application drives it.
//!
//! The host collects the curves (and their stroke widths) that make up the
//! drawing, and hands them to [`KnotEffect::before_effect`] together with the
//! crossing data it stored last time. It stores the returned crossing data
//! again, and then asks [`KnotEffect::do_effect`] for the carved output.
//! In between, the user can pick a crossing on the canvas and click it to
//! change which strand goes over.

use kurbo::{Affine, BezPath, Point};

use crate::{
    carve::{append_visible_arcs, visible_domain},
    config::KnotConfig,
    crossing::{CrossingIdx, CrossingPoints, Sign},
    curve::Curve,
    Error,
};

const POSITIVE_GLYPH: &str = "m -7.07,7.07 c 3.9,3.91 10.24,3.91 14.14,0 3.91,-3.9 3.91,-10.24 0,-14.14 -3.9,-3.91 -10.24,-3.91 -14.14,0 l 2.83,-4.24 0.7,2.12";
const NEGATIVE_GLYPH: &str = "m 7.07,7.07 c -3.9,3.91 -10.24,3.91 -14.14,0 -3.91,-3.9 -3.91,-10.24 0,-14.14 3.9,-3.91 10.24,-3.91 14.14,0 l -2.83,-4.24 -0.7,2.12";
const FLAT_GLYPH: &str = "M 10,0 C 10,5.52 5.52,10 0,10 -5.52,10 -10,5.52 -10,0 c 0,-5.52 4.48,-10 10,-10 5.52,0 10,4.48 10,10 z";

/// Where the switcher goes when there is nothing to switch.
pub const OFF_CANVAS: Point = Point::new(f64::INFINITY, f64::INFINITY);

/// Modifier keys held during a click on the switcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClickModifier {
    /// A plain click cycles the sign.
    #[default]
    None,
    /// A shift-click sets the sign to `+1`.
    Shift,
}

/// The state of one knot effect.
#[derive(Clone, Debug)]
pub struct KnotEffect {
    config: KnotConfig,
    paths: Vec<Curve>,
    widths: Vec<f64>,
    crossings: CrossingPoints,
    selected: usize,
    switcher: Point,
}

impl Default for KnotEffect {
    fn default() -> Self {
        KnotEffect::new(KnotConfig::default())
    }
}

impl KnotEffect {
    /// Creates an effect that hasn't seen any geometry yet.
    pub fn new(config: KnotConfig) -> Self {
        KnotEffect {
            config,
            paths: Vec::new(),
            widths: Vec::new(),
            crossings: CrossingPoints::default(),
            selected: 0,
            switcher: OFF_CANVAS,
        }
    }

    /// The current settings.
    pub fn config(&self) -> &KnotConfig {
        &self.config
    }

    /// Changes the settings. They take effect on the next carve.
    pub fn set_config(&mut self, config: KnotConfig) {
        self.config = config;
    }

    /// The curves collected by the last call to [`KnotEffect::before_effect`].
    pub fn paths(&self) -> &[Curve] {
        &self.paths
    }

    /// The current crossings.
    pub fn crossings(&self) -> &CrossingPoints {
        &self.crossings
    }

    /// The current crossing data in its persisted form.
    pub fn persisted(&self) -> Vec<f64> {
        self.crossings.to_flat()
    }

    /// Takes in new geometry and recomputes the crossings.
    ///
    /// `widths[k]` is the stroke width of `paths[k]`, and `persisted` is the
    /// crossing data from last time (possibly empty). Signs are carried over
    /// from `persisted` where possible.
    ///
    /// Returns the new crossing data, which the host should store.
    pub fn before_effect(
        &mut self,
        paths: Vec<Curve>,
        widths: Vec<f64>,
        persisted: &[f64],
    ) -> Result<Vec<f64>, Error> {
        if paths.len() != widths.len() {
            return Err(Error::WidthMismatch {
                paths: paths.len(),
                widths: widths.len(),
            });
        }
        if paths.iter().any(Curve::is_nan) || widths.iter().any(|w| w.is_nan()) {
            return Err(Error::NaN);
        }
        if !paths.iter().all(Curve::is_finite) || !widths.iter().all(|w| w.is_finite()) {
            return Err(Error::Infinity);
        }

        let old = CrossingPoints::from_flat(persisted);
        let mut crossings = CrossingPoints::build(&paths);
        let changed = crossings.inherit_signs_within(
            &old,
            self.config.default_sign,
            self.config.max_inherit_distance,
        );
        if changed {
            tracing::debug!(
                old = old.len(),
                new = crossings.len(),
                "knot topology changed"
            );
        }

        self.paths = paths;
        self.widths = widths;
        self.crossings = crossings;
        self.update_switcher();
        Ok(self.persisted())
    }

    /// Carves the visible arcs out of `input`.
    ///
    /// Every curve in `input` must be one of the curves given to the last
    /// [`KnotEffect::before_effect`]. If no curves were given, the input is
    /// returned as-is.
    pub fn do_effect(&self, input: &[Curve]) -> Result<BezPath, Error> {
        let mut out = BezPath::new();
        if self.paths.is_empty() {
            for curve in input {
                curve.append_to(&mut out);
            }
            return Ok(out);
        }

        for (comp, curve) in input.iter().enumerate() {
            let Some(i0) = self.paths.iter().position(|p| p == curve) else {
                return Err(Error::UnknownComponent { component: comp });
            };
            let domain =
                visible_domain(&self.paths, &self.widths, &self.crossings, i0, &self.config)?;
            append_visible_arcs(&self.paths[i0], &domain, &mut out);
        }
        Ok(out)
    }

    /// Moves the switcher onto the selected crossing.
    ///
    /// If the selection is stale it goes back to the first crossing, and if
    /// there are no crossings at all the switcher moves to [`OFF_CANVAS`].
    pub fn update_switcher(&mut self) {
        if self.selected >= self.crossings.len() {
            self.selected = 0;
        }
        self.switcher = match self.selected() {
            Some(idx) => self.crossings[idx].pt,
            None => OFF_CANVAS,
        };
    }

    /// Where the switcher is.
    pub fn switcher(&self) -> Point {
        self.switcher
    }

    /// The selected crossing, if there are any crossings.
    pub fn selected(&self) -> Option<CrossingIdx> {
        (self.selected < self.crossings.len()).then_some(CrossingIdx(self.selected))
    }

    /// Selects the crossing closest to `p`.
    pub fn select_nearest(&mut self, p: Point) -> Option<CrossingIdx> {
        let idx = self.crossings.nearest(p);
        if let Some(idx) = idx {
            self.selected = idx.0;
        }
        self.update_switcher();
        idx
    }

    /// Changes the sign of the selected crossing.
    ///
    /// If a crossing was changed, returns the new crossing data for the host
    /// to store.
    pub fn click(&mut self, modifier: ClickModifier) -> Option<Vec<f64>> {
        let idx = self.selected()?;
        let sign = match modifier {
            ClickModifier::Shift => Sign::Positive,
            ClickModifier::None => self.crossings[idx].sign.cycle(),
        };
        tracing::debug!(?idx, ?sign, "switching crossing");
        self.crossings.set_sign_at(idx, sign);
        Some(self.persisted())
    }

    /// A little glyph showing the sign of the selected crossing, drawn around
    /// the switcher.
    ///
    /// The glyph is empty while the switcher is off the canvas.
    pub fn canvas_indicator(&self) -> BezPath {
        if !self.switcher.is_finite() {
            return BezPath::new();
        }
        let svg = match self.selected().map(|idx| self.crossings[idx].sign) {
            Some(Sign::Negative) => NEGATIVE_GLYPH,
            Some(Sign::Flat) => FLAT_GLYPH,
            Some(Sign::Positive) | None => POSITIVE_GLYPH,
        };
        let Ok(mut glyph) = BezPath::from_svg(svg) else {
            return BezPath::new();
        };
        let r = self.config.switcher_size * 0.1;
        glyph.apply_affine(Affine::translate(self.switcher.to_vec2()) * Affine::scale(r));
        glyph
    }

    /// A handle for the switcher, for the host's canvas code.
    pub fn switcher_handle(&mut self) -> CrossingSwitcher<'_> {
        CrossingSwitcher { effect: self }
    }
}

/// Something the user can grab and click on the canvas.
pub trait CanvasHandle {
    /// Where the handle is drawn.
    fn handle_position(&self) -> Point;

    /// The user dragged the handle to `p`.
    fn set_handle_position(&mut self, p: Point);

    /// The user clicked the handle. Returns data for the host to store, if
    /// anything changed.
    fn on_click(&mut self, modifier: ClickModifier) -> Option<Vec<f64>>;
}

/// The on-canvas handle that selects and switches crossings.
///
/// Dragging it snaps it to the nearest crossing; clicking it changes that
/// crossing's sign.
#[derive(Debug)]
pub struct CrossingSwitcher<'a> {
    effect: &'a mut KnotEffect,
}

impl CanvasHandle for CrossingSwitcher<'_> {
    fn handle_position(&self) -> Point {
        self.effect.switcher()
    }

    fn set_handle_position(&mut self, p: Point) {
        self.effect.select_nearest(p);
    }

    fn on_click(&mut self, modifier: ClickModifier) -> Option<Vec<f64>> {
        self.effect.click(modifier)
    }
}
