//! X-axis tick density control.
//!
//! Category charts keep the full label set (one per category) and render a
//! subset sized to the axis width. Subsampling always picks multiples of the
//! step over the *full* set so a label keeps its identity while panning.

use serde::Serialize;
use std::time::Duration;

/// Minimum horizontal room per x label.
pub const PIXELS_PER_LABEL: f64 = 40.0;

/// Delay that lets the chart library settle its layout after a zoom/pan.
pub const TICK_SETTLE_DELAY: Duration = Duration::from_millis(20);

/// Positions and labels of axis ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSet {
    #[serde(rename = "tickvals")]
    pub values: Vec<f64>,
    #[serde(rename = "ticktext")]
    pub labels: Vec<String>,
}

impl TickSet {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push(&mut self, value: f64, label: &str) {
        self.values.push(value);
        self.labels.push(label.to_string());
    }
}

/// Axis change reported by the chart library after a relayout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelayoutEvent {
    pub x_range: Option<(f64, f64)>,
    pub x_autorange: bool,
}

impl RelayoutEvent {
    /// Only x-range changes and autorange requests warrant a tick recompute.
    pub fn is_zoom_or_pan(&self) -> bool {
        self.x_range.is_some() || self.x_autorange
    }
}

/// Visible range and drawn width of the x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGeometry {
    pub range: (f64, f64),
    pub width_px: f64,
}

/// Label budget for an axis of the given pixel width (at least one label).
pub fn max_labels(width_px: f64, pixels_per_label: f64) -> usize {
    let per_label = if pixels_per_label > 0.0 { pixels_per_label } else { PIXELS_PER_LABEL };
    ((width_px / per_label).floor().max(1.0)) as usize
}

/// Pure tick selection for one axis state.
pub fn recompute_ticks(full: &TickSet, geometry: AxisGeometry, pixels_per_label: f64) -> TickSet {
    let (lo, hi) = geometry.range;
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let span = hi - lo;
    let budget = max_labels(geometry.width_px, pixels_per_label);

    let in_range = |v: f64| v >= lo && v <= hi;
    let mut ticks = TickSet::default();

    if span >= budget as f64 {
        let mut step = (span / budget as f64).ceil().max(1.0) as usize;
        loop {
            let visible = full
                .values
                .iter()
                .enumerate()
                .filter(|(i, v)| i % step == 0 && in_range(**v))
                .count();
            if visible <= budget {
                break;
            }
            step += 1;
        }
        for (i, (value, label)) in full.values.iter().zip(&full.labels).enumerate() {
            if i % step == 0 && in_range(*value) {
                ticks.push(*value, label);
            }
        }
    } else {
        for (value, label) in full.values.iter().zip(&full.labels) {
            if in_range(*value) {
                ticks.push(*value, label);
            }
        }
    }
    ticks
}

/// Per-chart tick state with a reentrancy guard.
///
/// The guard is set when a recompute starts and cleared by [`TickController::finish`]
/// once the label update has been applied, so the range notification that the
/// update itself triggers is ignored.
#[derive(Debug, Clone)]
pub struct TickController {
    full: TickSet,
    rendered: TickSet,
    pixels_per_label: f64,
    updating: bool,
}

impl TickController {
    pub fn new(full: TickSet, pixels_per_label: f64) -> Self {
        TickController {
            full,
            rendered: TickSet::default(),
            pixels_per_label,
            updating: false,
        }
    }

    pub fn full(&self) -> &TickSet {
        &self.full
    }

    pub fn rendered(&self) -> &TickSet {
        &self.rendered
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Start a recompute. Returns `None` while another one is in flight or
    /// when there is nothing to thin out.
    pub fn begin(&mut self, geometry: AxisGeometry) -> Option<TickSet> {
        if self.updating || self.full.len() < 2 {
            return None;
        }
        self.updating = true;
        let ticks = recompute_ticks(&self.full, geometry, self.pixels_per_label);
        self.rendered = ticks.clone();
        Some(ticks)
    }

    /// Clear the guard after the axis update completed (or failed).
    pub fn finish(&mut self) {
        self.updating = false;
    }
}
