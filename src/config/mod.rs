//! Configuration module for the dashboard.
//!
//! # Module Structure
//!
//! - `loader`: Loads [`DashboardConfig`] from TOML files and validates paths
//! - `preferences`: Caches ephemeral UI preferences between sessions
//!
//! Every tunable has a default, so a dashboard can run with no config file at
//! all. Values loaded from disk are validated before use.

pub mod loader;
pub mod preferences;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime tunables for filtering, layout and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Distance around the viewport (px) within which pending charts are drawn
    pub render_margin_px: f64,
    /// Quiet period before free-text filter edits trigger a recompute
    pub text_debounce_ms: u64,
    /// Delay letting the chart library settle after zoom/pan before ticks update
    pub tick_settle_ms: u64,
    /// Minimum horizontal room per x axis label
    pub pixels_per_label: f64,
    /// Total jitter width inside one category
    pub max_jitter: f64,
    /// Versions shown by default, counted back from the newest
    pub default_versions_displayed: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            render_margin_px: 500.0,
            text_debounce_ms: 100,
            tick_settle_ms: crate::ticks::TICK_SETTLE_DELAY.as_millis() as u64,
            pixels_per_label: crate::ticks::PIXELS_PER_LABEL,
            max_jitter: crate::layout::MAX_JITTER,
            default_versions_displayed: 30,
        }
    }
}

impl DashboardConfig {
    pub fn text_debounce(&self) -> Duration {
        Duration::from_millis(self.text_debounce_ms)
    }

    pub fn tick_settle(&self) -> Duration {
        Duration::from_millis(self.tick_settle_ms)
    }

    /// Reject values that would break layout or tick computation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pixels_per_label > 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "pixels_per_label must be positive, got {}",
                self.pixels_per_label
            )));
        }
        if !(0.0..1.0).contains(&self.max_jitter) {
            return Err(ConfigError::ValidationFailed(format!(
                "max_jitter must be in [0, 1), got {}",
                self.max_jitter
            )));
        }
        if !(self.render_margin_px >= 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "render_margin_px must not be negative, got {}",
                self.render_margin_px
            )));
        }
        Ok(())
    }
}
