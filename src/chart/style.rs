//! Visual constants shared by chart builders.

use crate::models::RendererBackend;
use serde::Serialize;

/// Series colors, cycled by series index.
pub const PALETTE: [&str; 10] = [
    "#0C7BDC", "#E66100", "#009E73", "#CC79A7", "#56B4E9", "#9A6324", "#882255", "#F0E442",
    "#469990", "#D55E00",
];

pub const DEFAULT_MARKER_SIZE: f64 = 12.0;
pub const MIN_MAX_MARKER_SIZE: f64 = 18.0;
pub const MIN_MAX_BORDER_WIDTH: f64 = 3.0;
pub const MIN_BORDER_COLOR: &str = "green";
pub const MAX_BORDER_COLOR: &str = "red";
pub const NO_BORDER_COLOR: &str = "rgba(0,0,0,0)";

pub const ERROR_BAR_OPACITY: f64 = 0.5;

pub const CONTINUITY_LINE_COLOR: &str = "rgba(60, 20, 60, 0.7)";
pub const CONTINUITY_LINE_WIDTH: f64 = 2.0;

pub const TITLE_FONT_FAMILY: &str = "Arial";
pub const TITLE_FONT_SIZE: u32 = 22;
pub const FULLSCREEN_TITLE_FONT_SIZE: u32 = 24;
pub const TOOLTIP_FONT_FAMILY: &str = "Courier New, monospace";
pub const TOOLTIP_FONT_SIZE: u32 = 14;
pub const X_TICK_ANGLE: i32 = -25;

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Marker shape keyed off the renderer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSymbol {
    Circle,
    Star,
    X,
}

impl MarkerSymbol {
    pub fn for_backend(backend: &RendererBackend) -> Self {
        match backend {
            RendererBackend::OpenGl => MarkerSymbol::Circle,
            RendererBackend::Vulkan => MarkerSymbol::Star,
            RendererBackend::Other(_) => MarkerSymbol::X,
        }
    }
}

/// Summary bar styling bucket, chosen by how many distinct machines back a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Sparse,
    Moderate,
    Solid,
}

impl Confidence {
    pub fn from_machine_count(machines: usize) -> Self {
        match machines {
            0..=3 => Confidence::Sparse,
            4..=9 => Confidence::Moderate,
            _ => Confidence::Solid,
        }
    }

    pub fn fill(&self) -> &'static str {
        match self {
            Confidence::Sparse => "rgba(0, 0, 0, 0.1)",
            Confidence::Moderate => "rgb(200, 200, 40)",
            Confidence::Solid => "rgb(52, 152, 219)",
        }
    }

    /// Only sparse bars get a visible outline.
    pub fn outline_width(&self) -> f64 {
        match self {
            Confidence::Sparse => 2.0,
            _ => 0.0,
        }
    }

    pub fn outline(&self) -> &'static str {
        match self {
            Confidence::Sparse => "rgba(211, 47, 47, 0.8)",
            _ => self.fill(),
        }
    }
}
