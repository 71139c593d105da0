//! Chart descriptors handed to the rendering backend.
//!
//! A descriptor is built completely from data before anything is drawn and is
//! never mutated afterwards. The serialized form follows the trace/layout
//! vocabulary common to web charting libraries.

pub mod builder;
pub mod style;

use crate::descriptors::TestInfo;
use crate::interaction::ClickContext;
use crate::ticks::TickSet;
use serde::ser::{SerializeTuple, Serializer};
use serde::Serialize;
use style::MarkerSymbol;

pub use builder::{build_summary_chart, build_test_chart, SUMMARY_CHART_NAME};

/// Per-point tooltip metadata.
///
/// Serialized positionally so hover templates can address fields by index;
/// index 6 is the machine+renderer identity used for continuity lines.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMeta {
    pub version: String,
    pub os: String,
    pub cpu: String,
    pub gpu: String,
    pub renderer: String,
    pub machine_id: String,
    pub machine_id_with_renderer: String,
    pub iso: String,
    pub cpu_freq_max: String,
    pub adjusted_min: String,
    pub adjusted_max: String,
    pub tag_suffix: String,
}

impl Serialize for PointMeta {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(12)?;
        tuple.serialize_element(&self.version)?;
        tuple.serialize_element(&self.os)?;
        tuple.serialize_element(&self.cpu)?;
        tuple.serialize_element(&self.gpu)?;
        tuple.serialize_element(&self.renderer)?;
        tuple.serialize_element(&self.machine_id)?;
        tuple.serialize_element(&self.machine_id_with_renderer)?;
        tuple.serialize_element(&self.iso)?;
        tuple.serialize_element(&self.cpu_freq_max)?;
        tuple.serialize_element(&self.adjusted_min)?;
        tuple.serialize_element(&self.adjusted_max)?;
        tuple.serialize_element(&self.tag_suffix)?;
        tuple.end()
    }
}

/// Markers for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointTrace {
    pub name: String,
    pub color: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub symbols: Vec<MarkerSymbol>,
    pub sizes: Vec<f64>,
    pub border_colors: Vec<String>,
    pub border_widths: Vec<f64>,
    pub customdata: Vec<PointMeta>,
    pub hovertemplate: String,
}

/// Asymmetric error bars drawn beneath a point series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBarTrace {
    pub name: String,
    pub color: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub plus: Vec<f64>,
    pub minus: Vec<f64>,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub name: String,
    pub color: String,
    pub width: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub colors: Vec<String>,
    pub line_colors: Vec<String>,
    pub line_widths: Vec<f64>,
    /// Outline dash style shared by every bar.
    pub line_dash: String,
    /// (points, unique machines) per bar
    pub customdata: Vec<(usize, usize)>,
    pub hovertemplate: String,
}

/// One drawable trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    Points(PointTrace),
    ErrorBars(ErrorBarTrace),
    Line(LineTrace),
    Bars(BarTrace),
}

impl Trace {
    pub fn name(&self) -> Option<&str> {
        match self {
            Trace::Points(t) => Some(&t.name),
            Trace::ErrorBars(t) => Some(&t.name),
            Trace::Line(t) => Some(&t.name),
            Trace::Bars(_) => None,
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Trace::Points(t) => t.x.len(),
            Trace::ErrorBars(t) => t.x.len(),
            Trace::Line(t) => t.x.len(),
            Trace::Bars(t) => t.x.len(),
        }
    }

    /// Tooltip metadata of one point, when the trace carries any.
    pub fn point_meta(&self, index: usize) -> Option<&PointMeta> {
        match self {
            Trace::Points(t) => t.customdata.get(index),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
    pub x: f64,
    pub xanchor: String,
}

impl Title {
    pub fn styled(text: impl Into<String>) -> Self {
        Title {
            text: text.into(),
            font: Font {
                family: style::TITLE_FONT_FAMILY.to_string(),
                size: style::TITLE_FONT_SIZE,
            },
            x: 0.5,
            xanchor: "center".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub zeroline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automargin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryorder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticktext: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<bool>,
}

impl Axis {
    /// Category x axis with the shared label styling.
    pub fn category(title: &str) -> Self {
        Axis {
            title: title.to_string(),
            automargin: Some(true),
            tickangle: Some(style::X_TICK_ANGLE),
            categoryorder: Some("category ascending".to_string()),
            ..Default::default()
        }
    }

    pub fn value(title: &str) -> Self {
        Axis {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    pub hoverlabel: HoverLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub align: String,
    pub font: Font,
}

impl Default for HoverLabel {
    fn default() -> Self {
        HoverLabel {
            align: "left".to_string(),
            font: Font {
                family: style::TOOLTIP_FONT_FAMILY.to_string(),
                size: style::TOOLTIP_FONT_SIZE,
            },
        }
    }
}

/// A named set of traces plus layout and interaction metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub name: String,
    pub traces: Vec<Trace>,
    pub layout: Layout,
    /// Data needed to draw continuity lines on point selection
    #[serde(skip)]
    pub click_context: Option<ClickContext>,
    /// Full tick set when the x axis labels are thinned dynamically
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_ticks: Option<TickSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<TestInfo>,
}

impl ChartDescriptor {
    /// Copy for the expanded (fullscreen) view, with a larger title.
    pub fn fullscreen(&self) -> ChartDescriptor {
        let mut expanded = self.clone();
        expanded.layout.title.font.size = style::FULLSCREEN_TITLE_FONT_SIZE;
        expanded
    }

    pub fn is_summary(&self) -> bool {
        self.name == SUMMARY_CHART_NAME
    }
}
