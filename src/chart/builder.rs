//! Builds chart descriptors from laid out records.

use super::style::{
    palette_color, Confidence, MarkerSymbol, DEFAULT_MARKER_SIZE, ERROR_BAR_OPACITY,
    MAX_BORDER_COLOR, MIN_BORDER_COLOR, MIN_MAX_BORDER_WIDTH, MIN_MAX_MARKER_SIZE,
    NO_BORDER_COLOR,
};
use super::{
    Axis, BarTrace, ChartDescriptor, ErrorBarTrace, HoverLabel, Layout, PointMeta, PointTrace,
    Title, Trace,
};
use crate::descriptors::TestInfo;
use crate::interaction::ClickContext;
use crate::layout::LaidOutTest;
use crate::models::{Category, Record, SliceScheme};
use crate::stats::Extreme;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Name of the cross-test overview chart.
pub const SUMMARY_CHART_NAME: &str = "summary-chart";

const POINT_HOVER_TEMPLATE: &str = concat!(
    "<b>%{y:.2f} ms</b><br>",
    "Xemu    %{customdata[0]}%{customdata[11]}<br>",
    "OS      %{customdata[1]}<br>",
    "CPU     %{customdata[2]} [%{customdata[8]}]<br>",
    "GPU     %{customdata[3]}<br>",
    "Backend %{customdata[4]}<br>",
    "%{customdata[9]} - %{customdata[10]}<br>",
    "%{customdata[7]}<br>",
    "%{customdata[5]}<br>",
    "<extra></extra>"
);

const SUMMARY_HOVER_TEMPLATE: &str = concat!(
    "<b>%{y:.2f}</b><br>",
    "Num data points: %{customdata[0]}<br>",
    "Unique machines: %{customdata[1]}",
    "<extra></extra>"
);

const SUMMARY_OUTLINE_DASH: &str = "dot";

fn point_meta(record: &Record) -> PointMeta {
    let bound = |value: f64, missing: &str| {
        if value.is_nan() {
            missing.to_string()
        } else {
            value.to_string()
        }
    };
    PointMeta {
        version: record.version.name.clone(),
        os: record.os_system.clone(),
        cpu: record.cpu_manufacturer.clone(),
        gpu: record.gpu_renderer.clone(),
        renderer: record.renderer.as_str().to_string(),
        machine_id: record.machine_id.clone(),
        machine_id_with_renderer: record.machine_id_with_renderer.clone(),
        iso: record.iso.clone(),
        cpu_freq_max: record.cpu_freq_max.clone(),
        adjusted_min: bound(record.adjusted_min_ms, "??"),
        adjusted_max: bound(record.adjusted_max_ms, "No range data"),
        tag_suffix: record
            .version
            .tooltip_tag()
            .map(|tag| format!("<br>  Tag: {}", tag))
            .unwrap_or_default(),
    }
}

fn point_trace(laid: &LaidOutTest, members: &[usize], name: &str, color: &str) -> PointTrace {
    let mut trace = PointTrace {
        name: name.to_string(),
        color: color.to_string(),
        x: Vec::with_capacity(members.len()),
        y: Vec::with_capacity(members.len()),
        symbols: Vec::with_capacity(members.len()),
        sizes: Vec::with_capacity(members.len()),
        border_colors: Vec::with_capacity(members.len()),
        border_widths: Vec::with_capacity(members.len()),
        customdata: Vec::with_capacity(members.len()),
        hovertemplate: POINT_HOVER_TEMPLATE.to_string(),
    };

    for &i in members {
        let record = &laid.records[i];
        let extreme = laid.extremes.get(i).copied().unwrap_or_default();
        trace.x.push(laid.x[i]);
        trace.y.push(record.average_ms);
        trace.symbols.push(MarkerSymbol::for_backend(&record.renderer));
        let (size, border_color, border_width) = match extreme {
            Extreme::Min => (MIN_MAX_MARKER_SIZE, MIN_BORDER_COLOR, MIN_MAX_BORDER_WIDTH),
            Extreme::Max => (MIN_MAX_MARKER_SIZE, MAX_BORDER_COLOR, MIN_MAX_BORDER_WIDTH),
            Extreme::None => (DEFAULT_MARKER_SIZE, NO_BORDER_COLOR, 0.0),
        };
        trace.sizes.push(size);
        trace.border_colors.push(border_color.to_string());
        trace.border_widths.push(border_width);
        trace.customdata.push(point_meta(record));
    }
    trace
}

fn error_bar_trace(laid: &LaidOutTest, members: &[usize], name: &str, color: &str) -> ErrorBarTrace {
    ErrorBarTrace {
        name: name.to_string(),
        color: color.to_string(),
        x: members.iter().map(|&i| laid.x[i]).collect(),
        y: members.iter().map(|&i| laid.records[i].average_ms).collect(),
        plus: members.iter().map(|&i| laid.records[i].error_plus_ms).collect(),
        minus: members.iter().map(|&i| laid.records[i].error_minus_ms).collect(),
        opacity: ERROR_BAR_OPACITY,
    }
}

/// Descriptor for one test's chart.
///
/// Each series gets a palette color by position; with error bars enabled the bar
/// overlay precedes its point trace.
pub fn build_test_chart(
    laid: &LaidOutTest,
    show_error_bars: bool,
    info: Option<TestInfo>,
) -> ChartDescriptor {
    let mut traces = Vec::new();
    for (index, series) in laid.series().iter().enumerate() {
        let color = palette_color(index);
        if show_error_bars {
            traces.push(Trace::ErrorBars(error_bar_trace(
                laid,
                &series.members,
                &series.name,
                color,
            )));
        }
        traces.push(Trace::Points(point_trace(
            laid,
            &series.members,
            &series.name,
            color,
        )));
    }

    let scheme_title = laid.scheme.title();
    let mut xaxis = Axis::category(scheme_title);
    xaxis.tickvals = Some(Vec::new());
    xaxis.ticktext = Some(Vec::new());
    xaxis.dtick = Some(1.0);
    let mut yaxis = Axis::value("Avg duration (ms)");
    yaxis.autorange = Some(true);

    ChartDescriptor {
        name: laid.test_name.clone(),
        traces,
        layout: Layout {
            title: Title::styled(format!("{} by {}", laid.test_name, scheme_title)),
            xaxis,
            yaxis,
            showlegend: Some(laid.scheme != SliceScheme::ByVersion),
            hoverlabel: HoverLabel::default(),
        },
        click_context: Some(ClickContext::from_layout(laid)),
        dynamic_ticks: Some(laid.axis.full_ticks()),
        info,
    }
}

struct CategoryTotals {
    category: Category,
    total_us: f64,
    count: usize,
    machines: HashSet<String>,
}

/// Overview bar chart: mean duration per category across every test.
pub fn build_summary_chart(scheme: SliceScheme, records: &[Record]) -> ChartDescriptor {
    let mut totals: IndexMap<String, CategoryTotals> = IndexMap::new();
    for record in records {
        let category = scheme.category_of(record);
        let entry = totals
            .entry(category.key.clone())
            .or_insert_with(|| CategoryTotals {
                category,
                total_us: 0.0,
                count: 0,
                machines: HashSet::new(),
            });
        entry.total_us += record.average_us;
        entry.count += 1;
        entry.machines.insert(record.machine_id.clone());
    }

    let mut rows: Vec<CategoryTotals> = totals.into_values().collect();
    rows.sort_by(|a, b| scheme.compare(&a.category, &b.category));

    let mut bars = BarTrace {
        x: Vec::with_capacity(rows.len()),
        y: Vec::with_capacity(rows.len()),
        colors: Vec::with_capacity(rows.len()),
        line_colors: Vec::with_capacity(rows.len()),
        line_widths: Vec::with_capacity(rows.len()),
        line_dash: SUMMARY_OUTLINE_DASH.to_string(),
        customdata: Vec::with_capacity(rows.len()),
        hovertemplate: SUMMARY_HOVER_TEMPLATE.to_string(),
    };
    for row in rows {
        let confidence = Confidence::from_machine_count(row.machines.len());
        bars.x.push(row.category.label);
        bars.y.push(row.total_us / row.count as f64 / 1000.0);
        bars.colors.push(confidence.fill().to_string());
        bars.line_colors.push(confidence.outline().to_string());
        bars.line_widths.push(confidence.outline_width());
        bars.customdata.push((row.count, row.machines.len()));
    }

    ChartDescriptor {
        name: SUMMARY_CHART_NAME.to_string(),
        traces: vec![Trace::Bars(bars)],
        layout: Layout {
            title: Title::styled("Overall average duration (lower is better)"),
            xaxis: Axis::category(scheme.title()),
            yaxis: Axis::value("Sum of averages"),
            showlegend: None,
            hoverlabel: HoverLabel::default(),
        },
        click_context: None,
        dynamic_ticks: None,
        info: None,
    }
}
