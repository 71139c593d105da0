//! Point selection handling: machine continuity lines.
//!
//! Selecting a point overlays a line through every measurement of the same
//! machine+renderer within that test, ordered along the category axis. Only one
//! such line exists per chart; it is identified by a reserved trace name.

use crate::chart::style::{CONTINUITY_LINE_COLOR, CONTINUITY_LINE_WIDTH};
use crate::chart::{LineTrace, Trace};
use crate::layout::LaidOutTest;
use crate::models::SliceScheme;

/// Reserved name of the overlay trace.
pub const CONNECTION_TRACE_NAME: &str = "connection_line";

/// Position of one record, kept for drawing continuity lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityPoint {
    pub machine_key: String,
    pub category_rank: usize,
    pub x: f64,
    pub y: f64,
}

/// Interaction data attached to a test chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickContext {
    pub scheme: SliceScheme,
    pub points: Vec<ContinuityPoint>,
}

impl ClickContext {
    pub fn from_layout(laid: &LaidOutTest) -> Self {
        let points = laid
            .records
            .iter()
            .zip(&laid.x)
            .map(|(record, x)| ContinuityPoint {
                machine_key: record.machine_id_with_renderer.clone(),
                category_rank: laid
                    .axis
                    .position(&laid.scheme.category_of(record).key)
                    .unwrap_or(0),
                x: *x,
                y: record.average_ms,
            })
            .collect();
        ClickContext {
            scheme: laid.scheme,
            points,
        }
    }

    /// Line through every point of `machine_key`, ordered by category.
    pub fn continuity_line(&self, machine_key: &str) -> Option<Trace> {
        let mut points: Vec<&ContinuityPoint> = self
            .points
            .iter()
            .filter(|p| p.machine_key == machine_key)
            .collect();
        if points.is_empty() {
            return None;
        }
        points.sort_by_key(|p| p.category_rank);

        Some(Trace::Line(LineTrace {
            name: CONNECTION_TRACE_NAME.to_string(),
            color: CONTINUITY_LINE_COLOR.to_string(),
            width: CONTINUITY_LINE_WIDTH,
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            showlegend: false,
        }))
    }
}

/// A point picked by the user, as reported by the chart library.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSelection {
    pub trace_index: usize,
    pub point_index: usize,
}

/// Backend operations needed to swap the overlay line.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayUpdate {
    /// Indices of previously added overlay traces, ascending
    pub remove: Vec<usize>,
    pub add: Trace,
}

/// Resolve a selection against the chart's current traces.
///
/// Returns `None` when the selected point has no machine identity (summary bars,
/// overlay lines, error bars) or the chart has no click context.
pub fn plan_overlay(
    traces: &[Trace],
    context: Option<&ClickContext>,
    selection: &PointSelection,
) -> Option<OverlayUpdate> {
    let context = context?;
    let meta = traces
        .get(selection.trace_index)?
        .point_meta(selection.point_index)?;
    if meta.machine_id_with_renderer.is_empty() {
        return None;
    }

    let add = context.continuity_line(&meta.machine_id_with_renderer)?;
    let remove = traces
        .iter()
        .enumerate()
        .filter(|(_, t)| t.name() == Some(CONNECTION_TRACE_NAME))
        .map(|(i, _)| i)
        .collect();
    Some(OverlayUpdate { remove, add })
}

/// Mirror an overlay update onto a local copy of the chart's traces.
pub fn apply_overlay(traces: &mut Vec<Trace>, update: &OverlayUpdate) {
    for index in update.remove.iter().rev() {
        if *index < traces.len() {
            traces.remove(*index);
        }
    }
    traces.push(update.add.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build_test_chart;
    use crate::layout::{lay_out_test, MAX_JITTER};
    use crate::models::{Record, Version};

    fn rec(machine: &str, version: &str, ms: f64) -> Record {
        Record {
            test_name: "A".to_string(),
            machine_id: machine.to_string(),
            machine_id_with_renderer: format!("{}:GL", machine),
            version: Version::from_display(version),
            average_ms: ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_line_is_ordered_by_category() {
        let laid = lay_out_test(
            "A",
            vec![rec("m1", "0.3.0", 3.0), rec("m1", "0.1.0", 1.0), rec("m2", "0.2.0", 2.0)],
            SliceScheme::ByVersion,
            MAX_JITTER,
        );
        let ctx = ClickContext::from_layout(&laid);
        match ctx.continuity_line("m1:GL") {
            Some(Trace::Line(line)) => {
                assert_eq!(line.y, vec![1.0, 3.0]);
                assert_eq!(line.name, CONNECTION_TRACE_NAME);
            }
            other => panic!("unexpected trace: {:?}", other),
        }
        assert!(ctx.continuity_line("nobody").is_none());
    }

    #[test]
    fn test_only_one_overlay_at_a_time() {
        let laid = lay_out_test(
            "A",
            vec![rec("m1", "0.1.0", 1.0), rec("m2", "0.2.0", 2.0)],
            SliceScheme::ByVersion,
            MAX_JITTER,
        );
        let chart = build_test_chart(&laid, false, None);
        let mut traces = chart.traces.clone();
        let ctx = chart.click_context.as_ref();

        let first = plan_overlay(&traces, ctx, &PointSelection { trace_index: 0, point_index: 0 }).unwrap();
        assert!(first.remove.is_empty());
        apply_overlay(&mut traces, &first);

        let second = plan_overlay(&traces, ctx, &PointSelection { trace_index: 1, point_index: 0 }).unwrap();
        assert_eq!(second.remove, vec![2]);
        apply_overlay(&mut traces, &second);

        let overlays = traces
            .iter()
            .filter(|t| t.name() == Some(CONNECTION_TRACE_NAME))
            .count();
        assert_eq!(overlays, 1);
    }

    #[test]
    fn test_selection_without_identity_is_noop() {
        let laid = lay_out_test("A", vec![rec("m1", "0.1.0", 1.0)], SliceScheme::ByVersion, MAX_JITTER);
        let chart = build_test_chart(&laid, false, None);
        // No click context (e.g. summary chart)
        assert!(plan_overlay(&chart.traces, None, &PointSelection { trace_index: 0, point_index: 0 }).is_none());
        // Point index out of range
        assert!(plan_overlay(
            &chart.traces,
            chart.click_context.as_ref(),
            &PointSelection { trace_index: 0, point_index: 7 }
        )
        .is_none());
    }
}
