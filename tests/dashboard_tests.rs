//! End-to-end dashboard scenarios
//!
//! Each test builds a Dashboard over a small data set and a recording backend,
//! then checks the chart set, the URL fragment and the backend calls.

mod common;

use common::{record, RecordingBackend};
use perf_dashboard::config::preferences::PreferencesStore;
use perf_dashboard::descriptors::TestSuiteDescriptors;
use perf_dashboard::interaction::PointSelection;
use perf_dashboard::{
    BasicStats, Dashboard, DashboardConfig, DashboardError, DashboardEvent, Record, SliceScheme,
    Toggle, Trace, VersionRange,
};
use std::sync::Arc;
use tempfile::TempDir;

fn dashboard(records: Vec<Record>) -> (Dashboard, Arc<RecordingBackend>) {
    let backend = Arc::new(RecordingBackend::default());
    let dashboard = Dashboard::new(
        records,
        TestSuiteDescriptors::default(),
        DashboardConfig::default(),
        backend.clone(),
        Arc::new(BasicStats),
    );
    (dashboard, backend)
}

fn chart_names(dashboard: &Dashboard) -> Vec<String> {
    dashboard.plan().charts().iter().map(|c| c.name.clone()).collect()
}

fn point_total(traces: &[Trace]) -> usize {
    traces
        .iter()
        .filter(|t| matches!(t, Trace::Points(_)))
        .map(Trace::point_count)
        .sum()
}

#[tokio::test]
async fn test_single_machine_by_version() {
    let (mut dashboard, backend) = dashboard(vec![
        record("A", "m1", "0.1.0", "Linux", 10.0),
        record("A", "m1", "0.2.0", "Linux", 12.0),
    ]);
    let outcome = dashboard.load("");
    assert!(!outcome.no_data);
    assert_eq!(chart_names(&dashboard), vec!["summary-chart", "A"]);

    let chart = &dashboard.plan().charts()[1];
    assert_eq!(point_total(&chart.traces), 2);
    assert_eq!(chart.layout.showlegend, Some(false));

    dashboard
        .scheduler_mut()
        .on_visible(&outcome.containers)
        .await
        .unwrap();
    assert_eq!(backend.draw_count(), 2);

    let selected = dashboard
        .scheduler_mut()
        .on_point_selected(
            outcome.containers[1],
            PointSelection {
                trace_index: 0,
                point_index: 1,
            },
        )
        .await
        .unwrap();
    assert!(selected);

    let added = backend.added.lock().unwrap();
    match &added[0].1 {
        Trace::Line(line) => {
            assert_eq!(line.x, vec![0.0, 1.0]);
            assert_eq!(line.y, vec![10.0, 12.0]);
        }
        other => panic!("expected a line, got {:?}", other),
    }
}

#[tokio::test]
async fn test_negated_chip_hides_machine_and_summary() {
    let (mut dashboard, _backend) = dashboard(vec![
        record("A", "m1", "0.1.0", "os1", 10.0),
        record("A", "m2", "0.1.0", "os2", 11.0),
    ]);
    dashboard.load("");

    assert!(dashboard
        .handle(DashboardEvent::DataFilterInput("!os1".to_string()))
        .unwrap()
        .is_none());
    let outcome = dashboard
        .handle(DashboardEvent::CommitDataFilter)
        .unwrap()
        .unwrap();

    assert!(dashboard.view().data_filter.is_empty());
    assert!(!dashboard.has_pending_edit());
    assert!(outcome.fragment.contains("df=%21os1"));
    assert_eq!(chart_names(&dashboard), vec!["A"]);

    let chart = &dashboard.plan().charts()[0];
    assert_eq!(point_total(&chart.traces), 1);
    assert_eq!(chart.traces[0].point_meta(0).unwrap().machine_id, "m2");

    let outcome = dashboard.handle(DashboardEvent::RemoveChip(0)).unwrap().unwrap();
    assert!(!outcome.fragment.contains("df="));
    assert_eq!(chart_names(&dashboard), vec!["summary-chart", "A"]);
}

#[test]
fn test_fragment_range_narrows_versions() {
    let records = (0..5)
        .map(|i| record("A", "m1", &format!("0.{}.0", i), "Linux", 10.0))
        .collect();
    let (mut dashboard, _backend) = dashboard(records);
    dashboard.load("#rangeStart=2&rangeEnd=2");

    assert_eq!(dashboard.view().range, VersionRange::new(2, 2));
    let chart = &dashboard.plan().charts()[1];
    assert_eq!(point_total(&chart.traces), 1);
    assert_eq!(chart.traces[0].point_meta(0).unwrap().version, "0.2.0");
}

#[test]
fn test_filtering_everything_out_is_no_data() {
    let (mut dashboard, backend) = dashboard(vec![record("A", "m1", "0.1.0", "Linux", 10.0)]);
    let outcome = dashboard.load("df=windows");
    assert!(outcome.no_data);
    assert!(outcome.containers.is_empty());
    assert_eq!(backend.draw_count(), 0);
}

#[test]
fn test_forged_bare_negation_chip_keeps_data() {
    let (mut dashboard, _backend) = dashboard(vec![record("A", "m1", "0.1.0", "Linux", 10.0)]);
    let outcome = dashboard.load("df=%21");
    assert!(!outcome.no_data);
    assert!(dashboard.view().chips.is_empty());
    assert_eq!(chart_names(&dashboard), vec!["summary-chart", "A"]);
}

#[test]
fn test_unknown_scheme_key_is_an_error() {
    let (mut dashboard, _backend) = dashboard(vec![record("A", "m1", "0.1.0", "Linux", 10.0)]);
    dashboard.load("");

    let result = dashboard.handle(DashboardEvent::SetScheme("by-weather".to_string()));
    assert!(matches!(result, Err(DashboardError::UnresolvedScheme(key)) if key == "by-weather"));
    assert_eq!(dashboard.view().scheme, SliceScheme::ByVersion);

    let outcome = dashboard
        .handle(DashboardEvent::SetScheme("by-os".to_string()))
        .unwrap()
        .unwrap();
    assert!(outcome.fragment.starts_with("view=by-os"));
    assert_eq!(dashboard.plan().charts()[1].layout.title.text, "A by Operating System");
}

#[tokio::test(start_paused = true)]
async fn test_rapid_test_filter_edits_render_once() {
    let (mut dashboard, _backend) = dashboard(vec![
        record("Alpha", "m1", "0.1.0", "Linux", 10.0),
        record("Beta", "m1", "0.1.0", "Linux", 10.0),
    ]);
    dashboard.load("");
    let epoch = dashboard.scheduler().epoch();

    for text in ["a", "al", "alp"] {
        let outcome = dashboard
            .handle(DashboardEvent::TestFilterInput(text.to_string()))
            .unwrap();
        assert!(outcome.is_none());
    }
    assert!(dashboard.has_pending_edit());
    assert_eq!(dashboard.scheduler().epoch(), epoch);

    let outcome = dashboard.next_debounced().await;
    assert_eq!(dashboard.scheduler().epoch(), epoch + 1);
    assert!(outcome.fragment.contains("testFilter=alp"));
    assert_eq!(chart_names(&dashboard), vec!["Alpha"]);
}

#[tokio::test(start_paused = true)]
async fn test_commit_supersedes_an_already_fired_edit() {
    let (mut dashboard, _backend) = dashboard(vec![
        record("A", "m1", "0.1.0", "os1", 10.0),
        record("A", "m2", "0.1.0", "os2", 11.0),
    ]);
    dashboard.load("");

    dashboard
        .handle(DashboardEvent::DataFilterInput("os1".to_string()))
        .unwrap();
    // Let the quiet period lapse so the timer has already queued its fire.
    tokio::time::sleep(std::time::Duration::from_millis(150)).await;

    dashboard
        .handle(DashboardEvent::CommitDataFilter)
        .unwrap()
        .unwrap();
    let epoch = dashboard.scheduler().epoch();

    let extra = tokio::time::timeout(
        std::time::Duration::from_millis(500),
        dashboard.next_debounced(),
    )
    .await;
    assert!(extra.is_err(), "commit must not be followed by another render");
    assert_eq!(dashboard.scheduler().epoch(), epoch);
}

#[test]
fn test_recompute_keeps_top_chart_in_place() {
    let (mut dashboard, backend) = dashboard(vec![
        record("A", "m1", "0.1.0", "Linux", 10.0),
        record("B", "m1", "0.1.0", "Linux", 10.0),
    ]);
    let outcome = dashboard.load("");
    backend.set_tops(vec![
        (outcome.containers[0], -800.0),
        (outcome.containers[1], -200.0),
        (outcome.containers[2], 75.0),
    ]);

    let outcome = dashboard
        .handle(DashboardEvent::SetToggle(Toggle::ShowErrorBars, true))
        .unwrap()
        .unwrap();
    assert!(outcome.fragment.contains("anchor=B"));
    assert_eq!(outcome.anchored, Some(outcome.containers[2]));
    assert_eq!(backend.last_scroll(), Some((outcome.containers[2], 75.0)));
}

#[test]
fn test_load_scrolls_to_fragment_anchor() {
    let (mut dashboard, backend) = dashboard(vec![
        record("A", "m1", "0.1.0", "Linux", 10.0),
        record("B", "m1", "0.1.0", "Linux", 10.0),
    ]);
    let outcome = dashboard.load("view=by-os&anchor=B");
    assert_eq!(outcome.anchored, Some(outcome.containers[2]));
    assert_eq!(backend.last_scroll(), Some((outcome.containers[2], 0.0)));

    // A vanished anchor is ignored.
    let outcome = dashboard.load("anchor=Nope");
    assert_eq!(outcome.anchored, None);
}

#[test]
fn test_share_url_carries_anchor() {
    let (mut dashboard, _backend) = dashboard(vec![record("A", "m1", "0.1.0", "Linux", 10.0)]);
    dashboard.load("hmm=true");
    let url = dashboard.share_url("https://example.org/dash#old", "A");
    assert!(url.starts_with("https://example.org/dash#view=by-version&hmm=true"));
    assert!(url.ends_with("&anchor=A"));
}

#[test]
fn test_preferences_seed_a_fresh_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.json");
    let records = vec![record("A", "m1", "0.1.0", "Linux", 10.0)];

    let (first, _backend) = dashboard(records.clone());
    let mut first = first.with_preferences(PreferencesStore::new(&path));
    first.load("");
    first
        .handle(DashboardEvent::SetScheme("by-gpu".to_string()))
        .unwrap();
    first
        .handle(DashboardEvent::SetToggle(Toggle::ExcludeOutliers, true))
        .unwrap();

    let (second, _backend) = dashboard(records);
    let mut second = second.with_preferences(PreferencesStore::new(&path));
    second.load("");
    assert_eq!(second.view().scheme, SliceScheme::ByGpu);
    assert!(second.view().exclude_outliers);

    // An explicit fragment wins over cached preferences.
    second.load("view=by-cpu");
    assert_eq!(second.view().scheme, SliceScheme::ByCpu);
    assert!(!second.view().exclude_outliers);
}
