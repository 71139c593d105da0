//! One render cycle: records in, chart descriptors out.
//!
//! version range -> data filters -> statistics -> summary -> per-test layout
//! -> descriptors. Everything here is pure; drawing happens later in the
//! scheduler.

use crate::chart::{build_summary_chart, build_test_chart, ChartDescriptor};
use crate::config::DashboardConfig;
use crate::descriptors::TestSuiteDescriptors;
use crate::filter::apply_data_filters;
use crate::layout::lay_out_test;
use crate::models::{Record, VersionCatalog};
use crate::state::ViewState;
use crate::stats::StatsProcessor;
use indexmap::IndexMap;
use serde::Serialize;

/// Result of a render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "charts", rename_all = "snake_case")]
pub enum RenderPlan {
    /// Nothing survived filtering; show the placeholder instead of charts
    NoData,
    Charts(Vec<ChartDescriptor>),
}

impl RenderPlan {
    pub fn charts(&self) -> &[ChartDescriptor] {
        match self {
            RenderPlan::NoData => &[],
            RenderPlan::Charts(charts) => charts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.charts().is_empty()
    }

    pub fn into_charts(self) -> Vec<ChartDescriptor> {
        match self {
            RenderPlan::NoData => Vec::new(),
            RenderPlan::Charts(charts) => charts,
        }
    }
}

/// Records whose version lies in the view's inclusive range.
pub fn filter_by_version(records: &[Record], catalog: &VersionCatalog, view: &ViewState) -> Vec<Record> {
    records
        .iter()
        .filter(|r| view.range.contains(catalog, &r.version))
        .cloned()
        .collect()
}

/// Group by test name in first-appearance order, keeping tests whose
/// lowercased name contains `test_filter`.
pub fn group_by_test(records: Vec<Record>, test_filter: &str) -> IndexMap<String, Vec<Record>> {
    let needle = test_filter.trim().to_lowercase();
    let mut tests: IndexMap<String, Vec<Record>> = IndexMap::new();
    for record in records {
        if !needle.is_empty() && !record.test_name.to_lowercase().contains(&needle) {
            continue;
        }
        tests.entry(record.test_name.clone()).or_default().push(record);
    }
    tests
}

/// Build every chart descriptor for `view`.
pub fn build_render_plan(
    records: &[Record],
    catalog: &VersionCatalog,
    view: &ViewState,
    stats: &dyn StatsProcessor,
    descriptors: &TestSuiteDescriptors,
    config: &DashboardConfig,
) -> RenderPlan {
    let in_range = filter_by_version(records, catalog, view);
    let filtered = apply_data_filters(&in_range, &view.filter_terms());
    if filtered.is_empty() {
        log::info!("[Pipeline] No records left after filtering");
        return RenderPlan::NoData;
    }

    let processed = stats.process(filtered, view.exclude_outliers);
    let mut charts = Vec::new();
    if view.shows_summary() {
        charts.push(build_summary_chart(view.scheme, &processed));
    }

    for (test_name, test_records) in group_by_test(processed, &view.test_filter) {
        let flags = view
            .highlight_min_max
            .then(|| stats.min_max(&test_records));
        let mut laid = lay_out_test(&test_name, test_records, view.scheme, config.max_jitter);
        if let Some(flags) = flags {
            laid.apply_extremes(flags);
        }
        let info = descriptors.lookup(&test_name);
        charts.push(build_test_chart(&laid, view.show_error_bars, info));
    }

    if charts.is_empty() {
        log::info!("[Pipeline] No tests match '{}'", view.test_filter);
        return RenderPlan::NoData;
    }
    log::debug!(
        "[Pipeline] {} charts for scheme {}",
        charts.len(),
        view.scheme
    );
    RenderPlan::Charts(charts)
}
