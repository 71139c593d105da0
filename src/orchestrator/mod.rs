//! Dashboard orchestration: state changes in, re-rendered chart sets out.
//!
//! Every state-affecting event funnels into [`Dashboard::recompute`], which
//! snapshots the scroll anchor, updates the URL fragment, rebuilds the render
//! plan, registers the new charts with the scheduler and re-anchors. Free-text
//! edits are debounced first.

pub mod debounce;
pub mod pipeline;

pub use debounce::Debouncer;
pub use pipeline::{build_render_plan, RenderPlan};

use crate::config::preferences::{Preferences, PreferencesStore};
use crate::config::DashboardConfig;
use crate::descriptors::TestSuiteDescriptors;
use crate::error::Result;
use crate::filter::{suggest, Suggestions};
use crate::models::{Record, VersionCatalog};
use crate::scheduler::{ChartBackend, ContainerId, LazyRenderScheduler, Rect, Viewport};
use crate::state::{self, Toggle, VersionRangeSelector, ViewState};
use crate::stats::StatsProcessor;
use std::sync::Arc;

/// User input that changes the view.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Slicing scheme selected by key
    SetScheme(String),
    SetRangeStart(usize),
    SetRangeEnd(usize),
    SetToggle(Toggle, bool),
    /// Test-name filter edited (debounced)
    TestFilterInput(String),
    /// Data filter edited (debounced)
    DataFilterInput(String),
    /// Enter pressed in the data filter
    CommitDataFilter,
    RemoveChip(usize),
}

impl DashboardEvent {
    pub fn is_debounced(&self) -> bool {
        matches!(
            self,
            DashboardEvent::TestFilterInput(_) | DashboardEvent::DataFilterInput(_)
        )
    }
}

/// What a render cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// New containers in page order; empty when there is no data
    pub containers: Vec<ContainerId>,
    pub no_data: bool,
    /// Fragment written for this cycle
    pub fragment: String,
    /// Container scrolled to, if any
    pub anchored: Option<ContainerId>,
}

pub struct Dashboard {
    config: DashboardConfig,
    records: Vec<Record>,
    catalog: VersionCatalog,
    descriptors: TestSuiteDescriptors,
    stats: Arc<dyn StatsProcessor>,
    view: ViewState,
    scheduler: LazyRenderScheduler,
    debouncer: Debouncer,
    preferences: Option<PreferencesStore>,
    fragment: String,
    plan: RenderPlan,
}

impl Dashboard {
    pub fn new(
        records: Vec<Record>,
        descriptors: TestSuiteDescriptors,
        config: DashboardConfig,
        backend: Arc<dyn ChartBackend>,
        stats: Arc<dyn StatsProcessor>,
    ) -> Self {
        let catalog = VersionCatalog::from_records(&records);
        let view = ViewState::initial(&catalog, config.default_versions_displayed);
        let scheduler = LazyRenderScheduler::new(backend, config.pixels_per_label, config.tick_settle());
        let debouncer = Debouncer::new(config.text_debounce());
        log::info!(
            "[Dashboard] {} records, {} versions",
            records.len(),
            catalog.len()
        );
        Dashboard {
            config,
            records,
            catalog,
            descriptors,
            stats,
            view,
            scheduler,
            debouncer,
            preferences: None,
            fragment: String::new(),
            plan: RenderPlan::NoData,
        }
    }

    /// Remember the scheme and outlier toggle between sessions.
    pub fn with_preferences(mut self, store: PreferencesStore) -> Self {
        self.preferences = Some(store);
        self
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// URL fragment of the last render cycle.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn scheduler(&self) -> &LazyRenderScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut LazyRenderScheduler {
        &mut self.scheduler
    }

    pub fn range_selector(&self) -> VersionRangeSelector<'_> {
        VersionRangeSelector::new(&self.catalog)
    }

    /// Suggestions for the text currently typed into the data filter.
    pub fn suggestions(&self) -> Option<Suggestions> {
        suggest(&self.records, &self.view.data_filter)
    }

    pub fn share_url(&self, base: &str, test_name: &str) -> String {
        state::share_url(base, &self.view, test_name)
    }

    /// Initial load: restore state from `fragment` and render in one pass.
    ///
    /// Without a fragment, cached preferences seed the view.
    pub fn load(&mut self, fragment: &str) -> RenderOutcome {
        let mut fallback = ViewState::initial(&self.catalog, self.config.default_versions_displayed);
        if let Some(store) = &self.preferences {
            let prefs = store.load();
            if let Some(scheme) = prefs.last_scheme {
                fallback.scheme = scheme;
            }
            fallback.exclude_outliers = prefs.exclude_outliers;
        }

        let restored = state::restore(fragment, &self.catalog, &fallback);
        self.view = restored.view;
        let mut outcome = self.render(restored.anchor.as_deref());

        if let Some(anchor) = restored.anchor {
            if let Some(container) = self.scheduler.container_of(&anchor) {
                self.scheduler.scroll_to(container, 0.0);
                outcome.anchored = Some(container);
            }
        }
        outcome
    }

    /// Apply one event. Immediate changes re-render; debounced ones return
    /// `None` and re-render from [`Dashboard::next_debounced`].
    pub fn handle(&mut self, event: DashboardEvent) -> Result<Option<RenderOutcome>> {
        log::debug!("[Dashboard] Event: {:?}", event);
        match event {
            DashboardEvent::SetScheme(key) => self.view.set_scheme_key(&key)?,
            DashboardEvent::SetRangeStart(index) => {
                VersionRangeSelector::new(&self.catalog).set_start(&mut self.view.range, index)
            }
            DashboardEvent::SetRangeEnd(index) => {
                VersionRangeSelector::new(&self.catalog).set_end(&mut self.view.range, index)
            }
            DashboardEvent::SetToggle(toggle, value) => self.view.set_toggle(toggle, value),
            DashboardEvent::TestFilterInput(text) => {
                self.view.test_filter = text;
                self.debouncer.schedule();
                return Ok(None);
            }
            DashboardEvent::DataFilterInput(text) => {
                self.view.data_filter = text;
                self.debouncer.schedule();
                return Ok(None);
            }
            DashboardEvent::CommitDataFilter => {
                if !self.view.commit_data_filter() {
                    return Ok(None);
                }
                self.debouncer.cancel();
            }
            DashboardEvent::RemoveChip(index) => {
                if self.view.remove_chip(index).is_none() {
                    log::warn!("[Dashboard] No chip at index {}", index);
                    return Ok(None);
                }
            }
        }
        Ok(Some(self.recompute()))
    }

    /// Wait for the pending debounced edit, then re-render.
    pub async fn next_debounced(&mut self) -> RenderOutcome {
        self.debouncer.fired().await;
        self.recompute()
    }

    /// Scroll/resize notification: draw charts within the render margin.
    pub async fn on_scroll(&mut self, rects: &[(ContainerId, Rect)], viewport_height: f64) -> Result<usize> {
        let viewport = Viewport {
            height: viewport_height,
            margin: self.config.render_margin_px,
        };
        self.scheduler.poll(rects, viewport).await
    }

    pub fn has_pending_edit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Re-render with the current view, keeping the top chart in place.
    pub fn recompute(&mut self) -> RenderOutcome {
        let snapshot = self.scheduler.capture_anchor();
        let mut outcome = self.render(snapshot.as_ref().map(|s| s.test_name.as_str()));
        if let Some(snapshot) = snapshot {
            outcome.anchored = self.scheduler.restore_anchor(&snapshot);
        }
        outcome
    }

    fn render(&mut self, anchor: Option<&str>) -> RenderOutcome {
        self.fragment = state::capture(&self.view, anchor);
        self.save_preferences();

        let plan = build_render_plan(
            &self.records,
            &self.catalog,
            &self.view,
            self.stats.as_ref(),
            &self.descriptors,
            &self.config,
        );
        let no_data = plan.is_empty();
        let containers = self.scheduler.register_all(plan.charts().to_vec());
        self.plan = plan;

        RenderOutcome {
            containers,
            no_data,
            fragment: self.fragment.clone(),
            anchored: None,
        }
    }

    fn save_preferences(&self) {
        if let Some(store) = &self.preferences {
            let prefs = Preferences {
                last_scheme: Some(self.view.scheme),
                exclude_outliers: self.view.exclude_outliers,
            };
            if let Err(e) = store.save(&prefs) {
                log::warn!("[Dashboard] Could not save preferences: {}", e);
            }
        }
    }
}
