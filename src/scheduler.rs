//! Lazy render scheduler.
//!
//! Charts are registered with a placeholder container and a finished
//! descriptor. Drawing is deferred until the container comes within a margin of
//! the viewport; each container is drawn at most once per registration epoch.
//! Re-registering starts a new epoch, so containers from earlier epochs never
//! match a pending entry again.
//!
//! After a draw completes the scheduler removes the spinner, sets up dynamic
//! ticks and keeps the interaction state needed for point selection.

use crate::chart::{ChartDescriptor, Trace};
use crate::error::Result;
use crate::interaction::{apply_overlay, plan_overlay, PointSelection};
use crate::ticks::{AxisGeometry, RelayoutEvent, TickController, TickSet};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Opaque handle of one chart container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId {
    pub epoch: u64,
    pub index: usize,
}

/// Vertical extent of a container, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f64,
    /// Extra distance above and below the visible area
    pub margin: f64,
}

impl Viewport {
    pub fn intersects(&self, rect: &Rect) -> bool {
        rect.bottom >= -self.margin && rect.top <= self.height + self.margin
    }
}

/// Containers from `rects` that are within the viewport margin.
pub fn visible_containers(rects: &[(ContainerId, Rect)], viewport: Viewport) -> Vec<ContainerId> {
    rects
        .iter()
        .filter(|(_, rect)| viewport.intersects(rect))
        .map(|(id, _)| *id)
        .collect()
}

/// Drawing primitives of the external charting library.
///
/// Futures resolve once the library has finished the operation; post-draw work
/// is only attached after that.
pub trait ChartBackend: Send + Sync {
    fn draw<'a>(&'a self, container: ContainerId, chart: &'a ChartDescriptor) -> BoxFuture<'a, Result<()>>;

    fn remove_spinner(&self, container: ContainerId);

    /// Current x range and pixel width of a drawn chart's axis.
    fn axis_geometry(&self, container: ContainerId) -> Option<AxisGeometry>;

    fn set_ticks<'a>(&'a self, container: ContainerId, ticks: &'a TickSet) -> BoxFuture<'a, Result<()>>;

    fn delete_traces<'a>(&'a self, container: ContainerId, indices: &'a [usize]) -> BoxFuture<'a, Result<()>>;

    fn add_trace<'a>(&'a self, container: ContainerId, trace: &'a Trace) -> BoxFuture<'a, Result<()>>;

    /// Scroll so the container's top sits `top_offset` px below the viewport top.
    fn scroll_to(&self, container: ContainerId, top_offset: f64);

    /// Top of every live container relative to the viewport top.
    fn container_tops(&self) -> Vec<(ContainerId, f64)>;
}

/// Live state of a drawn chart.
#[derive(Debug, Clone)]
pub struct ChartSession {
    pub chart: ChartDescriptor,
    /// Traces as currently drawn, overlays included
    pub traces: Vec<Trace>,
    pub ticks: Option<TickController>,
}

/// Chart that stays visually stable across a re-render.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSnapshot {
    pub test_name: String,
    /// Distance of the chart's top from the viewport top before the re-render
    pub top_offset: f64,
    /// Chart order before the re-render
    pub previous_order: Vec<String>,
}

impl AnchorSnapshot {
    /// Pick the first chart whose top is inside the viewport, else the last chart.
    ///
    /// `charts` holds (test name, top relative to viewport) in page order.
    pub fn capture(charts: &[(String, f64)]) -> Option<Self> {
        let previous_order: Vec<String> = charts.iter().map(|(name, _)| name.clone()).collect();
        let (test_name, top_offset) = match charts.iter().find(|(_, top)| *top >= 0.0) {
            Some((name, top)) => (name.clone(), *top),
            None => (charts.last()?.0.clone(), 0.0),
        };
        Some(AnchorSnapshot {
            test_name,
            top_offset,
            previous_order,
        })
    }

    /// Test to scroll to in the new chart set.
    ///
    /// Falls back to the nearest preceding test of the old order that still
    /// exists; `None` when nothing before the anchor survived.
    pub fn resolve<'a>(&self, new_order: &'a [String]) -> Option<&'a str> {
        let present = |name: &str| new_order.iter().find(|n| n.as_str() == name);
        if let Some(name) = present(self.test_name.as_str()) {
            return Some(name.as_str());
        }
        let index = self.previous_order.iter().position(|n| *n == self.test_name)?;
        self.previous_order[..index]
            .iter()
            .rev()
            .find_map(|name| present(name.as_str()))
            .map(String::as_str)
    }
}

pub struct LazyRenderScheduler {
    backend: Arc<dyn ChartBackend>,
    epoch: u64,
    pending: IndexMap<ContainerId, ChartDescriptor>,
    sessions: HashMap<ContainerId, ChartSession>,
    order: Vec<(ContainerId, String)>,
    pixels_per_label: f64,
    tick_settle: Duration,
}

impl LazyRenderScheduler {
    pub fn new(backend: Arc<dyn ChartBackend>, pixels_per_label: f64, tick_settle: Duration) -> Self {
        LazyRenderScheduler {
            backend,
            epoch: 0,
            pending: IndexMap::new(),
            sessions: HashMap::new(),
            order: Vec::new(),
            pixels_per_label,
            tick_settle,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Discard every previous container and register a new chart set.
    pub fn register_all(&mut self, charts: Vec<ChartDescriptor>) -> Vec<ContainerId> {
        self.epoch += 1;
        self.pending.clear();
        self.sessions.clear();
        self.order.clear();

        let epoch = self.epoch;
        let ids: Vec<ContainerId> = charts
            .into_iter()
            .enumerate()
            .map(|(index, chart)| {
                let id = ContainerId { epoch, index };
                self.order.push((id, chart.name.clone()));
                self.pending.insert(id, chart);
                id
            })
            .collect();

        log::debug!("[Scheduler] Epoch {}: {} charts pending", epoch, ids.len());
        ids
    }

    pub fn is_pending(&self, container: ContainerId) -> bool {
        self.pending.contains_key(&container)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn session(&self, container: ContainerId) -> Option<&ChartSession> {
        self.sessions.get(&container)
    }

    /// Test names of the current containers, in page order.
    pub fn order(&self) -> Vec<String> {
        self.order.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn container_of(&self, test_name: &str) -> Option<ContainerId> {
        self.order
            .iter()
            .find(|(_, name)| name == test_name)
            .map(|(id, _)| *id)
    }

    /// Draw every pending chart among `containers`. Returns how many were drawn.
    pub async fn on_visible(&mut self, containers: &[ContainerId]) -> Result<usize> {
        let mut drawn = 0;
        for &id in containers {
            // Evict before drawing so a second notification cannot draw twice.
            let chart = match self.pending.shift_remove(&id) {
                Some(chart) => chart,
                None => continue,
            };
            self.backend.draw(id, &chart).await?;
            self.backend.remove_spinner(id);
            drawn += 1;

            let ticks = chart
                .dynamic_ticks
                .clone()
                .map(|full| TickController::new(full, self.pixels_per_label));
            let traces = chart.traces.clone();
            self.sessions.insert(id, ChartSession { chart, traces, ticks });
            self.refresh_ticks(id).await?;
        }
        Ok(drawn)
    }

    /// Visibility poll: draw whatever came within the viewport margin.
    pub async fn poll(&mut self, rects: &[(ContainerId, Rect)], viewport: Viewport) -> Result<usize> {
        let visible = visible_containers(rects, viewport);
        self.on_visible(&visible).await
    }

    /// Recompute the x labels of a drawn chart from its current axis geometry.
    pub async fn refresh_ticks(&mut self, container: ContainerId) -> Result<bool> {
        let backend = Arc::clone(&self.backend);
        let controller = match self
            .sessions
            .get_mut(&container)
            .and_then(|s| s.ticks.as_mut())
        {
            Some(controller) => controller,
            None => return Ok(false),
        };

        if controller.full().len() < 2 {
            let full = controller.full().clone();
            backend.set_ticks(container, &full).await?;
            return Ok(true);
        }

        let geometry = match backend.axis_geometry(container) {
            Some(geometry) => geometry,
            None => return Ok(false),
        };
        let ticks = match controller.begin(geometry) {
            Some(ticks) => ticks,
            None => return Ok(false),
        };
        let result = backend.set_ticks(container, &ticks).await;
        controller.finish();
        result.map(|_| true)
    }

    /// Zoom/pan notification: wait for the layout to settle, then re-thin labels.
    pub async fn on_relayout(&mut self, container: ContainerId, event: RelayoutEvent) -> Result<bool> {
        if !event.is_zoom_or_pan() || !self.sessions.contains_key(&container) {
            return Ok(false);
        }
        tokio::time::sleep(self.tick_settle).await;
        self.refresh_ticks(container).await
    }

    /// Replace the continuity overlay after a point selection.
    pub async fn on_point_selected(
        &mut self,
        container: ContainerId,
        selection: PointSelection,
    ) -> Result<bool> {
        let backend = Arc::clone(&self.backend);
        let session = match self.sessions.get_mut(&container) {
            Some(session) => session,
            None => return Ok(false),
        };
        let update = match plan_overlay(
            &session.traces,
            session.chart.click_context.as_ref(),
            &selection,
        ) {
            Some(update) => update,
            None => return Ok(false),
        };

        if !update.remove.is_empty() {
            backend.delete_traces(container, &update.remove).await?;
        }
        backend.add_trace(container, &update.add).await?;
        apply_overlay(&mut session.traces, &update);
        Ok(true)
    }

    pub fn scroll_to(&self, container: ContainerId, top_offset: f64) {
        self.backend.scroll_to(container, top_offset);
    }

    /// Snapshot the chart nearest the top of the viewport before a re-render.
    pub fn capture_anchor(&self) -> Option<AnchorSnapshot> {
        let tops: HashMap<ContainerId, f64> = self.backend.container_tops().into_iter().collect();
        let charts: Vec<(String, f64)> = self
            .order
            .iter()
            .filter_map(|(id, name)| tops.get(id).map(|top| (name.clone(), *top)))
            .collect();
        AnchorSnapshot::capture(&charts)
    }

    /// Scroll the anchored test (or its fallback) back to its old offset.
    pub fn restore_anchor(&self, snapshot: &AnchorSnapshot) -> Option<ContainerId> {
        let order = self.order();
        let target = snapshot.resolve(&order)?;
        let container = self.container_of(target)?;
        log::debug!(
            "[Scheduler] Re-anchoring at '{}' ({} px)",
            target,
            snapshot.top_offset
        );
        self.backend.scroll_to(container, snapshot.top_offset);
        Some(container)
    }
}
