//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use perf_dashboard::chart::{ChartDescriptor, Trace};
use perf_dashboard::scheduler::{ChartBackend, ContainerId};
use perf_dashboard::ticks::{AxisGeometry, TickSet};
use perf_dashboard::{Record, Version};
use std::sync::Mutex;

/// Backend that records every call instead of drawing.
#[derive(Default)]
pub struct RecordingBackend {
    pub draws: Mutex<Vec<ContainerId>>,
    pub spinners_removed: Mutex<Vec<ContainerId>>,
    pub ticks: Mutex<Vec<(ContainerId, TickSet)>>,
    pub deleted: Mutex<Vec<(ContainerId, Vec<usize>)>>,
    pub added: Mutex<Vec<(ContainerId, Trace)>>,
    pub scrolls: Mutex<Vec<(ContainerId, f64)>>,
    pub tops: Mutex<Vec<(ContainerId, f64)>>,
    pub geometry: Mutex<Option<AxisGeometry>>,
}

impl RecordingBackend {
    pub fn draw_count(&self) -> usize {
        self.draws.lock().unwrap().len()
    }

    pub fn set_tops(&self, tops: Vec<(ContainerId, f64)>) {
        *self.tops.lock().unwrap() = tops;
    }

    pub fn set_geometry(&self, range: (f64, f64), width_px: f64) {
        *self.geometry.lock().unwrap() = Some(AxisGeometry { range, width_px });
    }

    pub fn last_scroll(&self) -> Option<(ContainerId, f64)> {
        self.scrolls.lock().unwrap().last().copied()
    }
}

impl ChartBackend for RecordingBackend {
    fn draw<'a>(&'a self, container: ContainerId, _chart: &'a ChartDescriptor) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        self.draws.lock().unwrap().push(container);
        async { Ok(()) }.boxed()
    }

    fn remove_spinner(&self, container: ContainerId) {
        self.spinners_removed.lock().unwrap().push(container);
    }

    fn axis_geometry(&self, _container: ContainerId) -> Option<AxisGeometry> {
        *self.geometry.lock().unwrap()
    }

    fn set_ticks<'a>(&'a self, container: ContainerId, ticks: &'a TickSet) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        self.ticks.lock().unwrap().push((container, ticks.clone()));
        async { Ok(()) }.boxed()
    }

    fn delete_traces<'a>(&'a self, container: ContainerId, indices: &'a [usize]) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        self.deleted.lock().unwrap().push((container, indices.to_vec()));
        async { Ok(()) }.boxed()
    }

    fn add_trace<'a>(&'a self, container: ContainerId, trace: &'a Trace) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        self.added.lock().unwrap().push((container, trace.clone()));
        async { Ok(()) }.boxed()
    }

    fn scroll_to(&self, container: ContainerId, top_offset: f64) {
        self.scrolls.lock().unwrap().push((container, top_offset));
    }

    fn container_tops(&self) -> Vec<(ContainerId, f64)> {
        self.tops.lock().unwrap().clone()
    }
}

/// A record with the fields the filters and schemes look at.
pub fn record(test: &str, machine: &str, version: &str, os: &str, ms: f64) -> Record {
    Record {
        test_name: test.to_string(),
        machine_id: machine.to_string(),
        machine_id_with_renderer: format!("{}-vulkan", machine),
        version: Version::from_display(version),
        os_system: os.to_string(),
        cpu_manufacturer: "AMD".to_string(),
        gpu_renderer: "Radeon".to_string(),
        gpu_vendor: "AMD".to_string(),
        average_ms: ms,
        average_us: ms * 1000.0,
        ..Default::default()
    }
}
