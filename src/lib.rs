//! Perf Dashboard
//!
//! Interactive benchmark dashboard engine: turns a set of timing records into
//! filtered, sliced and styled chart descriptors, draws them lazily as their
//! containers approach the viewport, keeps x-axis labels readable under zoom,
//! and round-trips the whole view through a shareable URL fragment.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Records, versions, slicing schemes
//! - **filter**: Free-text and chip filtering, filter suggestions
//! - **layout**: Category axes and deterministic jitter
//! - **ticks**: X-axis label thinning
//! - **chart**: Chart descriptors handed to the charting backend
//! - **interaction**: Machine continuity lines on point selection
//! - **state**: View state and its URL fragment encoding
//! - **scheduler**: Viewport-driven lazy rendering and scroll anchoring
//! - **orchestrator**: Event handling and the render pipeline
//! - **stats**: Statistical preprocessing seam
//! - **descriptors**: Test-suite descriptions and source links
//! - **config**: Tunables and cached preferences

// Core foundational modules
pub mod error;
pub mod models;

// Pure data pipeline
pub mod filter;
pub mod layout;
pub mod stats;
pub mod ticks;
pub mod descriptors;
pub mod chart;
pub mod interaction;

// View state, rendering and coordination
pub mod state;
pub mod scheduler;
pub mod orchestrator;

pub mod config;

// Background log writer behind the `log` facade
pub mod log_collector;

// Re-export the log crate for macro usage
pub use log;

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{ConfigError, DashboardError, Result};

pub use models::{
    Category, Record, RendererBackend, SliceScheme, Version, VersionCatalog, VersionRange,
};

pub use chart::{ChartDescriptor, Trace};
pub use config::DashboardConfig;
pub use log_collector::{flush_all_logs, init_logging, LogCollector, LogLine};
pub use orchestrator::{Dashboard, DashboardEvent, RenderOutcome, RenderPlan};
pub use scheduler::{ChartBackend, ContainerId, LazyRenderScheduler};
pub use state::{FilterChip, Toggle, ViewState};
pub use stats::{BasicStats, StatsProcessor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
    }

    #[test]
    fn test_default_scheme_reexport() {
        assert_eq!(SliceScheme::default(), SliceScheme::ByVersion);
    }
}
