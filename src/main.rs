use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use futures::future::{BoxFuture, FutureExt};

use perf_dashboard::chart::{ChartDescriptor, Trace};
use perf_dashboard::config::loader::load_or_default;
use perf_dashboard::config::preferences::PreferencesStore;
use perf_dashboard::descriptors::TestSuiteDescriptors;
use perf_dashboard::scheduler::{ChartBackend, ContainerId};
use perf_dashboard::ticks::{AxisGeometry, TickSet};
use perf_dashboard::{BasicStats, Dashboard, Record};

/// Build the dashboard's chart descriptors for a data set and view.
#[derive(Parser, Debug)]
#[command(name = "perf-dashboard", version, about)]
struct Args {
    /// Benchmark records (JSON array)
    #[arg(long)]
    records: PathBuf,

    /// Test-suite descriptors (JSON)
    #[arg(long)]
    descriptors: Option<PathBuf>,

    /// View state as a URL fragment, e.g. "view=by-os&hmm=true"
    #[arg(long, default_value = "")]
    fragment: String,

    /// Dashboard tunables (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the render plan here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

/// Backend for runs without a display: nothing is drawn.
struct HeadlessBackend;

impl ChartBackend for HeadlessBackend {
    fn draw<'a>(&'a self, _container: ContainerId, _chart: &'a ChartDescriptor) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn remove_spinner(&self, _container: ContainerId) {}

    fn axis_geometry(&self, _container: ContainerId) -> Option<AxisGeometry> {
        None
    }

    fn set_ticks<'a>(&'a self, _container: ContainerId, _ticks: &'a TickSet) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn delete_traces<'a>(&'a self, _container: ContainerId, _indices: &'a [usize]) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn add_trace<'a>(&'a self, _container: ContainerId, _trace: &'a Trace) -> BoxFuture<'a, perf_dashboard::Result<()>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn scroll_to(&self, _container: ContainerId, _top_offset: f64) {}

    fn container_tops(&self) -> Vec<(ContainerId, f64)> {
        Vec::new()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    perf_dashboard::init_logging(level, args.log_file.as_deref())
        .context("Failed to initialize logging")?;

    let config = load_or_default(args.config.as_deref()).context("Failed to load config")?;

    let content = std::fs::read_to_string(&args.records)
        .with_context(|| format!("Failed to read {}", args.records.display()))?;
    let records: Vec<Record> =
        serde_json::from_str(&content).context("Benchmark records are malformed")?;

    let descriptors = match &args.descriptors {
        Some(path) => TestSuiteDescriptors::load(path)
            .with_context(|| format!("Failed to load descriptors from {}", path.display()))?,
        None => TestSuiteDescriptors::default(),
    };

    let mut dashboard = Dashboard::new(
        records,
        descriptors,
        config,
        Arc::new(HeadlessBackend),
        Arc::new(BasicStats),
    );
    match PreferencesStore::user_default() {
        Ok(store) => dashboard = dashboard.with_preferences(store),
        Err(e) => log::warn!("Preferences disabled: {}", e),
    }
    let outcome = dashboard.load(&args.fragment);
    if outcome.no_data {
        log::warn!("No data available to display");
    }

    let plan = serde_json::to_string_pretty(dashboard.plan())?;
    write_outputs(
        &plan,
        dashboard.fragment(),
        args.out.as_deref(),
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )?;
    if let Some(path) = &args.out {
        log::info!(
            "Wrote {} charts to {}",
            outcome.containers.len(),
            path.display()
        );
    }

    perf_dashboard::flush_all_logs();
    Ok(())
}

/// Write the plan to `out` (or stdout) and the fragment line where it cannot
/// corrupt the JSON: stdout when the plan went to a file, stderr otherwise.
fn write_outputs(
    plan: &str,
    fragment: &str,
    out: Option<&std::path::Path>,
    stdout: &mut impl std::io::Write,
    stderr: &mut impl std::io::Write,
) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, plan)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(stdout, "#{}", fragment)?;
        }
        None => {
            writeln!(stdout, "{}", plan)?;
            writeln!(stderr, "#{}", fragment)?;
        }
    }
    Ok(())
}
