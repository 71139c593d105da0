//! Integration tests for configuration, preferences and suite descriptors
//!
//! Covers:
//! - loader: TOML parsing, path validation, defaults
//! - preferences: graceful fallback on corrupt files
//! - descriptors: loading from JSON and attaching info to charts
//! - render margin: config flows into lazy drawing

mod common;

use common::{record, RecordingBackend};
use perf_dashboard::config::loader::{load_config_from_file, load_or_default};
use perf_dashboard::config::preferences::{Preferences, PreferencesStore};
use perf_dashboard::descriptors::TestSuiteDescriptors;
use perf_dashboard::error::ConfigError;
use perf_dashboard::scheduler::Rect;
use perf_dashboard::{BasicStats, Dashboard, DashboardConfig};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dashboard.toml");
    fs::write(&path, "text_debounce_ms = 250\nmax_jitter = 0.2\n").unwrap();

    let config = load_config_from_file(&path).unwrap();
    assert_eq!(config.text_debounce(), Duration::from_millis(250));
    assert_eq!(config.max_jitter, 0.2);
    assert_eq!(config.render_margin_px, 500.0);
    assert_eq!(config.default_versions_displayed, 30);
}

#[test]
fn test_out_of_range_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dashboard.toml");
    fs::write(&path, "pixels_per_label = 0.0\n").unwrap();

    let err = load_config_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed(_)));
}

#[test]
fn test_loader_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        load_config_from_file(&missing),
        Err(ConfigError::FileNotFound(_))
    ));

    let wrong_ext = dir.path().join("dashboard.json");
    fs::write(&wrong_ext, "{}").unwrap();
    assert!(matches!(
        load_config_from_file(&wrong_ext),
        Err(ConfigError::ValidationFailed(_))
    ));

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "text_debounce_ms = \"soon\"").unwrap();
    assert!(matches!(
        load_config_from_file(&broken),
        Err(ConfigError::InvalidToml(_))
    ));

    assert_eq!(load_or_default(None).unwrap(), DashboardConfig::default());
}

#[test]
fn test_corrupt_preferences_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.json");
    fs::write(&path, "{ not json").unwrap();

    let store = PreferencesStore::new(&path);
    assert_eq!(store.load(), Preferences::default());

    // Saving repairs the file.
    let prefs = Preferences {
        last_scheme: Some(perf_dashboard::SliceScheme::ByOs),
        exclude_outliers: true,
    };
    store.save(&prefs).unwrap();
    assert_eq!(store.load(), prefs);
}

#[test]
fn test_descriptors_attach_to_matching_charts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test_suite_descriptors.json");
    fs::write(
        &path,
        r#"{
            "TextureTests": {
                "description": "Texture upload paths",
                "source_file": "https://example.org/tests/texture.c",
                "tests": { "upload_1024": "Upload a 1024x1024 texture" }
            }
        }"#,
    )
    .unwrap();
    let descriptors = TestSuiteDescriptors::load(&path).unwrap();

    let mut dashboard = Dashboard::new(
        vec![
            record("Texture_tests::upload_1024", "m1", "0.1.0", "Linux", 3.0),
            record("Audio::mix", "m1", "0.1.0", "Linux", 1.0),
        ],
        descriptors,
        DashboardConfig::default(),
        Arc::new(RecordingBackend::default()),
        Arc::new(BasicStats),
    );
    dashboard.load("");

    let charts = dashboard.plan().charts();
    let info = charts[1].info.as_ref().unwrap();
    assert_eq!(info.suite_description, "Texture upload paths");
    assert_eq!(info.source_url, "https://example.org/tests/texture.c");
    assert_eq!(info.test_description.as_deref(), Some("Upload a 1024x1024 texture"));
    assert!(charts[2].info.is_none());
}

#[test]
fn test_missing_descriptor_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let result = TestSuiteDescriptors::load(&dir.path().join("absent.json"));
    assert!(matches!(
        result,
        Err(perf_dashboard::DashboardError::DataLoad(_))
    ));
}

#[tokio::test]
async fn test_render_margin_comes_from_config() {
    let backend = Arc::new(RecordingBackend::default());
    let config = DashboardConfig {
        render_margin_px: 100.0,
        ..Default::default()
    };
    let mut dashboard = Dashboard::new(
        vec![
            record("A", "m1", "0.1.0", "Linux", 1.0),
            record("B", "m1", "0.1.0", "Linux", 1.0),
        ],
        TestSuiteDescriptors::default(),
        config,
        backend.clone(),
        Arc::new(BasicStats),
    );
    let outcome = dashboard.load("");
    let ids = outcome.containers;

    let rects = vec![
        (ids[0], Rect { top: 0.0, bottom: 400.0 }),
        (ids[1], Rect { top: 850.0, bottom: 1250.0 }),
        (ids[2], Rect { top: 1300.0, bottom: 1700.0 }),
    ];
    assert_eq!(dashboard.on_scroll(&rects, 800.0).await.unwrap(), 2);
    assert_eq!(backend.draw_count(), 2);
    assert!(dashboard.scheduler().is_pending(ids[2]));
}
