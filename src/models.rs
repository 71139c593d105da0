//! Core data types for Perf Dashboard.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

lazy_static! {
    static ref VERSION_COMPONENTS: Regex =
        Regex::new(r"(\d+)\.(\d+)\.(\d+)(?:-(\d+))?").expect("static version pattern");
}

/// Prefix carried by development builds; only those show their tag in tooltips.
pub const DEV_BUILD_PREFIX: &str = "xemu-0.0.0-";

/// Software version under test.
///
/// Equality and ordering use `compare_name` only, so two differently formatted
/// display names of the same build compare equal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Version {
    pub name: String,         // Display
    pub compare_name: String, // Canonical key
    pub short_name: String,   // Legend/search
    pub tag: Option<String>,  // Dev tag
}

impl Version {
    /// Build a version from its display name, deriving the canonical key.
    ///
    /// `xemu-0.8.5-12-gabcdef` becomes `00000.00008.00005.00012`; names without a
    /// `major.minor.patch` component keep the raw name as their key.
    pub fn from_display(name: &str) -> Self {
        match VERSION_COMPONENTS.captures(name) {
            Some(caps) => {
                let part = |i: usize| -> u64 {
                    caps.get(i)
                        .and_then(|m| m.as_str().parse().ok())
                        .unwrap_or(0)
                };
                let compare_name = format!(
                    "{:05}.{:05}.{:05}.{:05}",
                    part(1),
                    part(2),
                    part(3),
                    part(4)
                );
                let short_name = match caps.get(4) {
                    Some(commits) => format!(
                        "{}.{}.{}-{}",
                        part(1),
                        part(2),
                        part(3),
                        commits.as_str()
                    ),
                    None => format!("{}.{}.{}", part(1), part(2), part(3)),
                };
                Version {
                    name: name.to_string(),
                    compare_name,
                    short_name,
                    tag: None,
                }
            }
            None => Version {
                name: name.to_string(),
                compare_name: name.to_string(),
                short_name: name.to_string(),
                tag: None,
            },
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Tag suffix for tooltips; only development builds expose their tag.
    pub fn tooltip_tag(&self) -> Option<&str> {
        if self.name.starts_with(DEV_BUILD_PREFIX) {
            self.tag.as_deref().filter(|t| !t.is_empty())
        } else {
            None
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare_name == other.compare_name
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }
}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.compare_name.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};

        #[derive(Deserialize)]
        struct VersionFields {
            #[serde(alias = "version", alias = "display")]
            name: String,
            #[serde(default)]
            compare_name: Option<String>,
            #[serde(default)]
            short_name: Option<String>,
            #[serde(default)]
            tag: Option<String>,
        }

        struct VersionVisitor;

        impl<'de> Visitor<'de> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a version string or version object")
            }

            fn visit_str<E>(self, value: &str) -> Result<Version, E>
            where
                E: de::Error,
            {
                Ok(Version::from_display(value))
            }

            fn visit_map<A>(self, map: A) -> Result<Version, A::Error>
            where
                A: MapAccess<'de>,
            {
                let fields = VersionFields::deserialize(de::value::MapAccessDeserializer::new(map))?;
                let derived = Version::from_display(&fields.name);
                Ok(Version {
                    name: fields.name,
                    compare_name: fields
                        .compare_name
                        .filter(|c| !c.is_empty())
                        .unwrap_or(derived.compare_name),
                    short_name: fields
                        .short_name
                        .filter(|s| !s.is_empty())
                        .unwrap_or(derived.short_name),
                    tag: fields.tag,
                })
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}

/// Renderer backend the emulator ran with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RendererBackend {
    OpenGl,
    Vulkan,
    Other(String),
}

impl RendererBackend {
    pub fn as_str(&self) -> &str {
        match self {
            RendererBackend::OpenGl => "GL",
            RendererBackend::Vulkan => "VK",
            RendererBackend::Other(name) => name,
        }
    }
}

impl From<String> for RendererBackend {
    fn from(value: String) -> Self {
        match value.as_str() {
            "GL" => RendererBackend::OpenGl,
            "VK" => RendererBackend::Vulkan,
            _ => RendererBackend::Other(value),
        }
    }
}

impl From<RendererBackend> for String {
    fn from(value: RendererBackend) -> Self {
        value.as_str().to_string()
    }
}

impl Default for RendererBackend {
    fn default() -> Self {
        RendererBackend::Other(String::new())
    }
}

impl fmt::Display for RendererBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields folded into the lowercase search string, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    CpuManufacturer,
    GpuRenderer,
    GpuVendor,
    OsSystem,
    Renderer,
    ShortVersion,
    MachineId,
    Trend,
}

impl SearchField {
    pub const ALL: [SearchField; 8] = [
        SearchField::CpuManufacturer,
        SearchField::GpuRenderer,
        SearchField::GpuVendor,
        SearchField::OsSystem,
        SearchField::Renderer,
        SearchField::ShortVersion,
        SearchField::MachineId,
        SearchField::Trend,
    ];
}

/// One benchmark measurement.
///
/// Records are immutable once loaded; per-render derived values (jittered x,
/// min/max flags) live in [`crate::layout::LaidOutTest`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RecordWire")]
pub struct Record {
    pub test_name: String,
    pub machine_id: String,
    pub machine_id_with_renderer: String,
    pub version: Version,
    pub os_system: String,
    pub cpu_manufacturer: String,
    pub cpu_freq_max: String,
    pub gpu_renderer: String,
    pub gpu_vendor: String,
    pub renderer: RendererBackend,
    pub average_ms: f64,
    pub average_us: f64,
    pub error_plus_ms: f64,
    pub error_minus_ms: f64,
    /// NaN when the outlier-adjusted bound is unknown
    pub adjusted_min_ms: f64,
    /// NaN when the outlier-adjusted bound is unknown
    pub adjusted_max_ms: f64,
    pub iso: String,
    pub trend: String,
}

impl Default for Record {
    fn default() -> Self {
        Record {
            test_name: String::new(),
            machine_id: String::new(),
            machine_id_with_renderer: String::new(),
            version: Version::default(),
            os_system: String::new(),
            cpu_manufacturer: String::new(),
            cpu_freq_max: String::new(),
            gpu_renderer: String::new(),
            gpu_vendor: String::new(),
            renderer: RendererBackend::default(),
            average_ms: 0.0,
            average_us: 0.0,
            error_plus_ms: 0.0,
            error_minus_ms: 0.0,
            adjusted_min_ms: f64::NAN,
            adjusted_max_ms: f64::NAN,
            iso: String::new(),
            trend: String::new(),
        }
    }
}

impl Record {
    pub fn field(&self, field: SearchField) -> &str {
        match field {
            SearchField::CpuManufacturer => &self.cpu_manufacturer,
            SearchField::GpuRenderer => &self.gpu_renderer,
            SearchField::GpuVendor => &self.gpu_vendor,
            SearchField::OsSystem => &self.os_system,
            SearchField::Renderer => self.renderer.as_str(),
            SearchField::ShortVersion => &self.version.short_name,
            SearchField::MachineId => &self.machine_id,
            SearchField::Trend => &self.trend,
        }
    }
}

/// On-disk shape of a record as exported by the benchmark collector.
#[derive(Deserialize)]
struct RecordWire {
    test_name: String,
    machine_id: String,
    #[serde(default)]
    machine_id_with_renderer: Option<String>,
    #[serde(default)]
    xemu_version: Option<String>,
    #[serde(default)]
    xemu_version_obj: Option<Version>,
    #[serde(default)]
    xemu_tag: Option<String>,
    #[serde(default)]
    os_system: String,
    #[serde(default)]
    cpu_manufacturer: String,
    #[serde(default, deserialize_with = "string_or_number")]
    cpu_freq_max: String,
    #[serde(default)]
    gpu_renderer: String,
    #[serde(default)]
    gpu_vendor: String,
    #[serde(default)]
    renderer: RendererBackend,
    #[serde(default)]
    average_ms: f64,
    #[serde(default)]
    average_us: Option<f64>,
    #[serde(default)]
    error_plus_ms: f64,
    #[serde(default)]
    error_minus_ms: f64,
    #[serde(default)]
    adjusted_min_ms: Option<f64>,
    #[serde(default)]
    adjusted_max_ms: Option<f64>,
    #[serde(default)]
    iso: String,
    #[serde(default)]
    trend: String,
}

impl TryFrom<RecordWire> for Record {
    type Error = String;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        // The structured object wins; the display string is the fallback.
        let mut version = match (wire.xemu_version_obj, wire.xemu_version.as_deref()) {
            (Some(version), _) => version,
            (None, Some(name)) => Version::from_display(name),
            (None, None) => {
                return Err(format!(
                    "record {}/{} has neither xemu_version nor xemu_version_obj",
                    wire.test_name, wire.machine_id
                ))
            }
        };
        if version.tag.is_none() {
            version.tag = wire.xemu_tag;
        }
        let machine_id_with_renderer = wire
            .machine_id_with_renderer
            .unwrap_or_else(|| format!("{}:{}", wire.machine_id, wire.renderer));
        Ok(Record {
            test_name: wire.test_name,
            machine_id: wire.machine_id,
            machine_id_with_renderer,
            version,
            os_system: wire.os_system,
            cpu_manufacturer: wire.cpu_manufacturer,
            cpu_freq_max: wire.cpu_freq_max,
            gpu_renderer: wire.gpu_renderer,
            gpu_vendor: wire.gpu_vendor,
            renderer: wire.renderer,
            average_ms: wire.average_ms,
            average_us: wire.average_us.unwrap_or(wire.average_ms * 1000.0),
            error_plus_ms: wire.error_plus_ms,
            error_minus_ms: wire.error_minus_ms,
            adjusted_min_ms: wire.adjusted_min_ms.unwrap_or(f64::NAN),
            adjusted_max_ms: wire.adjusted_max_ms.unwrap_or(f64::NAN),
            iso: wire.iso,
            trend: wire.trend,
        })
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Locale-style string ordering: case-insensitive first, lowercase before
/// uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

/// Field used to slice records along the category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SliceScheme {
    ByCpu,
    ByGpu,
    ByGpuVendor,
    ByOs,
    ByRenderer,
    ByVersion,
}

impl SliceScheme {
    pub const ALL: [SliceScheme; 6] = [
        SliceScheme::ByCpu,
        SliceScheme::ByGpu,
        SliceScheme::ByGpuVendor,
        SliceScheme::ByOs,
        SliceScheme::ByRenderer,
        SliceScheme::ByVersion,
    ];

    /// Key used in URLs and preference files.
    pub fn key(&self) -> &'static str {
        match self {
            SliceScheme::ByCpu => "by-cpu",
            SliceScheme::ByGpu => "by-gpu",
            SliceScheme::ByGpuVendor => "by-gpu-vendor",
            SliceScheme::ByOs => "by-os",
            SliceScheme::ByRenderer => "by-renderer",
            SliceScheme::ByVersion => "by-version",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SliceScheme::ByCpu => "CPU",
            SliceScheme::ByGpu => "GPU",
            SliceScheme::ByGpuVendor => "GPU Vendor",
            SliceScheme::ByOs => "Operating System",
            SliceScheme::ByRenderer => "Renderer Backend",
            SliceScheme::ByVersion => "xemu Version",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        SliceScheme::ALL.iter().copied().find(|s| s.key() == key)
    }

    /// Options for a scheme selector widget: (key, title).
    pub fn options() -> Vec<(&'static str, &'static str)> {
        SliceScheme::ALL.iter().map(|s| (s.key(), s.title())).collect()
    }

    pub fn category_of(&self, record: &Record) -> Category {
        let label = match self {
            SliceScheme::ByCpu => &record.cpu_manufacturer,
            SliceScheme::ByGpu => &record.gpu_renderer,
            SliceScheme::ByGpuVendor => &record.gpu_vendor,
            SliceScheme::ByOs => &record.os_system,
            SliceScheme::ByRenderer => {
                let backend = record.renderer.as_str().to_string();
                return Category {
                    key: backend.clone(),
                    label: backend,
                };
            }
            SliceScheme::ByVersion => {
                return Category {
                    key: record.version.compare_name.clone(),
                    label: record.version.name.clone(),
                };
            }
        };
        Category {
            key: label.clone(),
            label: label.clone(),
        }
    }

    /// Ordering of categories along the axis.
    pub fn compare(&self, a: &Category, b: &Category) -> Ordering {
        match self {
            SliceScheme::ByVersion => a.key.cmp(&b.key),
            _ => locale_cmp(&a.label, &b.label),
        }
    }
}

impl Default for SliceScheme {
    fn default() -> Self {
        SliceScheme::ByVersion
    }
}

impl fmt::Display for SliceScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A value on the category axis: identity key plus tick label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    pub key: String,
    pub label: String,
}

/// Inclusive index range into a [`VersionCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub start: usize,
    pub end: usize,
}

impl VersionRange {
    /// Create a range; an end before the start is clamped to the start.
    pub fn new(start: usize, end: usize) -> Self {
        VersionRange {
            start,
            end: end.max(start),
        }
    }

    pub fn contains(&self, catalog: &VersionCatalog, version: &Version) -> bool {
        match (catalog.get(self.start), catalog.get(self.end)) {
            (Some(lo), Some(hi)) => lo <= version && version <= hi,
            _ => false,
        }
    }
}

/// Every distinct version in the data set, sorted ascending.
///
/// Built once per session and never re-sorted; range indices point into it.
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    versions: Vec<Version>,
}

impl VersionCatalog {
    pub fn from_records(records: &[Record]) -> Self {
        let mut unique: IndexMap<&str, &Version> = IndexMap::new();
        for record in records {
            unique.insert(record.version.compare_name.as_str(), &record.version);
        }
        let mut versions: Vec<Version> = unique.into_values().cloned().collect();
        versions.sort();
        VersionCatalog { versions }
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Version> {
        self.versions.get(index)
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn index_of(&self, version: &Version) -> Option<usize> {
        self.versions.binary_search(version).ok()
    }

    /// Options for a range widget: (index, display text).
    pub fn options(&self) -> Vec<(usize, String)> {
        self.versions
            .iter()
            .enumerate()
            .map(|(i, v)| (i, v.to_string()))
            .collect()
    }

    pub fn last_index(&self) -> usize {
        self.versions.len().saturating_sub(1)
    }

    /// The trailing window shown when no range has been chosen.
    pub fn default_range(&self, lookback: usize) -> VersionRange {
        let end = self.last_index();
        VersionRange::new(end.saturating_sub(lookback), end)
    }
}
