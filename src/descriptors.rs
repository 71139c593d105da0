//! Test-suite descriptors: human readable descriptions and source links.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Description of one suite as published alongside the benchmark data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuiteDescriptor {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub tests: HashMap<String, String>,
}

/// Info attached to a test chart (tooltip + source link).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestInfo {
    pub suite_description: String,
    pub source_url: String,
    pub test_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TestSuiteDescriptors {
    suites: HashMap<String, SuiteDescriptor>,
}

impl TestSuiteDescriptors {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::DataLoad(format!("{}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn insert(&mut self, suite: impl Into<String>, descriptor: SuiteDescriptor) {
        self.suites.insert(suite.into(), descriptor);
    }

    /// Look up `"Suite::test"`.
    ///
    /// Suite keys are usually CamelCase (`TextureTests`) while suite names in
    /// results are `Texture_tests` or `Texture tests`, so the exact name is tried
    /// first, then its CamelCase form, then CamelCase + `Tests`.
    pub fn lookup(&self, qualified_test_name: &str) -> Option<TestInfo> {
        let mut parts = qualified_test_name.splitn(2, "::");
        let suite = parts.next()?;
        let test = parts.next().unwrap_or("");

        let camel = camel_case(suite);
        let descriptor = self
            .suites
            .get(suite)
            .or_else(|| self.suites.get(&camel))
            .or_else(|| self.suites.get(&format!("{}Tests", camel)))?;

        Some(TestInfo {
            suite_description: descriptor.description.clone(),
            source_url: descriptor.source_file.clone(),
            test_description: descriptor.tests.get(test).cloned(),
        })
    }
}

fn camel_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
