//! Categorical layout engine.
//!
//! Places each record of one test on a category axis and spreads co-located
//! points with a deterministic jitter so they do not overplot.

use crate::models::{Category, Record, SliceScheme};
use crate::stats::Extreme;
use crate::ticks::TickSet;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Total horizontal spread of points inside one category (tick spacing is 1.0).
pub const MAX_JITTER: f64 = 0.4;

/// Sorted, deduplicated category axis of one test.
#[derive(Debug, Clone, Default)]
pub struct CategoryAxis {
    categories: Vec<Category>,
    positions: HashMap<String, usize>,
}

impl CategoryAxis {
    pub fn build(scheme: SliceScheme, records: &[Record]) -> Self {
        let mut unique: IndexMap<String, Category> = IndexMap::new();
        for record in records {
            let category = scheme.category_of(record);
            unique.entry(category.key.clone()).or_insert(category);
        }
        let mut categories: Vec<Category> = unique.into_values().collect();
        categories.sort_by(|a, b| scheme.compare(a, b));
        let positions = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key.clone(), i))
            .collect();
        CategoryAxis {
            categories,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// One tick per category, used as the "full" label set.
    pub fn full_ticks(&self) -> TickSet {
        TickSet {
            values: (0..self.categories.len()).map(|i| i as f64).collect(),
            labels: self.categories.iter().map(|c| c.label.clone()).collect(),
        }
    }
}

/// Offset of the `rank`-th of `count` points sharing a category.
pub fn jitter_offset(rank: usize, count: usize, max_jitter: f64) -> f64 {
    if count <= 1 {
        return 0.0;
    }
    (rank as f64 / (count - 1) as f64 - 0.5) * max_jitter
}

/// One test's records with their derived positions for this render cycle.
#[derive(Debug, Clone)]
pub struct LaidOutTest {
    pub test_name: String,
    pub scheme: SliceScheme,
    pub axis: CategoryAxis,
    pub records: Vec<Record>,
    /// Category index plus jitter, parallel to `records`
    pub x: Vec<f64>,
    /// Min/max flags, parallel to `records`
    pub extremes: Vec<Extreme>,
}

/// A colored series: the dimension not used as the category axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Grouping identity (machine id or canonical version key)
    pub key: String,
    /// Legend name (machine id or version short name)
    pub name: String,
    /// Indices into [`LaidOutTest::records`]
    pub members: Vec<usize>,
}

/// Assign category positions and jitter to one test's records.
///
/// Records keep their incoming relative order; within a category the i-th record
/// gets the i-th jitter slot.
pub fn lay_out_test(
    test_name: &str,
    records: Vec<Record>,
    scheme: SliceScheme,
    max_jitter: f64,
) -> LaidOutTest {
    let axis = CategoryAxis::build(scheme, &records);

    let keys: Vec<String> = records.iter().map(|r| scheme.category_of(r).key).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in &keys {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let x = keys
        .iter()
        .map(|key| {
            let rank = seen.entry(key.as_str()).or_insert(0);
            let base = axis.position(key).unwrap_or(0) as f64;
            let offset = jitter_offset(*rank, counts[key.as_str()], max_jitter);
            *rank += 1;
            base + offset
        })
        .collect();

    let extremes = vec![Extreme::None; records.len()];
    LaidOutTest {
        test_name: test_name.to_string(),
        scheme,
        axis,
        records,
        x,
        extremes,
    }
}

impl LaidOutTest {
    /// Consume flags produced by the statistics collaborator.
    pub fn apply_extremes(&mut self, flags: Vec<Extreme>) {
        if flags.len() == self.records.len() {
            self.extremes = flags;
        } else {
            log::warn!(
                "[Layout] Ignoring {} min/max flags for {} records of '{}'",
                flags.len(),
                self.records.len(),
                self.test_name
            );
        }
    }

    /// Group records into colored series.
    ///
    /// Slicing by version colors by machine; any other slicing colors by version,
    /// keyed by the canonical version so equal short names never merge.
    pub fn series(&self) -> Vec<Series> {
        let mut groups: IndexMap<String, Series> = IndexMap::new();
        for (i, record) in self.records.iter().enumerate() {
            let (key, name) = match self.scheme {
                SliceScheme::ByVersion => (record.machine_id.clone(), record.machine_id.clone()),
                _ => (
                    record.version.compare_name.clone(),
                    record.version.short_name.clone(),
                ),
            };
            groups
                .entry(key.clone())
                .or_insert_with(|| Series {
                    key,
                    name,
                    members: Vec::new(),
                })
                .members
                .push(i);
        }
        groups.into_values().collect()
    }
}
