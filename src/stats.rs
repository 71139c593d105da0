//! Statistical preprocessing seam.
//!
//! Aggregation and outlier handling belong to an external collaborator; the
//! dashboard only relies on the [`StatsProcessor`] contract. [`BasicStats`] is a
//! small default used by the headless binary and tests.

use crate::models::Record;
use serde::Serialize;

/// Min/max highlight flag attached to a record for one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extreme {
    #[default]
    None,
    Min,
    Max,
}

/// Contract of the statistical preprocessing collaborator.
pub trait StatsProcessor: Send + Sync {
    /// Derive/filter aggregate fields. Output records must carry every field of [`Record`].
    fn process(&self, records: Vec<Record>, exclude_outliers: bool) -> Vec<Record>;

    /// Flag the minimal and maximal record(s) of one test, parallel to `test_records`.
    fn min_max(&self, test_records: &[Record]) -> Vec<Extreme>;
}

/// Default collaborator: bounds-based outlier exclusion and whole-test min/max.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStats;

impl BasicStats {
    fn within_adjusted_bounds(record: &Record) -> bool {
        let lo = record.adjusted_min_ms;
        let hi = record.adjusted_max_ms;
        (lo.is_nan() || record.average_ms >= lo) && (hi.is_nan() || record.average_ms <= hi)
    }
}

impl StatsProcessor for BasicStats {
    fn process(&self, records: Vec<Record>, exclude_outliers: bool) -> Vec<Record> {
        let before = records.len();
        let kept: Vec<Record> = records
            .into_iter()
            .filter(|r| r.average_ms.is_finite())
            .filter(|r| !exclude_outliers || Self::within_adjusted_bounds(r))
            .collect();
        if kept.len() != before {
            log::debug!("[Stats] Dropped {} records during preprocessing", before - kept.len());
        }
        kept
    }

    fn min_max(&self, test_records: &[Record]) -> Vec<Extreme> {
        let mut flags = vec![Extreme::None; test_records.len()];
        let values = test_records.iter().map(|r| r.average_ms);
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        if test_records.len() < 2 || !(min < max) {
            return flags;
        }
        for (flag, record) in flags.iter_mut().zip(test_records) {
            if record.average_ms == min {
                *flag = Extreme::Min;
            } else if record.average_ms == max {
                *flag = Extreme::Max;
            }
        }
        flags
    }
}
