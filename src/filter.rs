//! Data filter engine.
//!
//! Every record is reduced to one lowercase search string built from a fixed,
//! ordered set of fields. Free text and chip terms are plain case-insensitive
//! substring tests against that string; there is no tokenization.

use crate::models::{Record, SearchField};
use regex::RegexBuilder;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Marker that negates a free-text term or chip.
pub const NEGATION_PREFIX: char = '!';

/// Normalized predicate inputs: lowercase free text plus split chip terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTerms {
    pub free_text: String,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl FilterTerms {
    /// Normalize a free-text input and a list of chip texts.
    ///
    /// Chips starting with `!` become negative terms; everything is lowercased.
    pub fn from_parts<'a, I>(free_text: &str, chips: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut terms = FilterTerms {
            free_text: free_text.trim().to_lowercase(),
            ..Default::default()
        };
        for chip in chips {
            let chip = chip.to_lowercase();
            match chip.strip_prefix(NEGATION_PREFIX) {
                Some(rest) => terms.negative.push(rest.to_string()),
                None => terms.positive.push(chip),
            }
        }
        terms
    }

    /// True when no predicate is active and filtering is the identity.
    pub fn is_empty(&self) -> bool {
        self.free_text.is_empty() && self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Lowercase, space-joined concatenation of the searchable fields.
pub fn search_string(record: &Record) -> String {
    SearchField::ALL
        .iter()
        .map(|field| record.field(*field))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Evaluate the predicate against an already-built search string.
pub fn matches_search_string(
    searchable: &str,
    free_text: &str,
    positive: &[String],
    negative: &[String],
) -> bool {
    if !free_text.is_empty() {
        match free_text.strip_prefix(NEGATION_PREFIX) {
            Some(rest) => {
                // A bare "!" is a no-op.
                if !rest.is_empty() && searchable.contains(rest) {
                    return false;
                }
            }
            None => {
                if !searchable.contains(free_text) {
                    return false;
                }
            }
        }
    }

    positive.iter().all(|term| searchable.contains(term.as_str()))
        && !negative.iter().any(|term| searchable.contains(term.as_str()))
}

/// Pure predicate: does `record` survive the given terms?
pub fn matches(record: &Record, terms: &FilterTerms) -> bool {
    matches_search_string(
        &search_string(record),
        &terms.free_text,
        &terms.positive,
        &terms.negative,
    )
}

/// Produce the reduced record sequence; the input is left untouched.
pub fn apply_data_filters(records: &[Record], terms: &FilterTerms) -> Vec<Record> {
    if terms.is_empty() {
        return records.to_vec();
    }
    let kept: Vec<Record> = records
        .iter()
        .filter(|record| matches(record, terms))
        .cloned()
        .collect();
    log::debug!(
        "[Filter] {} of {} records kept (text='{}', +{}, -{})",
        kept.len(),
        records.len(),
        terms.free_text,
        terms.positive.len(),
        terms.negative.len()
    );
    kept
}

/// Part of a suggestion label, flagged when it matched the typed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub matching: bool,
}

/// One field value containing the typed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub value: String,
    /// Number of distinct machines reporting this value
    pub machine_count: usize,
    pub segments: Vec<Segment>,
}

/// Suggestion overlay contents for the data filter input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub negated: bool,
    pub items: Vec<Suggestion>,
}

/// Compute suggestions for the raw data-filter input.
///
/// Returns `None` when the overlay should be hidden (nothing typed or nothing matches).
pub fn suggest(records: &[Record], raw_text: &str) -> Option<Suggestions> {
    let raw = raw_text.trim().to_lowercase();
    let negated = raw.starts_with(NEGATION_PREFIX);
    let needle = (if negated { &raw[1..] } else { raw.as_str() }).trim();
    if needle.is_empty() {
        return None;
    }

    let mut machines_by_value: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for record in records {
        for field in SearchField::ALL {
            let value = record.field(field);
            if value.to_lowercase().contains(needle) {
                machines_by_value
                    .entry(value)
                    .or_default()
                    .insert(record.machine_id.as_str());
            }
        }
    }

    if machines_by_value.is_empty() {
        return None;
    }

    let items = machines_by_value
        .into_iter()
        .map(|(value, machines)| Suggestion {
            value: value.to_string(),
            machine_count: machines.len(),
            segments: highlight_segments(value, needle),
        })
        .collect();

    Some(Suggestions { negated, items })
}

/// Split `full` into runs that do or do not match `needle`, case-insensitively.
pub fn highlight_segments(full: &str, needle: &str) -> Vec<Segment> {
    if needle.is_empty() {
        return vec![Segment {
            text: full.to_string(),
            matching: false,
        }];
    }

    let pattern = match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(p) => p,
        Err(e) => {
            log::warn!("[Filter] Could not build highlight pattern for '{}': {}", needle, e);
            return vec![Segment {
                text: full.to_string(),
                matching: false,
            }];
        }
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(full) {
        if m.start() > last {
            segments.push(Segment {
                text: full[last..m.start()].to_string(),
                matching: false,
            });
        }
        segments.push(Segment {
            text: m.as_str().to_string(),
            matching: true,
        });
        last = m.end();
    }
    if last < full.len() {
        segments.push(Segment {
            text: full[last..].to_string(),
            matching: false,
        });
    }
    segments
}
