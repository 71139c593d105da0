//! Interactive view state.
//!
//! [`ViewState`] is the single source of truth for everything the user can
//! change; widgets are thin adapters that read and write it. The serializer
//! submodule maps it to and from the URL fragment.

pub mod serializer;

pub use serializer::{capture, restore, share_url, RestoredState};

use crate::error::{DashboardError, Result};
use crate::filter::{FilterTerms, NEGATION_PREFIX};
use crate::models::{SliceScheme, VersionCatalog, VersionRange};
use serde::{Deserialize, Serialize};

/// A committed data-filter term, kept verbatim (including a leading `!`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterChip {
    pub text: String,
}

impl FilterChip {
    pub fn new(text: impl Into<String>) -> Self {
        FilterChip { text: text.into() }
    }

    /// A chip from user or URL text; blank text and a bare `!` carry no term.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || text.strip_prefix(NEGATION_PREFIX) == Some("") {
            return None;
        }
        Some(FilterChip::new(text))
    }

    pub fn is_negated(&self) -> bool {
        self.text.starts_with(NEGATION_PREFIX)
    }
}

/// Boolean view options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    ExcludeOutliers,
    ShowErrorBars,
    HighlightMinMax,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub scheme: SliceScheme,
    pub range: VersionRange,
    pub exclude_outliers: bool,
    pub show_error_bars: bool,
    pub highlight_min_max: bool,
    pub test_filter: String,
    pub data_filter: String,
    pub chips: Vec<FilterChip>,
}

impl ViewState {
    /// Default state for a data set: default scheme, trailing version window.
    pub fn initial(catalog: &VersionCatalog, versions_displayed: usize) -> Self {
        ViewState {
            scheme: SliceScheme::default(),
            range: catalog.default_range(versions_displayed),
            exclude_outliers: false,
            show_error_bars: false,
            highlight_min_max: false,
            test_filter: String::new(),
            data_filter: String::new(),
            chips: Vec::new(),
        }
    }

    /// Select a scheme by key; unknown keys are a caller defect.
    pub fn set_scheme_key(&mut self, key: &str) -> Result<()> {
        self.scheme = SliceScheme::from_key(key)
            .ok_or_else(|| DashboardError::UnresolvedScheme(key.to_string()))?;
        Ok(())
    }

    pub fn set_toggle(&mut self, toggle: Toggle, value: bool) {
        match toggle {
            Toggle::ExcludeOutliers => self.exclude_outliers = value,
            Toggle::ShowErrorBars => self.show_error_bars = value,
            Toggle::HighlightMinMax => self.highlight_min_max = value,
        }
    }

    /// Turn the pending data-filter text into a chip.
    ///
    /// The input is always cleared. Returns `false` when the trimmed text was
    /// empty or a bare `!`, in which case no chip is added.
    pub fn commit_data_filter(&mut self) -> bool {
        let text = std::mem::take(&mut self.data_filter);
        match FilterChip::parse(&text) {
            Some(chip) => {
                self.chips.push(chip);
                true
            }
            None => false,
        }
    }

    pub fn remove_chip(&mut self, index: usize) -> Option<FilterChip> {
        if index < self.chips.len() {
            Some(self.chips.remove(index))
        } else {
            None
        }
    }

    pub fn filter_terms(&self) -> FilterTerms {
        FilterTerms::from_parts(
            &self.data_filter,
            self.chips.iter().map(|chip| chip.text.as_str()),
        )
    }

    /// Whether any data filter text or chip narrows the records.
    pub fn has_data_filters(&self) -> bool {
        !self.data_filter.trim().is_empty() || !self.chips.is_empty()
    }

    /// The summary chart only makes sense for the unfiltered data set.
    pub fn shows_summary(&self) -> bool {
        self.test_filter.trim().is_empty() && !self.has_data_filters()
    }
}

/// Paired start/end selectors over the version list.
///
/// The end selector only offers versions at or after the start.
#[derive(Debug, Clone, Copy)]
pub struct VersionRangeSelector<'a> {
    catalog: &'a VersionCatalog,
}

impl<'a> VersionRangeSelector<'a> {
    pub fn new(catalog: &'a VersionCatalog) -> Self {
        VersionRangeSelector { catalog }
    }

    pub fn start_options(&self) -> Vec<(usize, String)> {
        self.catalog.options()
    }

    pub fn end_options(&self, range: &VersionRange) -> Vec<(usize, String)> {
        self.catalog
            .options()
            .into_iter()
            .filter(|(index, _)| *index >= range.start)
            .collect()
    }

    /// Move the start, dragging the end along when it would fall behind.
    pub fn set_start(&self, range: &mut VersionRange, start: usize) {
        let start = start.min(self.catalog.last_index());
        *range = VersionRange::new(start, range.end);
    }

    pub fn set_end(&self, range: &mut VersionRange, end: usize) {
        let end = end.min(self.catalog.last_index());
        *range = VersionRange::new(range.start, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, Version};

    fn catalog(n: usize) -> VersionCatalog {
        let records: Vec<Record> = (0..n)
            .map(|i| Record {
                version: Version::from_display(&format!("0.{}.0", i)),
                ..Default::default()
            })
            .collect();
        VersionCatalog::from_records(&records)
    }

    #[test]
    fn test_commit_ignores_bare_negation() {
        let mut view = ViewState::initial(&catalog(1), 30);
        view.data_filter = " ! ".to_string();
        assert!(!view.commit_data_filter());
        assert!(view.chips.is_empty());
        assert!(view.data_filter.is_empty());

        view.data_filter = "  !Linux ".to_string();
        assert!(view.commit_data_filter());
        assert_eq!(view.chips, vec![FilterChip::new("!Linux")]);
        assert!(view.chips[0].is_negated());
    }

    #[test]
    fn test_unknown_scheme_key_is_an_error() {
        let mut view = ViewState::initial(&catalog(1), 30);
        assert!(view.set_scheme_key("by-os").is_ok());
        assert_eq!(view.scheme, SliceScheme::ByOs);
        assert!(matches!(
            view.set_scheme_key("by-weather"),
            Err(DashboardError::UnresolvedScheme(_))
        ));
        assert_eq!(view.scheme, SliceScheme::ByOs);
    }

    #[test]
    fn test_summary_hidden_by_any_filter() {
        let mut view = ViewState::initial(&catalog(1), 30);
        assert!(view.shows_summary());
        view.chips.push(FilterChip::new("gl"));
        assert!(!view.shows_summary());
        view.chips.clear();
        view.test_filter = "texture".to_string();
        assert!(!view.shows_summary());
    }

    #[test]
    fn test_end_selector_follows_start() {
        let catalog = catalog(5);
        let selector = VersionRangeSelector::new(&catalog);
        let mut range = VersionRange::new(0, 1);
        selector.set_start(&mut range, 3);
        assert_eq!(range, VersionRange::new(3, 3));
        let ends: Vec<usize> = selector.end_options(&range).into_iter().map(|(i, _)| i).collect();
        assert_eq!(ends, vec![3, 4]);
        selector.set_end(&mut range, 99);
        assert_eq!(range.end, 4);
    }
}
