//! URL fragment encoding of [`ViewState`].
//!
//! The fragment is a query string: `view`, `outlier`, `showErrorBars`, `hmm`,
//! `testFilter`, `dataFilter`, one `df` per chip, `rangeStart`, `rangeEnd` and
//! `anchor`. False toggles, empty texts and a missing anchor are omitted.
//! Restoring never fails; anything unusable falls back to a default.

use super::{FilterChip, ViewState};
use crate::models::{SliceScheme, VersionCatalog, VersionRange};
use url::form_urlencoded;

const KEY_VIEW: &str = "view";
const KEY_OUTLIER: &str = "outlier";
const KEY_ERROR_BARS: &str = "showErrorBars";
const KEY_HIGHLIGHT: &str = "hmm";
const KEY_TEST_FILTER: &str = "testFilter";
const KEY_DATA_FILTER: &str = "dataFilter";
const KEY_CHIP: &str = "df";
const KEY_RANGE_START: &str = "rangeStart";
const KEY_RANGE_END: &str = "rangeEnd";
const KEY_ANCHOR: &str = "anchor";

/// State recovered from a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredState {
    pub view: ViewState,
    pub anchor: Option<String>,
}

/// Encode `view` (plus an optional anchor test) as a fragment, without `#`.
pub fn capture(view: &ViewState, anchor: Option<&str>) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair(KEY_VIEW, view.scheme.key());
    if view.exclude_outliers {
        params.append_pair(KEY_OUTLIER, "true");
    }
    if view.show_error_bars {
        params.append_pair(KEY_ERROR_BARS, "true");
    }
    if view.highlight_min_max {
        params.append_pair(KEY_HIGHLIGHT, "true");
    }
    if !view.test_filter.is_empty() {
        params.append_pair(KEY_TEST_FILTER, &view.test_filter);
    }
    if !view.data_filter.is_empty() {
        params.append_pair(KEY_DATA_FILTER, &view.data_filter);
    }
    for chip in &view.chips {
        params.append_pair(KEY_CHIP, &chip.text);
    }
    params.append_pair(KEY_RANGE_START, &view.range.start.to_string());
    params.append_pair(KEY_RANGE_END, &view.range.end.to_string());
    if let Some(anchor) = anchor.filter(|a| !a.is_empty()) {
        params.append_pair(KEY_ANCHOR, anchor);
    }
    params.finish()
}

/// Decode a fragment (with or without the leading `#`).
///
/// An empty fragment returns `fallback` unchanged, which lets cached
/// preferences seed a fresh session. Otherwise every absent key takes its
/// plain default: default scheme, toggles off, empty texts, no chips, the
/// fallback's version window.
pub fn restore(fragment: &str, catalog: &VersionCatalog, fallback: &ViewState) -> RestoredState {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    if fragment.is_empty() {
        return RestoredState {
            view: fallback.clone(),
            anchor: None,
        };
    }

    let mut view = ViewState {
        scheme: SliceScheme::default(),
        range: fallback.range,
        exclude_outliers: false,
        show_error_bars: false,
        highlight_min_max: false,
        test_filter: String::new(),
        data_filter: String::new(),
        chips: Vec::new(),
    };
    let mut anchor = None;
    let mut range_start = None;
    let mut range_end = None;

    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            KEY_VIEW => match SliceScheme::from_key(&value) {
                Some(scheme) => view.scheme = scheme,
                None => log::warn!("[State] Unknown view '{}', using default", value),
            },
            KEY_OUTLIER => view.exclude_outliers = value == "true",
            KEY_ERROR_BARS => view.show_error_bars = value == "true",
            KEY_HIGHLIGHT => view.highlight_min_max = value == "true",
            KEY_TEST_FILTER => view.test_filter = value.into_owned(),
            KEY_DATA_FILTER => view.data_filter = value.into_owned(),
            KEY_CHIP => match FilterChip::parse(&value) {
                Some(chip) => view.chips.push(chip),
                None => log::warn!("[State] Skipping empty filter chip '{}'", value),
            },
            KEY_RANGE_START => range_start = value.parse::<usize>().ok(),
            KEY_RANGE_END => range_end = value.parse::<usize>().ok(),
            KEY_ANCHOR if !value.is_empty() => anchor = Some(value.into_owned()),
            _ => log::debug!("[State] Ignoring fragment key '{}'", key),
        }
    }

    view.range = restore_range(range_start, range_end, catalog, fallback.range);
    RestoredState { view, anchor }
}

fn restore_range(
    start: Option<usize>,
    end: Option<usize>,
    catalog: &VersionCatalog,
    default: VersionRange,
) -> VersionRange {
    let len = catalog.len();
    let start = start.filter(|s| *s < len).unwrap_or(default.start);
    let end = end.filter(|e| *e < len).unwrap_or(catalog.last_index());
    VersionRange::new(start, end)
}

/// Link to `base` that reopens the current view anchored at `test_name`.
pub fn share_url(base: &str, view: &ViewState, test_name: &str) -> String {
    let base = base.split('#').next().unwrap_or(base);
    format!("{}#{}", base, capture(view, Some(test_name)))
}
