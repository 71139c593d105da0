//! Property tests for the pure pipeline pieces: filters, jitter, tick
//! thinning and the URL fragment.

mod common;

use common::record;
use perf_dashboard::filter::{apply_data_filters, FilterTerms};
use perf_dashboard::layout::jitter_offset;
use perf_dashboard::state::{capture, restore};
use perf_dashboard::ticks::{max_labels, recompute_ticks, AxisGeometry, TickSet};
use perf_dashboard::{FilterChip, Record, SliceScheme, VersionCatalog, VersionRange, ViewState};
use proptest::prelude::*;

fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(("[a-c]{1,3}", "[a-d]{2,4}", 0usize..4), 0..20).prop_map(|rows| {
        rows.into_iter()
            .map(|(machine, os, version)| Record {
                // Finite bounds keep records comparable with `==`.
                adjusted_min_ms: 0.5,
                adjusted_max_ms: 1.5,
                ..record("T", &machine, &format!("0.{}.0", version), &os, 1.0)
            })
            .collect()
    })
}

fn catalog(len: usize) -> VersionCatalog {
    let records: Vec<Record> = (0..len)
        .map(|i| record("T", "m", &format!("0.{}.0", i), "os", 1.0))
        .collect();
    VersionCatalog::from_records(&records)
}

fn chips(texts: &[&str]) -> FilterTerms {
    FilterTerms::from_parts("", texts.iter().copied())
}

proptest! {
    #[test]
    fn prop_chips_compose_sequentially(
        records in records_strategy(),
        first in "!?[a-d]{1,2}",
        second in "!?[a-d]{1,2}",
    ) {
        let together = apply_data_filters(&records, &chips(&[first.as_str(), second.as_str()]));
        let stepwise = apply_data_filters(
            &apply_data_filters(&records, &chips(&[first.as_str()])),
            &chips(&[second.as_str()]),
        );
        prop_assert_eq!(together, stepwise);
    }

    #[test]
    fn prop_negation_is_complementary(records in records_strategy(), term in "[a-d]{1,3}") {
        let kept = apply_data_filters(&records, &chips(&[term.as_str()])).len();
        let negated = format!("!{}", term);
        let dropped = apply_data_filters(&records, &chips(&[negated.as_str()])).len();
        prop_assert_eq!(kept + dropped, records.len());

        let free = apply_data_filters(&records, &FilterTerms::from_parts(&term, Vec::<&str>::new()));
        let free_negated =
            apply_data_filters(&records, &FilterTerms::from_parts(&negated, Vec::<&str>::new()));
        prop_assert_eq!(free.len() + free_negated.len(), records.len());
    }

    #[test]
    fn prop_filtering_only_removes(records in records_strategy(), term in "!?[a-d]{0,3}") {
        let kept = apply_data_filters(&records, &FilterTerms::from_parts(&term, Vec::<&str>::new()));
        prop_assert!(kept.len() <= records.len());
        prop_assert!(kept.iter().all(|r| records.contains(r)));
    }

    #[test]
    fn prop_jitter_stays_within_bounds(count in 1usize..50, rank_seed in 0usize..1000, max in 0.0f64..1.0) {
        let rank = rank_seed % count;
        let offset = jitter_offset(rank, count, max);
        prop_assert!(offset.abs() <= max / 2.0 + 1e-9);
        if count == 1 {
            prop_assert_eq!(offset, 0.0);
        }
    }

    #[test]
    fn prop_ticks_fit_the_label_budget(
        n in 2usize..300,
        lo in -10.0f64..200.0,
        span in 0.5f64..400.0,
        width in 1.0f64..2000.0,
    ) {
        let full = TickSet {
            values: (0..n).map(|i| i as f64).collect(),
            labels: (0..n).map(|i| format!("v{}", i)).collect(),
        };
        let geometry = AxisGeometry { range: (lo, lo + span), width_px: width };
        let ticks = recompute_ticks(&full, geometry, 40.0);

        prop_assert!(ticks.len() <= max_labels(width, 40.0));
        prop_assert_eq!(ticks.values.len(), ticks.labels.len());
        for (value, label) in ticks.values.iter().zip(&ticks.labels) {
            prop_assert!(*value >= lo && *value <= lo + span);
            prop_assert_eq!(label, &format!("v{}", *value as usize));
        }
    }

    #[test]
    fn prop_view_state_round_trips(
        scheme_index in 0usize..6,
        toggles in any::<(bool, bool, bool)>(),
        test_filter in ".{0,12}",
        data_filter in ".{0,12}",
        chip_texts in prop::collection::vec(
            ".{1,8}".prop_filter("committed chips are trimmed terms", |t| {
                FilterChip::parse(t).map_or(false, |chip| chip.text == *t)
            }),
            0..4,
        ),
        len in 1usize..10,
        a in 0usize..10,
        b in 0usize..10,
    ) {
        let catalog = catalog(len);
        let (start, end) = (a % len, b % len);
        let view = ViewState {
            scheme: SliceScheme::ALL[scheme_index],
            range: VersionRange::new(start.min(end), start.max(end)),
            exclude_outliers: toggles.0,
            show_error_bars: toggles.1,
            highlight_min_max: toggles.2,
            test_filter,
            data_filter,
            chips: chip_texts.into_iter().map(FilterChip::new).collect(),
        };
        let fallback = ViewState::initial(&catalog, 30);

        let restored = restore(&capture(&view, Some("Suite::Test")), &catalog, &fallback);
        prop_assert_eq!(restored.anchor.as_deref(), Some("Suite::Test"));
        prop_assert_eq!(restored.view, view);
    }
}
