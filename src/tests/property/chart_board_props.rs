//! Property-based tests for the chart board
//!
//! Tests invariants:
//! - At most one live chart per slot
//! - Stale generations are ignored
//! - Charts exist exactly for non-empty datasets

use proptest::prelude::*;

use crate::core::analytics::{ChartBoard, RefreshOutcome};
use crate::core::api::{InventoryReport, StockLevels, SupplierDistribution};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_labels() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z]{1,8}", 0..6)
}

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0u32..500, 0..6)
        .prop_map(|v| v.into_iter().map(f64::from).collect())
}

fn arb_report() -> impl Strategy<Value = InventoryReport> {
    (
        prop::option::of((arb_labels(), arb_values())),
        prop::option::of((arb_labels(), arb_values())),
    )
        .prop_map(|(stock, suppliers)| InventoryReport {
            stock_levels: stock.map(|(products, quantities)| StockLevels {
                products,
                quantities,
            }),
            supplier_stock_distribution: suppliers.map(|(suppliers, total_products)| {
                SupplierDistribution {
                    suppliers,
                    total_products,
                }
            }),
        })
}

/// A refresh step: apply `report`, optionally starting a newer refresh first
/// so the result arrives stale.
#[derive(Debug, Clone)]
struct Step {
    report: InventoryReport,
    superseded: bool,
}

fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(
        (arb_report(), any::<bool>()).prop_map(|(report, superseded)| Step { report, superseded }),
        1..12,
    )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: a slot never holds more than one undisposed instance
    #[test]
    fn prop_single_live_instance(steps in arb_steps()) {
        let mut board = ChartBoard::with_seed(3);
        for step in &steps {
            let generation = board.begin_refresh();
            if step.superseded {
                board.begin_refresh();
            }
            board.apply_report(generation, &step.report);

            let pie_live = board.pie().created() - board.pie().disposed();
            let bar_live = board.bar().created() - board.bar().disposed();
            prop_assert!(pie_live <= 1);
            prop_assert!(bar_live <= 1);
            prop_assert_eq!(pie_live == 1, !board.pie().is_empty());
            prop_assert_eq!(bar_live == 1, !board.bar().is_empty());
        }
    }

    /// Property: a stale result leaves both slots empty
    #[test]
    fn prop_stale_result_is_ignored(report in arb_report()) {
        let mut board = ChartBoard::with_seed(5);
        let old = board.begin_refresh();
        board.begin_refresh();

        prop_assert_eq!(board.apply_report(old, &report), RefreshOutcome::Stale);
        prop_assert!(board.pie().is_empty());
        prop_assert!(board.bar().is_empty());
        prop_assert_eq!(board.pie().created(), 0);
    }

    /// Property: a chart is shown exactly when its dataset has labels
    #[test]
    fn prop_chart_presence_follows_data(report in arb_report()) {
        let mut board = ChartBoard::with_seed(9);
        let generation = board.begin_refresh();
        board.apply_report(generation, &report);

        let has_stock = report.stock_levels.as_ref().is_some_and(|s| !s.products.is_empty());
        let has_suppliers = report
            .supplier_stock_distribution
            .as_ref()
            .is_some_and(|d| !d.suppliers.is_empty());
        prop_assert_eq!(!board.pie().is_empty(), has_stock);
        prop_assert_eq!(!board.bar().is_empty(), has_suppliers);
    }

    /// Property: teardown always leaves nothing live
    #[test]
    fn prop_teardown_releases_everything(steps in arb_steps()) {
        let mut board = ChartBoard::with_seed(11);
        for step in &steps {
            let generation = board.begin_refresh();
            board.apply_report(generation, &step.report);
        }
        board.teardown();

        prop_assert_eq!(board.pie().created(), board.pie().disposed());
        prop_assert_eq!(board.bar().created(), board.bar().disposed());
    }
}
