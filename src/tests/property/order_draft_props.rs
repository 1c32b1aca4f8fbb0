//! Property-based tests for the order draft
//!
//! Tests invariants:
//! - One line per product, never a zero quantity
//! - Quantities clamp to available stock
//! - Totals are the sum of the lines

use std::collections::HashSet;

use proptest::prelude::*;

use crate::core::api::Product;
use crate::core::order::OrderDraft;
use crate::tests::common::product;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// A small catalog with distinct ids.
fn arb_catalog() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec((1u32..1_000, 1u32..500, 0i64..50), 1..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (cents, grams, available))| {
                product(
                    idx as i64 + 1,
                    &format!("Product {idx}"),
                    f64::from(cents) / 100.0,
                    f64::from(grams) / 100.0,
                    available,
                )
            })
            .collect()
    })
}

/// Edits as (catalog index, requested quantity); indices wrap around the catalog.
fn arb_edits() -> impl Strategy<Value = Vec<(usize, i64)>> {
    prop::collection::vec((0usize..16, -5i64..80), 0..40)
}

fn apply(catalog: &[Product], edits: &[(usize, i64)]) -> OrderDraft {
    let mut draft = OrderDraft::new(1);
    for &(idx, requested) in edits {
        draft.set_quantity(&catalog[idx % catalog.len()], requested);
    }
    draft
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: every product appears at most once, and never with quantity 0
    #[test]
    fn prop_lines_are_unique_and_positive(catalog in arb_catalog(), edits in arb_edits()) {
        let draft = apply(&catalog, &edits);
        let mut seen = HashSet::new();
        for item in draft.items() {
            prop_assert!(seen.insert(item.stock_id), "duplicate line for {}", item.stock_id);
            prop_assert!(item.quantity > 0);
        }
    }

    /// Property: the stored quantity is the request clamped to [0, available]
    #[test]
    fn prop_quantity_is_clamped(
        catalog in arb_catalog(),
        idx in 0usize..16,
        requested in -100i64..200
    ) {
        let product = &catalog[idx % catalog.len()];
        let mut draft = OrderDraft::new(1);
        let stored = draft.set_quantity(product, requested);

        prop_assert!(stored >= 0);
        prop_assert!(stored <= product.available_quantity);
        prop_assert_eq!(stored, requested.clamp(0, product.available_quantity));
        prop_assert_eq!(draft.quantity_of(product.id), stored);
    }

    /// Property: the last edit for a product wins
    #[test]
    fn prop_last_edit_wins(catalog in arb_catalog(), edits in arb_edits()) {
        let draft = apply(&catalog, &edits);
        for product in &catalog {
            let expected = edits
                .iter()
                .rev()
                .find(|(idx, _)| catalog[idx % catalog.len()].id == product.id)
                .map(|&(_, q)| q.clamp(0, product.available_quantity))
                .unwrap_or(0);
            prop_assert_eq!(draft.quantity_of(product.id), expected);
        }
    }

    /// Property: totals match the sum over line items
    #[test]
    fn prop_totals_match_lines(catalog in arb_catalog(), edits in arb_edits()) {
        let draft = apply(&catalog, &edits);

        let price: f64 = draft.items().iter().map(|i| i.price * i.quantity as f64).sum();
        let weight: f64 = draft.items().iter().map(|i| i.weight * i.quantity as f64).sum();
        let units: i64 = draft.items().iter().map(|i| i.quantity).sum();

        prop_assert!((draft.total_price() - price).abs() < 1e-9);
        prop_assert!((draft.total_weight() - weight).abs() < 1e-9);
        prop_assert_eq!(draft.total_units(), units);
    }
}
