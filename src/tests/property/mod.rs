//! Property-based tests
//!
//! Invariants checked with proptest over generated inputs:
//!
//! - `order_draft_props`: draft line items after arbitrary quantity edits
//!   - At most one line per product
//!   - No zero-quantity lines
//!   - Stored quantity stays within `[0, available]`
//!   - Totals equal the sum over lines
//!
//! - `chart_board_props`: chart slots across refresh sequences
//!   - Never more than one live instance per slot
//!   - Stale results never touch the slots
//!   - A chart exists iff its dataset was non-empty

mod chart_board_props;
mod order_draft_props;
