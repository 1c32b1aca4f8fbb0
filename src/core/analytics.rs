//! Inventory analytics refresh cycle.
//!
//! A [`ChartBoard`] owns two [`ChartSlot`]s: the stock distribution pie and
//! the supplier bar chart. A refresh disposes whatever each slot holds, then
//! builds new visualization instances from the report. Each dataset is handled
//! on its own, so an empty stock dataset never prevents the bar chart.
//!
//! Refreshes are numbered. A report that arrives for an older generation is
//! discarded without touching the slots.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::api::{InventoryReport, StockLevels, SupplierDistribution};
use crate::core::error::DashboardError;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_instance_id() -> u64 {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// Chart kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    StockPie,
    SupplierBar,
}

impl ChartKind {
    /// Dataset name used in user-facing messages.
    pub fn dataset_name(self) -> &'static str {
        match self {
            ChartKind::StockPie => "Stock Levels",
            ChartKind::SupplierBar => "Supplier Stock Distribution",
        }
    }

    pub fn empty_message(self) -> String {
        format!(
            "No data available for the selected date range for {}.",
            self.dataset_name()
        )
    }
}

/// RGBA colour as the chart fills use it; alpha is informational in a terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour, fully opaque (used for borders).
    pub fn opaque(self) -> Self {
        Self { a: 1.0, ..self }
    }

    fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.gen_range(0..255), rng.gen_range(0..255), rng.gen_range(0..255), 0.6)
    }
}

// ============================================================================
// Visualization instances
// ============================================================================

/// A rendered chart object that must be disposed before it is replaced.
pub trait Visualization {
    fn kind(&self) -> ChartKind;
    fn instance_id(&self) -> u64;
    /// Release the instance. Idempotent.
    fn dispose(&mut self);
    fn is_disposed(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fill: Rgba,
}

/// Stock distribution pie.
#[derive(Debug)]
pub struct PieVisualization {
    id: u64,
    pub title: &'static str,
    pub dataset_label: &'static str,
    pub slices: Vec<PieSlice>,
    disposed: bool,
}

impl PieVisualization {
    pub const TITLE: &'static str = "Stock Levels & Replenishment Needs";

    pub fn from_stock_levels(levels: &StockLevels, rng: &mut impl Rng) -> Self {
        warn_on_length_mismatch("stock_levels", levels.products.len(), levels.quantities.len());
        let slices = levels
            .products
            .iter()
            .zip(&levels.quantities)
            .map(|(label, &value)| PieSlice {
                label: label.clone(),
                value,
                fill: Rgba::random(rng),
            })
            .collect();

        Self {
            id: next_instance_id(),
            title: Self::TITLE,
            dataset_label: "Orders",
            slices,
            disposed: false,
        }
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value.max(0.0)).sum()
    }

    /// Fraction of the pie taken by slice `idx` (0.0 when the total is zero).
    pub fn share(&self, idx: usize) -> f64 {
        let total = self.total();
        match self.slices.get(idx) {
            Some(slice) if total > 0.0 => slice.value.max(0.0) / total,
            _ => 0.0,
        }
    }

    /// Tooltip text for slice `idx`, e.g. `"Rice: 40 pieces"`.
    pub fn tooltip(&self, idx: usize) -> Option<String> {
        self.slices
            .get(idx)
            .map(|s| format!("{}: {} pieces", s.label, format_value(s.value)))
    }
}

impl Visualization for PieVisualization {
    fn kind(&self) -> ChartKind {
        ChartKind::StockPie
    }

    fn instance_id(&self) -> u64 {
        self.id
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.slices.clear();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Supplier stock distribution bars.
#[derive(Debug)]
pub struct BarVisualization {
    id: u64,
    pub title: &'static str,
    pub dataset_label: &'static str,
    pub x_axis_title: &'static str,
    pub y_axis_title: &'static str,
    pub fill: Rgba,
    pub bars: Vec<(String, f64)>,
    disposed: bool,
}

impl BarVisualization {
    pub const TITLE: &'static str = "Supplier Stock Distribution";
    pub const FILL: Rgba = Rgba::new(75, 192, 192, 0.6);

    pub fn from_distribution(dist: &SupplierDistribution) -> Self {
        warn_on_length_mismatch(
            "supplier_stock_distribution",
            dist.suppliers.len(),
            dist.total_products.len(),
        );
        let bars = dist
            .suppliers
            .iter()
            .cloned()
            .zip(dist.total_products.iter().copied())
            .collect();

        Self {
            id: next_instance_id(),
            title: Self::TITLE,
            dataset_label: "Products",
            x_axis_title: "Suppliers",
            y_axis_title: "Number of products",
            fill: Self::FILL,
            bars,
            disposed: false,
        }
    }

    /// Highest bar value; the y axis always starts at zero.
    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }
}

impl Visualization for BarVisualization {
    fn kind(&self) -> ChartKind {
        ChartKind::SupplierBar
    }

    fn instance_id(&self) -> u64 {
        self.id
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.bars.clear();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

fn warn_on_length_mismatch(dataset: &str, labels: usize, values: usize) {
    if labels != values {
        log::warn!(
            "{dataset}: {labels} label(s) but {values} value(s); pairing the first {}",
            labels.min(values)
        );
    }
}

/// Integers print without a fractional part.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

// ============================================================================
// Slots
// ============================================================================

/// Exclusive owner of at most one live visualization instance.
#[derive(Debug)]
pub struct ChartSlot<V: Visualization> {
    current: Option<V>,
    created: u64,
    disposed: u64,
}

impl<V: Visualization> ChartSlot<V> {
    pub fn new() -> Self {
        Self {
            current: None,
            created: 0,
            disposed: 0,
        }
    }

    /// Install `next`, disposing the previous instance first.
    pub fn replace(&mut self, next: V) {
        self.dispose();
        log::debug!("{:?}: created instance #{}", next.kind(), next.instance_id());
        self.current = Some(next);
        self.created += 1;
    }

    /// Dispose and drop the current instance, if any.
    pub fn dispose(&mut self) {
        if let Some(mut old) = self.current.take() {
            old.dispose();
            self.disposed += 1;
            log::debug!("{:?}: disposed instance #{}", old.kind(), old.instance_id());
        }
    }

    pub fn current(&self) -> Option<&V> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Instances installed over the slot's lifetime.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Instances disposed over the slot's lifetime.
    pub fn disposed(&self) -> u64 {
        self.disposed
    }
}

impl<V: Visualization> Default for ChartSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Visualization> Drop for ChartSlot<V> {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ============================================================================
// Board
// ============================================================================

/// Result of applying a fetch to the board.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The response belonged to an older refresh and was dropped.
    Stale,
    /// Datasets were applied; `missing` lists charts skipped for lack of data.
    Rendered {
        charts: Vec<ChartKind>,
        missing: Vec<ChartKind>,
    },
    /// The fetch failed; both slots stay empty.
    Failed(String),
}

impl RefreshOutcome {
    /// User-facing messages for this outcome (all error-level).
    pub fn messages(&self) -> Vec<String> {
        match self {
            RefreshOutcome::Stale => Vec::new(),
            RefreshOutcome::Rendered { missing, .. } => {
                missing.iter().map(|k| k.empty_message()).collect()
            }
            RefreshOutcome::Failed(reason) => {
                vec![format!("Failed to load inventory reports: {reason}")]
            }
        }
    }
}

pub struct ChartBoard {
    pie: ChartSlot<PieVisualization>,
    bar: ChartSlot<BarVisualization>,
    generation: u64,
    rng: StdRng,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic slice colours.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            pie: ChartSlot::new(),
            bar: ChartSlot::new(),
            generation: 0,
            rng,
        }
    }

    pub fn pie(&self) -> &ChartSlot<PieVisualization> {
        &self.pie
    }

    pub fn bar(&self) -> &ChartSlot<BarVisualization> {
        &self.bar
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a refresh: dispose both charts and return the new generation.
    pub fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.pie.dispose();
        self.bar.dispose();
        self.generation
    }

    /// Make every in-flight refresh stale without touching the charts.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Release both charts and orphan any in-flight refresh.
    pub fn teardown(&mut self) {
        self.invalidate();
        self.pie.dispose();
        self.bar.dispose();
    }

    pub fn apply_report(&mut self, generation: u64, report: &InventoryReport) -> RefreshOutcome {
        if generation != self.generation {
            log::debug!(
                "Dropping stale inventory report (generation {generation}, current {})",
                self.generation
            );
            return RefreshOutcome::Stale;
        }

        let mut charts = Vec::new();
        let mut missing = Vec::new();

        match report.stock_levels.as_ref().filter(|l| !l.products.is_empty()) {
            Some(levels) => {
                self.pie
                    .replace(PieVisualization::from_stock_levels(levels, &mut self.rng));
                charts.push(ChartKind::StockPie);
            }
            None => {
                self.pie.dispose();
                missing.push(ChartKind::StockPie);
            }
        }

        match report
            .supplier_stock_distribution
            .as_ref()
            .filter(|d| !d.suppliers.is_empty())
        {
            Some(dist) => {
                self.bar.replace(BarVisualization::from_distribution(dist));
                charts.push(ChartKind::SupplierBar);
            }
            None => {
                self.bar.dispose();
                missing.push(ChartKind::SupplierBar);
            }
        }

        RefreshOutcome::Rendered { charts, missing }
    }

    pub fn apply_failure(&mut self, generation: u64, error: &DashboardError) -> RefreshOutcome {
        if generation != self.generation {
            return RefreshOutcome::Stale;
        }
        log::error!("Inventory report fetch failed: {error}");
        self.pie.dispose();
        self.bar.dispose();
        RefreshOutcome::Failed(error.user_message())
    }
}

impl Default for ChartBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(products: &[(&str, f64)], suppliers: &[(&str, f64)]) -> InventoryReport {
        InventoryReport {
            stock_levels: Some(StockLevels {
                products: products.iter().map(|(n, _)| n.to_string()).collect(),
                quantities: products.iter().map(|(_, q)| *q).collect(),
            }),
            supplier_stock_distribution: Some(SupplierDistribution {
                suppliers: suppliers.iter().map(|(n, _)| n.to_string()).collect(),
                total_products: suppliers.iter().map(|(_, q)| *q).collect(),
            }),
        }
    }

    #[test]
    fn test_full_report_renders_both() {
        let mut board = ChartBoard::with_seed(7);
        let gen = board.begin_refresh();
        let outcome = board.apply_report(gen, &report(&[("Rice", 40.0)], &[("Acme", 3.0)]));

        assert_eq!(
            outcome,
            RefreshOutcome::Rendered {
                charts: vec![ChartKind::StockPie, ChartKind::SupplierBar],
                missing: vec![],
            }
        );
        assert!(outcome.messages().is_empty());
        let pie = board.pie().current().unwrap();
        assert_eq!(pie.title, "Stock Levels & Replenishment Needs");
        assert_eq!(pie.tooltip(0).unwrap(), "Rice: 40 pieces");
        let bar = board.bar().current().unwrap();
        assert_eq!(bar.bars, vec![("Acme".to_string(), 3.0)]);
    }

    #[test]
    fn test_empty_stock_data_warns_and_creates_no_pie() {
        let mut board = ChartBoard::with_seed(1);
        let gen = board.begin_refresh();
        let outcome = board.apply_report(gen, &report(&[], &[("Acme", 3.0)]));

        assert!(board.pie().is_empty());
        assert_eq!(board.pie().created(), 0);
        assert!(!board.bar().is_empty());
        assert_eq!(
            outcome.messages(),
            vec!["No data available for the selected date range for Stock Levels.".to_string()]
        );
    }

    #[test]
    fn test_empty_supplier_data_warns_and_creates_no_bar() {
        let mut board = ChartBoard::with_seed(1);
        let gen = board.begin_refresh();
        let mut r = report(&[("Rice", 1.0)], &[]);
        r.supplier_stock_distribution = None;
        let outcome = board.apply_report(gen, &r);

        assert!(board.bar().is_empty());
        assert_eq!(board.bar().created(), 0);
        assert_eq!(
            outcome.messages(),
            vec![
                "No data available for the selected date range for Supplier Stock Distribution."
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_refresh_disposes_previous_instances() {
        let mut board = ChartBoard::with_seed(3);
        let data = report(&[("Rice", 1.0)], &[("Acme", 1.0)]);

        let gen = board.begin_refresh();
        board.apply_report(gen, &data);
        let first_pie = board.pie().current().unwrap().instance_id();

        let gen = board.begin_refresh();
        // disposed before the new data arrives
        assert!(board.pie().is_empty());
        assert!(board.bar().is_empty());
        board.apply_report(gen, &data);

        assert_ne!(board.pie().current().unwrap().instance_id(), first_pie);
        assert_eq!(board.pie().created(), 2);
        assert_eq!(board.pie().disposed(), 1);
        assert_eq!(board.bar().created(), 2);
        assert_eq!(board.bar().disposed(), 1);
    }

    #[test]
    fn test_stale_report_is_dropped() {
        let mut board = ChartBoard::with_seed(3);
        let old = board.begin_refresh();
        let current = board.begin_refresh();

        let outcome = board.apply_report(old, &report(&[("Rice", 1.0)], &[("Acme", 1.0)]));
        assert_eq!(outcome, RefreshOutcome::Stale);
        assert!(board.pie().is_empty());

        board.invalidate();
        let outcome = board.apply_report(current, &report(&[("Rice", 1.0)], &[]));
        assert_eq!(outcome, RefreshOutcome::Stale);
    }

    #[test]
    fn test_teardown_disposes_and_orphans() {
        let mut board = ChartBoard::with_seed(5);
        let data = report(&[("Rice", 1.0)], &[("Acme", 1.0)]);
        let gen = board.begin_refresh();
        board.apply_report(gen, &data);
        let pending = board.begin_refresh();
        board.teardown();

        assert_eq!(board.apply_report(pending, &data), RefreshOutcome::Stale);
        assert!(board.pie().is_empty() && board.bar().is_empty());
        assert_eq!(board.pie().created(), board.pie().disposed());
    }

    #[test]
    fn test_failure_is_third_state() {
        let mut board = ChartBoard::with_seed(3);
        let gen = board.begin_refresh();
        let err = DashboardError::Status {
            status: 500,
            url: "http://localhost/api/inventory-reports".to_string(),
        };
        let outcome = board.apply_failure(gen, &err);
        assert_eq!(
            outcome.messages(),
            vec!["Failed to load inventory reports: server returned HTTP 500".to_string()]
        );
        assert!(board.pie().is_empty() && board.bar().is_empty());
    }

    #[test]
    fn test_mismatched_lengths_pair_shortest() {
        let levels = StockLevels {
            products: vec!["A".into(), "B".into(), "C".into()],
            quantities: vec![1.0, 2.0],
        };
        let pie = PieVisualization::from_stock_levels(&levels, &mut StdRng::seed_from_u64(0));
        assert_eq!(pie.slices.len(), 2);
    }

    #[test]
    fn test_pie_shares() {
        let levels = StockLevels {
            products: vec!["A".into(), "B".into()],
            quantities: vec![1.0, 3.0],
        };
        let pie = PieVisualization::from_stock_levels(&levels, &mut StdRng::seed_from_u64(0));
        assert!((pie.share(0) - 0.25).abs() < 1e-9);
        assert!((pie.share(1) - 0.75).abs() < 1e-9);
        assert_eq!(pie.share(5), 0.0);
        assert!(pie.slices.iter().all(|s| (s.fill.a - 0.6).abs() < f32::EPSILON));
    }

    #[test]
    fn test_slot_dispose_marks_instance() {
        let mut slot: ChartSlot<BarVisualization> = ChartSlot::new();
        slot.replace(BarVisualization::from_distribution(&SupplierDistribution {
            suppliers: vec!["A".into()],
            total_products: vec![5.0],
        }));
        slot.dispose();
        slot.dispose();
        assert_eq!(slot.disposed(), 1);
        assert!(slot.is_empty());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(40.0), "40");
        assert_eq!(format_value(2.5), "2.50");
    }
}
