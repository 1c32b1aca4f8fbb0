//! Wire types exchanged with the inventory backend.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::{DashboardError, Result};

// ============================================================================
// Analytics
// ============================================================================

/// Inclusive calendar range for the inventory report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidDateRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |label: &str, value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                DashboardError::InvalidDateRange(format!(
                    "{label} date '{}' is not YYYY-MM-DD",
                    value.trim()
                ))
            })
        };
        Self::new(parse("start", start)?, parse("end", end)?)
    }

    /// The `days` days ending today, inclusive.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let start = today - chrono::Duration::days(i64::from(days.saturating_sub(1)));
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Query pairs in the form the report endpoint expects.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Per-product stock quantities (parallel sequences).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockLevels {
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default, deserialize_with = "numbers")]
    pub quantities: Vec<f64>,
}

/// Products held per supplier (parallel sequences).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierDistribution {
    #[serde(default)]
    pub suppliers: Vec<String>,
    #[serde(default, deserialize_with = "numbers")]
    pub total_products: Vec<f64>,
}

/// Response of `GET /api/inventory-reports`. Either dataset may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    #[serde(default)]
    pub stock_levels: Option<StockLevels>,
    #[serde(default)]
    pub supplier_stock_distribution: Option<SupplierDistribution>,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "stock_id", alias = "id", deserialize_with = "integer")]
    pub id: i64,
    #[serde(rename = "stock_name", alias = "name")]
    pub name: String,
    #[serde(deserialize_with = "number")]
    pub price: f64,
    #[serde(deserialize_with = "number")]
    pub weight: f64,
    #[serde(
        rename = "quantity",
        alias = "available_quantity",
        deserialize_with = "integer"
    )]
    pub available_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierService {
    #[serde(deserialize_with = "integer")]
    pub id: i64,
    pub name: String,
}

// ============================================================================
// Lenient numbers
// ============================================================================

/// Decimal columns often arrive as strings ("12.50"); accept both forms.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> std::result::Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a number, got '{s}'"))),
        }
    }
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_f64()
}

/// Id and count columns, same leniency as [`NumberOrString`].
#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Text(String),
}

fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Text(s) => s.trim().parse().map_err(|_| {
            <D::Error as serde::de::Error>::custom(format!("expected an integer, got '{s}'"))
        }),
    }
}

fn numbers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<f64>, D::Error> {
    Vec::<NumberOrString>::deserialize(deserializer)?
        .into_iter()
        .map(NumberOrString::into_f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_range_rejects_reversed() {
        let err = DateRange::new(date("2026-02-01"), date("2026-01-01")).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidDateRange(_)));
    }

    #[test]
    fn test_date_range_same_day_is_valid() {
        let range = DateRange::parse("2026-01-01", " 2026-01-01 ").unwrap();
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn test_date_range_parse_bad_format() {
        let err = DateRange::parse("01/02/2026", "2026-02-01").unwrap_err();
        assert!(err.to_string().contains("start date"));
    }

    #[test]
    fn test_last_days() {
        let range = DateRange::last_days(date("2026-03-30"), 30);
        assert_eq!(range.start(), date("2026-03-01"));
        assert_eq!(range.end(), date("2026-03-30"));
    }

    #[test]
    fn test_query_pairs() {
        let range = DateRange::parse("2026-01-05", "2026-01-31").unwrap();
        let pairs = range.query_pairs();
        assert_eq!(pairs[0], ("startDate", "2026-01-05".to_string()));
        assert_eq!(pairs[1], ("endDate", "2026-01-31".to_string()));
    }

    #[test]
    fn test_product_wire_names() {
        let product: Product = serde_json::from_value(json!({
            "stock_id": 7,
            "stock_name": "Basmati Rice 5kg",
            "price": "12.50",
            "weight": 5,
            "quantity": 40
        }))
        .unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.name, "Basmati Rice 5kg");
        assert_eq!(product.price, 12.5);
        assert_eq!(product.weight, 5.0);
        assert_eq!(product.available_quantity, 40);
    }

    #[test]
    fn test_product_accepts_string_ids_and_counts() {
        let product: Product = serde_json::from_value(json!({
            "stock_id": "3",
            "stock_name": "Toor Dal",
            "price": 95.5,
            "weight": "1",
            "quantity": " 10 "
        }))
        .unwrap();
        assert_eq!(product.id, 3);
        assert_eq!(product.available_quantity, 10);

        let courier: CourierService =
            serde_json::from_value(json!({ "id": "7", "name": "BlueDart" })).unwrap();
        assert_eq!(courier.id, 7);
    }

    #[test]
    fn test_product_rejects_fractional_quantity_text() {
        let result = serde_json::from_value::<Product>(json!({
            "stock_id": 1, "stock_name": "x", "price": 1, "weight": 1, "quantity": "2.5"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_product_rejects_non_numeric_price() {
        let result = serde_json::from_value::<Product>(json!({
            "stock_id": 1, "stock_name": "x", "price": "n/a", "weight": 1, "quantity": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_report_with_null_and_missing_datasets() {
        let report: InventoryReport =
            serde_json::from_value(json!({ "stock_levels": null })).unwrap();
        assert!(report.stock_levels.is_none());
        assert!(report.supplier_stock_distribution.is_none());
    }

    #[test]
    fn test_report_with_string_quantities() {
        let report: InventoryReport = serde_json::from_value(json!({
            "stock_levels": { "products": ["A", "B"], "quantities": ["3", 4.5] },
            "supplier_stock_distribution": { "suppliers": ["S"], "total_products": [2] }
        }))
        .unwrap();
        assert_eq!(report.stock_levels.unwrap().quantities, vec![3.0, 4.5]);
        assert_eq!(report.supplier_stock_distribution.unwrap().total_products, vec![2.0]);
    }
}
