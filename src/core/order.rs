//! Draft order state and submission checks.
//!
//! The draft holds at most one line item per product, and a line item never
//! has a zero or negative quantity: setting a product's quantity to 0 removes
//! it. Quantities above the product's available stock are clamped.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::api::Product;
use crate::core::postal::PinCodeValidator;

// ============================================================================
// Location type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Urban,
    Suburban,
    Rural,
}

impl LocationType {
    pub const ALL: [LocationType; 3] = [
        LocationType::Urban,
        LocationType::Suburban,
        LocationType::Rural,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LocationType::Urban => "Urban",
            LocationType::Suburban => "Suburban",
            LocationType::Rural => "Rural",
        }
    }

    /// Cycle through `None → Urban → Suburban → Rural → None`.
    pub fn cycle(current: Option<Self>, forward: bool) -> Option<Self> {
        let len = Self::ALL.len() + 1;
        let idx = current
            .and_then(|c| Self::ALL.iter().position(|&l| l == c))
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        next.checked_sub(1).map(|i| Self::ALL[i])
    }
}

// ============================================================================
// Draft
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub stock_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub weight: f64,
    pub price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }

    pub fn line_weight(&self) -> f64 {
        self.weight * self.quantity as f64
    }
}

/// In-progress, unsaved order. Serializes with the backend's field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraft {
    pub customer_id: i64,
    pub shipping_address: String,
    pub pin_code: String,
    pub location_type: Option<LocationType>,
    pub phone_number: String,
    items: Vec<OrderItem>,
    pub courier_service_id: Option<i64>,
}

impl OrderDraft {
    pub fn new(customer_id: i64) -> Self {
        Self {
            customer_id,
            shipping_address: String::new(),
            pin_code: String::new(),
            location_type: None,
            phone_number: String::new(),
            items: Vec::new(),
            courier_service_id: None,
        }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Set the ordered quantity for `product` and return the stored value.
    ///
    /// 0 (or less) removes the line; values above the available stock are
    /// clamped to it. An existing line keeps its position.
    pub fn set_quantity(&mut self, product: &Product, requested: i64) -> i64 {
        let quantity = requested.min(product.available_quantity).max(0);
        let existing = self.items.iter().position(|i| i.stock_id == product.id);

        match (existing, quantity) {
            (Some(idx), 0) => {
                self.items.remove(idx);
            }
            (None, 0) => {}
            (Some(idx), q) => {
                let item = &mut self.items[idx];
                item.quantity = q;
                item.product_name = product.name.clone();
                item.weight = product.weight;
                item.price = product.price;
            }
            (None, q) => self.items.push(OrderItem {
                stock_id: product.id,
                product_name: product.name.clone(),
                quantity: q,
                weight: product.weight,
                price: product.price,
            }),
        }

        quantity
    }

    /// Ordered quantity for a product, 0 when it isn't in the draft.
    pub fn quantity_of(&self, stock_id: i64) -> i64 {
        self.items
            .iter()
            .find(|i| i.stock_id == stock_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(OrderItem::line_weight).sum()
    }

    pub fn total_units(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Required fields that are still blank, in form order.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.items.is_empty() {
            missing.push(RequiredField::Items);
        }
        if self.shipping_address.trim().is_empty() {
            missing.push(RequiredField::ShippingAddress);
        }
        if self.pin_code.trim().is_empty() {
            missing.push(RequiredField::PinCode);
        }
        if self.location_type.is_none() {
            missing.push(RequiredField::LocationType);
        }
        if self.courier_service_id.is_none() {
            missing.push(RequiredField::CourierService);
        }
        if self.phone_number.trim().is_empty() {
            missing.push(RequiredField::PhoneNumber);
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Items,
    ShippingAddress,
    PinCode,
    LocationType,
    CourierService,
    PhoneNumber,
}

impl RequiredField {
    pub fn label(self) -> &'static str {
        match self {
            RequiredField::Items => "at least one product",
            RequiredField::ShippingAddress => "delivery address",
            RequiredField::PinCode => "pin code",
            RequiredField::LocationType => "location type",
            RequiredField::CourierService => "courier service",
            RequiredField::PhoneNumber => "phone number",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Submission
// ============================================================================

/// Why a submission did not proceed to review. `Display` is the user-facing text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitBlocked {
    #[error("Please fill in all required fields and add at least one product.")]
    Incomplete(Vec<RequiredField>),

    #[error("Invalid PIN code. Please enter a valid PIN code.")]
    InvalidPinCode,
}

/// Accepted drafts proceed to review carrying every field.
pub type SubmitOutcome = Result<OrderDraft, SubmitBlocked>;

/// Check required fields, then the PIN code. The lookup only runs once every
/// required field is present.
pub async fn submit_order(draft: &OrderDraft, validator: &dyn PinCodeValidator) -> SubmitOutcome {
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        log::debug!("Order submission blocked, missing: {missing:?}");
        return Err(SubmitBlocked::Incomplete(missing));
    }

    if !validator.is_valid(draft.pin_code.trim()).await {
        log::info!("PIN code '{}' rejected by lookup", draft.pin_code.trim());
        return Err(SubmitBlocked::InvalidPinCode);
    }

    log::info!(
        "Order draft accepted: {} line(s), {} unit(s)",
        draft.items.len(),
        draft.total_units()
    );
    Ok(draft.clone())
}
