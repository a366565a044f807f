//! Cart line item model.
//!
//! # Responsibility
//! - Define the canonical line item shared by store, snapshot and FFI.
//! - Validate item fields before they enter a `CartState`.
//!
//! # Invariants
//! - `id` is the product identifier and is unique within one cart.
//! - `quantity` is always >= 1 for any item present in a cart.
//! - `price` is finite. Negative prices are discount lines.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Product identifier used as the cart key.
pub type ProductId = String;

/// One product in the cart with its requested quantity.
///
/// Field names are the persisted wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Unit price in the catalog currency.
    pub price: f64,
    pub quantity: u32,
}

/// Add-to-cart input: a product reference without quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

/// Field-level validation failures for `CartItem`.
#[derive(Debug, Clone, PartialEq)]
pub enum CartItemValidationError {
    EmptyId,
    ZeroQuantity { id: ProductId },
    InvalidPrice { id: ProductId, price: f64 },
}

impl Display for CartItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "cart item id cannot be empty"),
            Self::ZeroQuantity { id } => {
                write!(f, "cart item `{id}` must have quantity >= 1")
            }
            Self::InvalidPrice { id, price } => {
                write!(f, "cart item `{id}` has invalid price {price}")
            }
        }
    }
}

impl Error for CartItemValidationError {}

impl NewCartItem {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Converts the input into a cart line with quantity 1.
    pub fn into_item(self) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

impl CartItem {
    /// Checks field invariants.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is blank.
    /// - `ZeroQuantity` when `quantity == 0`.
    /// - `InvalidPrice` when `price` is NaN or infinite.
    pub fn validate(&self) -> Result<(), CartItemValidationError> {
        if self.id.trim().is_empty() {
            return Err(CartItemValidationError::EmptyId);
        }
        if self.quantity == 0 {
            return Err(CartItemValidationError::ZeroQuantity {
                id: self.id.clone(),
            });
        }
        if !self.price.is_finite() {
            return Err(CartItemValidationError::InvalidPrice {
                id: self.id.clone(),
                price: self.price,
            });
        }
        Ok(())
    }

    /// Price of this line (`price * quantity`).
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}
