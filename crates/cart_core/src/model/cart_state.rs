//! Cart state value and its pure transitions.
//!
//! # Responsibility
//! - Hold the ordered, id-unique list of cart items.
//! - Provide immutable-update transitions used by `CartStore`.
//!
//! # Invariants
//! - No two items share an id.
//! - Every item has quantity >= 1; a line that would reach 0 is removed.
//! - Items keep their first-added position across increments/decrements.

use crate::model::cart_item::{CartItem, CartItemValidationError, NewCartItem};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised when building a state from untrusted items.
#[derive(Debug, Clone, PartialEq)]
pub enum CartStateError {
    InvalidItem(CartItemValidationError),
    DuplicateId(String),
}

impl Display for CartStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidItem(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "duplicate cart item id `{id}`"),
        }
    }
}

impl Error for CartStateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidItem(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<CartItemValidationError> for CartStateError {
    fn from(value: CartItemValidationError) -> Self {
        Self::InvalidItem(value)
    }
}

/// Ordered cart contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from untrusted items, e.g. a decoded snapshot.
    ///
    /// # Errors
    /// - `InvalidItem` when any item fails `CartItem::validate()`.
    /// - `DuplicateId` when two items share an id.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartStateError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(CartStateError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` over all lines.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Returns the state after adding one unit of `product`.
    ///
    /// An existing line with the same id is bumped by one and keeps its
    /// stored title/image/price; otherwise a new line is appended.
    ///
    /// # Errors
    /// - Returns the validation error when `product` would form an invalid line.
    pub fn with_added(&self, product: NewCartItem) -> Result<Self, CartItemValidationError> {
        if self.contains(&product.id) {
            return Ok(self.with_incremented(&product.id));
        }

        let line = product.into_item();
        line.validate()?;
        let mut items = self.items.clone();
        items.push(line);
        Ok(Self { items })
    }

    /// Returns the state with `id` bumped by one, or an equal state when
    /// `id` is not in the cart.
    pub fn with_incremented(&self, id: &str) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    CartItem {
                        quantity: item.quantity.saturating_add(1),
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Self { items }
    }

    /// Returns the state with `id` lowered by one.
    ///
    /// A line at quantity 1 is removed; unknown ids leave the state equal.
    pub fn with_decremented(&self, id: &str) -> Self {
        let items = self
            .items
            .iter()
            .filter_map(|item| {
                if item.id != id {
                    return Some(item.clone());
                }
                if item.quantity <= 1 {
                    return None;
                }
                Some(CartItem {
                    quantity: item.quantity - 1,
                    ..item.clone()
                })
            })
            .collect();
        Self { items }
    }
}
