//! Cart domain model.
//!
//! # Responsibility
//! - Define the line item and cart state shapes used by every layer.
//! - Keep state transitions pure so persistence stays a separate concern.
//!
//! # Invariants
//! - A `CartState` never holds two items with the same product id.
//! - A `CartState` never holds an item with quantity 0.

pub mod cart_item;
pub mod cart_state;
