//! Cart snapshot codec.
//!
//! # Responsibility
//! - Serialize the whole cart into the single persisted value.
//! - Decode persisted values back into a validated `CartState`.
//!
//! # Invariants
//! - The snapshot is a JSON array of `CartItem` under `SNAPSHOT_KEY`.
//! - Decoding never yields a state that violates `CartState` invariants.

use crate::model::cart_item::CartItem;
use crate::model::cart_state::{CartState, CartStateError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized cart.
pub const SNAPSHOT_KEY: &str = "@products";

#[derive(Debug)]
pub enum SnapshotError {
    /// Value is not a JSON array of cart items, or could not be written as one.
    Malformed(serde_json::Error),
    /// Value parsed, but breaks cart invariants.
    Invalid(CartStateError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed cart snapshot: {err}"),
            Self::Invalid(err) => write!(f, "invalid cart snapshot: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

impl From<CartStateError> for SnapshotError {
    fn from(value: CartStateError) -> Self {
        Self::Invalid(value)
    }
}

/// Encodes the cart as a JSON array.
pub fn encode(state: &CartState) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(state.items())?)
}

/// Decodes and validates a persisted cart.
pub fn decode(raw: &str) -> Result<CartState, SnapshotError> {
    let items: Vec<CartItem> = serde_json::from_str(raw)?;
    Ok(CartState::from_items(items)?)
}
