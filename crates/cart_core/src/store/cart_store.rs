//! Cart store: in-memory cart state mirrored to key-value storage.
//!
//! # Responsibility
//! - Own the current `CartState` for one application session.
//! - Restore the persisted snapshot once at startup.
//! - Write the full after-update state after every mutation.
//!
//! # Invariants
//! - In-memory state is the source of truth; a failed write never rolls
//!   back a mutation.
//! - Writes happen synchronously in call order, so a stale snapshot can
//!   never overwrite a newer one.
//! - `initialize()` touches state at most once per store.

use crate::model::cart_item::{CartItem, CartItemValidationError, NewCartItem};
use crate::model::cart_state::CartState;
use crate::snapshot::{self, SnapshotError, SNAPSHOT_KEY};
use crate::storage::{KeyValueStore, StorageError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result of restoring the persisted cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A valid snapshot replaced the empty state.
    Restored { items: usize },
    /// Nothing was stored under the snapshot key.
    NoSnapshot,
    /// A snapshot existed but could not be decoded; the cart stays empty.
    Discarded,
    /// Storage could not be read; the cart stays empty.
    Unavailable,
    /// `initialize()` already ran for this store.
    AlreadyInitialized,
}

/// Why a snapshot write did not land.
#[derive(Debug)]
pub enum PersistError {
    Encode(SnapshotError),
    Storage(StorageError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

/// Completion signal of the write that follows each mutation.
#[derive(Debug)]
pub enum PersistOutcome {
    Saved,
    Failed(PersistError),
}

impl PersistOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Session-scoped cart container.
pub struct CartStore<S: KeyValueStore> {
    storage: S,
    state: CartState,
    initialized: bool,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Creates an empty, not yet initialized store.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: CartState::new(),
            initialized: false,
        }
    }

    /// Creates a store and restores the persisted cart.
    pub fn open(storage: S) -> (Self, LoadOutcome) {
        let mut store = Self::new(storage);
        let outcome = store.initialize();
        (store, outcome)
    }

    /// Restores the snapshot stored under `SNAPSHOT_KEY`.
    ///
    /// Missing, unreadable or invalid snapshots leave the cart empty. Errors
    /// are logged and reported through the outcome, never retried.
    ///
    /// A snapshot is all-or-nothing: one line with a blank id, quantity 0, a
    /// non-finite price or a repeated id discards every saved line.
    pub fn initialize(&mut self) -> LoadOutcome {
        if self.initialized {
            return LoadOutcome::AlreadyInitialized;
        }
        self.initialized = true;

        let raw = match self.storage.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=cart_load module=store status=ok result=no_snapshot");
                return LoadOutcome::NoSnapshot;
            }
            Err(err) => {
                warn!(
                    "event=cart_load module=store status=error error_code=storage_read_failed error={err}"
                );
                return LoadOutcome::Unavailable;
            }
        };

        match snapshot::decode(&raw) {
            Ok(state) => {
                let items = state.len();
                self.state = state;
                info!("event=cart_load module=store status=ok result=restored items={items}");
                LoadOutcome::Restored { items }
            }
            Err(err) => {
                warn!(
                    "event=cart_load module=store status=error error_code=snapshot_invalid error={err}"
                );
                LoadOutcome::Discarded
            }
        }
    }

    /// Adds one unit of `product`, appending a new line when absent.
    ///
    /// # Errors
    /// - Returns the validation error for an invalid new line; state and
    ///   storage are left untouched.
    pub fn add_to_cart(
        &mut self,
        product: NewCartItem,
    ) -> Result<PersistOutcome, CartItemValidationError> {
        let product_id = product.id.clone();
        let next = self.state.with_added(product)?;
        Ok(self.commit("add", &product_id, next))
    }

    /// Adds one unit to an existing line; unknown ids leave the cart as is.
    pub fn increment(&mut self, id: &str) -> PersistOutcome {
        let next = self.state.with_incremented(id);
        self.commit("increment", id, next)
    }

    /// Removes one unit; a line at quantity 1 is dropped entirely.
    pub fn decrement(&mut self, id: &str) -> PersistOutcome {
        let next = self.state.with_decremented(id);
        self.commit("decrement", id, next)
    }

    /// Current cart lines in display order.
    pub fn products(&self) -> &[CartItem] {
        self.state.items()
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn commit(&mut self, op: &'static str, product_id: &str, next: CartState) -> PersistOutcome {
        let changed = next != self.state;
        self.state = next;
        debug!(
            "event=cart_mutation module=store op={op} product_id={product_id} changed={changed} items={}",
            self.state.len()
        );
        self.persist()
    }

    fn persist(&self) -> PersistOutcome {
        let result = snapshot::encode(&self.state)
            .map_err(PersistError::Encode)
            .and_then(|raw| {
                self.storage
                    .set(SNAPSHOT_KEY, &raw)
                    .map_err(PersistError::Storage)
            });

        match result {
            Ok(()) => PersistOutcome::Saved,
            Err(err) => {
                warn!(
                    "event=cart_persist module=store status=error error_code=snapshot_write_failed error={err}"
                );
                PersistOutcome::Failed(err)
            }
        }
    }
}
