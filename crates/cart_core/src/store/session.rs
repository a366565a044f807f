//! Session scope for consumer access to the cart store.
//!
//! # Responsibility
//! - Hold at most one `CartStore` per application session.
//! - Reject cart access outside an open session.
//!
//! # Invariants
//! - `open` always leaves exactly one initialized store in the slot.
//! - `with_store` never creates a store implicitly.

use crate::storage::KeyValueStore;
use crate::store::cart_store::{CartStore, LoadOutcome};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Misuse of the cart session scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    NotOpen,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(
                f,
                "cart operations must run inside an open cart session; open one first"
            ),
        }
    }
}

impl Error for SessionError {}

/// Explicit slot owning the session's cart store.
pub struct CartSession<S: KeyValueStore> {
    store: Option<CartStore<S>>,
}

impl<S: KeyValueStore> Default for CartSession<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: KeyValueStore> CartSession<S> {
    pub const fn new() -> Self {
        Self { store: None }
    }

    /// Starts a session backed by `storage`, restoring its snapshot.
    ///
    /// An already active session is ended first.
    pub fn open(&mut self, storage: S) -> LoadOutcome {
        if self.store.is_some() {
            info!("event=cart_session module=session status=replaced");
        }
        let (store, outcome) = CartStore::open(storage);
        self.store = Some(store);
        info!("event=cart_session module=session status=open load={outcome:?}");
        outcome
    }

    /// Ends the session. Returns whether one was active.
    pub fn close(&mut self) -> bool {
        let was_open = self.store.take().is_some();
        if was_open {
            info!("event=cart_session module=session status=closed");
        }
        was_open
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Runs `f` against the active store.
    ///
    /// # Errors
    /// - `SessionError::NotOpen` when no session is active.
    pub fn with_store<T>(
        &mut self,
        f: impl FnOnce(&mut CartStore<S>) -> T,
    ) -> Result<T, SessionError> {
        match self.store.as_mut() {
            Some(store) => Ok(f(store)),
            None => {
                error!("event=cart_session module=session status=error error_code=session_not_open");
                Err(SessionError::NotOpen)
            }
        }
    }
}
