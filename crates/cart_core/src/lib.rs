//! Core cart state for the mobile shop app.
//! This crate owns cart invariants and their device-local persistence.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cart_item::{CartItem, CartItemValidationError, NewCartItem, ProductId};
pub use model::cart_state::{CartState, CartStateError};
pub use snapshot::{SnapshotError, SNAPSHOT_KEY};
pub use storage::{
    InMemoryKeyValueStore, KeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use store::cart_store::{CartStore, LoadOutcome, PersistError, PersistOutcome};
pub use store::session::{CartSession, SessionError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
