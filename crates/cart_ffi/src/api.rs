//! FFI cart API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the cart session and its operations to Dart via FRB.
//! - Map core outcomes into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Cart operations outside an open session return `ok = false`.
//! - Every successful response carries the current cart lines.

use cart_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CartConfig, CartItem, CartSession, CartStore, LoadOutcome, NewCartItem, PersistOutcome,
    SessionError, SqliteKeyValueStore,
};
use log::warn;
use std::sync::{Mutex, MutexGuard, PoisonError};

static CART_SESSION: Mutex<CartSession<SqliteKeyValueStore>> = Mutex::new(CartSession::new());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One cart line as seen by Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

/// Response envelope for cart session and mutation calls.
#[derive(Debug, Clone, PartialEq)]
pub struct CartResponse {
    /// Whether the call was applied.
    pub ok: bool,
    /// Current cart lines (empty on failure).
    pub products: Vec<CartLine>,
    /// Mutations only: whether the post-mutation snapshot reached storage.
    /// `None` for reads, session open and failed calls, which write nothing.
    pub persisted: Option<bool>,
    /// Human-readable diagnostics for logs/UI.
    pub message: String,
}

/// Cart totals for badges and checkout buttons.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub ok: bool,
    pub distinct_items: u32,
    pub total_quantity: u64,
    pub subtotal: f64,
    pub message: String,
}

impl CartResponse {
    fn success(
        store: &CartStore<SqliteKeyValueStore>,
        persisted: Option<bool>,
        message: String,
    ) -> Self {
        Self {
            ok: true,
            products: store.products().iter().map(to_cart_line).collect(),
            persisted,
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            products: Vec::new(),
            persisted: None,
            message: message.into(),
        }
    }
}

/// Opens the cart session on the database at `db_path`.
///
/// # FFI contract
/// - Sync call; opens SQLite and restores the saved cart.
/// - Replaces any active session.
/// - A missing or corrupt saved cart opens as an empty cart with `ok = true`.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_open_session(db_path: String) -> CartResponse {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return CartResponse::failure("cart_open_session failed: db_path cannot be empty");
    }
    open_session(CartConfig::new(trimmed))
}

/// Opens the cart session at the path from `CART_DB_PATH` (or temp dir).
#[flutter_rust_bridge::frb(sync)]
pub fn cart_open_default_session() -> CartResponse {
    match CartConfig::from_env() {
        Ok(config) => open_session(config),
        Err(err) => CartResponse::failure(format!("cart_open_session failed: {err}")),
    }
}

/// Ends the active cart session. Returns whether one was open.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_close_session() -> bool {
    lock_session().close()
}

/// Returns the current cart lines.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_products() -> CartResponse {
    with_store("cart_products", |store| {
        CartResponse::success(store, None, format!("{} item(s).", store.products().len()))
    })
}

/// Adds one unit of a product, creating the line when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_add(id: String, title: String, image_url: String, price: f64) -> CartResponse {
    let product = NewCartItem::new(id.trim(), title, image_url, price);
    with_store("cart_add", |store| match store.add_to_cart(product) {
        Ok(outcome) => mutation_response(store, outcome, "Added to cart."),
        Err(err) => CartResponse::failure(format!("cart_add failed: {err}")),
    })
}

/// Adds one unit to an existing line; unknown ids are a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_increment(id: String) -> CartResponse {
    with_store("cart_increment", |store| {
        let outcome = store.increment(id.trim());
        mutation_response(store, outcome, "Quantity increased.")
    })
}

/// Removes one unit; a line at quantity 1 is removed.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_decrement(id: String) -> CartResponse {
    with_store("cart_decrement", |store| {
        let outcome = store.decrement(id.trim());
        mutation_response(store, outcome, "Quantity decreased.")
    })
}

/// Returns line count, unit count and subtotal of the cart.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_summary() -> CartSummary {
    let result = lock_session().with_store(|store| {
        let state = store.state();
        CartSummary {
            ok: true,
            distinct_items: u32::try_from(state.len()).unwrap_or(u32::MAX),
            total_quantity: state.total_quantity(),
            subtotal: state.subtotal(),
            message: String::new(),
        }
    });
    result.unwrap_or_else(|err| CartSummary {
        ok: false,
        distinct_items: 0,
        total_quantity: 0,
        subtotal: 0.0,
        message: format!("cart_summary failed: {err}"),
    })
}

fn open_session(config: CartConfig) -> CartResponse {
    let storage = match SqliteKeyValueStore::open(&config.db_path) {
        Ok(storage) => storage,
        Err(err) => return CartResponse::failure(format!("cart DB open failed: {err}")),
    };

    let mut session = lock_session();
    let outcome = session.open(storage);
    let message = load_message(outcome);
    session
        .with_store(|store| CartResponse::success(store, None, message))
        .unwrap_or_else(|err| CartResponse::failure(format!("cart_open_session failed: {err}")))
}

fn with_store(
    op: &str,
    f: impl FnOnce(&mut CartStore<SqliteKeyValueStore>) -> CartResponse,
) -> CartResponse {
    lock_session()
        .with_store(f)
        .unwrap_or_else(|err: SessionError| CartResponse::failure(format!("{op} failed: {err}")))
}

fn mutation_response(
    store: &CartStore<SqliteKeyValueStore>,
    outcome: PersistOutcome,
    message: &str,
) -> CartResponse {
    match outcome {
        PersistOutcome::Saved => CartResponse::success(store, Some(true), message.to_string()),
        PersistOutcome::Failed(err) => CartResponse::success(
            store,
            Some(false),
            format!("{message} Saving the cart failed: {err}"),
        ),
    }
}

fn load_message(outcome: LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Restored { items } => format!("Restored {items} item(s)."),
        LoadOutcome::NoSnapshot => "Started an empty cart.".to_string(),
        LoadOutcome::Discarded => "Saved cart was unreadable; started an empty cart.".to_string(),
        LoadOutcome::Unavailable => "Saved cart could not be read; started an empty cart.".to_string(),
        LoadOutcome::AlreadyInitialized => "Cart already loaded.".to_string(),
    }
}

fn lock_session() -> MutexGuard<'static, CartSession<SqliteKeyValueStore>> {
    CART_SESSION.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("event=cart_session module=ffi status=recovered reason=lock_poisoned");
        poisoned.into_inner()
    })
}

fn to_cart_line(item: &CartItem) -> CartLine {
    CartLine {
        id: item.id.clone(),
        title: item.title.clone(),
        image_url: item.image_url.clone(),
        price: item.price,
        quantity: item.quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        cart_add, cart_close_session, cart_decrement, cart_increment, cart_open_session,
        cart_products, cart_summary, core_version, init_logging, ping,
    };
    use std::sync::Mutex;

    // Tests share the process-wide cart session.
    static SESSION_GUARD: Mutex<()> = Mutex::new(());

    fn quantities(response: &super::CartResponse) -> Vec<(String, u32)> {
        response
            .products
            .iter()
            .map(|line| (line.id.clone(), line.quantity))
            .collect()
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn operations_without_session_fail() {
        let _guard = SESSION_GUARD.lock().unwrap_or_else(|p| p.into_inner());
        cart_close_session();

        let response = cart_increment("a".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("open cart session"));
        assert!(!cart_products().ok);
        assert!(!cart_summary().ok);
    }

    #[test]
    fn session_roundtrip_restores_cart() {
        let _guard = SESSION_GUARD.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cart.sqlite3").to_str().unwrap().to_string();

        let opened = cart_open_session(db_path.clone());
        assert!(opened.ok);
        assert_eq!(opened.persisted, None);
        cart_add("a".to_string(), "Mug".to_string(), "mug.png".to_string(), 4.0);
        cart_add("b".to_string(), "Cup".to_string(), "cup.png".to_string(), 2.0);
        cart_increment("a".to_string());
        let response = cart_decrement("b".to_string());
        assert!(response.ok);
        assert_eq!(response.persisted, Some(true));
        assert_eq!(quantities(&response), vec![("a".to_string(), 2)]);
        let listed = cart_products();
        assert!(listed.ok);
        assert_eq!(listed.persisted, None);
        assert!(cart_close_session());

        let reopened = cart_open_session(db_path);
        assert!(reopened.ok, "{}", reopened.message);
        assert_eq!(quantities(&reopened), vec![("a".to_string(), 2)]);

        let summary = cart_summary();
        assert_eq!(summary.distinct_items, 1);
        assert_eq!(summary.total_quantity, 2);
        assert_eq!(summary.subtotal, 8.0);
        cart_close_session();
    }

    #[test]
    fn invalid_product_is_rejected() {
        let _guard = SESSION_GUARD.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cart.sqlite3").to_str().unwrap().to_string();
        assert!(cart_open_session(db_path).ok);

        let response = cart_add(" ".to_string(), "t".to_string(), "i".to_string(), 1.0);
        assert!(!response.ok);
        assert!(response.message.contains("cart_add failed"));
        cart_close_session();
    }
}
