//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cart_core` linkage without the Flutter/FFI runtime.
//! - Print the cart saved at the configured database path.

use cart_core::{CartConfig, CartStore, SqliteKeyValueStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("cart_core ping={}", cart_core::ping());
    println!("cart_core version={}", cart_core::core_version());

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("cart_cli config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let storage = match SqliteKeyValueStore::open(&config.db_path) {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("cart_cli open error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut store = CartStore::new(storage);
    let outcome = store.initialize();
    println!("cart db={} load={outcome:?}", config.db_path.display());
    for item in store.products() {
        println!("  {} x{} @ {:.2}", item.id, item.quantity, item.price);
    }
    println!(
        "cart items={} units={} subtotal={:.2}",
        store.state().len(),
        store.state().total_quantity(),
        store.state().subtotal()
    );
    ExitCode::SUCCESS
}
