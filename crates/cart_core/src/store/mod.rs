//! Cart store and its session scope.
//!
//! # Responsibility
//! - Apply cart mutations and keep the persisted snapshot in sync.
//! - Give consumers scoped access to one store per application session.

pub mod cart_store;
pub mod session;
