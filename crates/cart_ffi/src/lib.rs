//! Flutter bridge for the cart core.

pub mod api;
