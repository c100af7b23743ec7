//! Flutter-Rust bridge wrapper for sentinel-core.
//!
//! This crate exposes the core through `flutter_rust_bridge` for the
//! Flutter app via Cargokit. Everything else is re-exported unchanged.

pub mod api;

pub use sentinel_core::*;
