//! # NCM Lookup Core
//!
//! Shared, WASM-safe logic for NCM Lookup: data models, code keys, text
//! utilities, snapshot store abstraction, the context cache, and the
//! dataset holder.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. It compiles to both native targets and
//! `wasm32-unknown-unknown`.

pub mod codes;
pub mod context;
pub mod dataset;
pub mod format;
pub mod models;
pub mod storage;
pub mod store;
