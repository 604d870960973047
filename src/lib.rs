//! # NCM Lookup
//!
//! **Chapter and position descriptions for NCM tariff codes, cached locally.**
//!
//! NCM codes are hierarchical: the first two digits name a chapter, the
//! first four a position. NCM Lookup builds a lookup from those prefixes to
//! their descriptions out of the full NCM table, persists it as a single
//! versioned snapshot in SQLite, and restores it on later runs as long as
//! the snapshot is fresh (7 days) and of the current format.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐   ┌──────────────┐
//! │  Backend    │──▶│ DatasetHolder │──▶│ ContextCache │
//! │ (REST/JSON) │   │  full/filter  │   │ chapter/pos. │
//! └─────────────┘   └───────────────┘   └──────┬───────┘
//!                                              │ save / load
//!                                              ▼
//!                                      ┌───────────────┐
//!                                      │ContextStorage │
//!                                      │ SQLite record │
//!                                      └───────────────┘
//! ```
//!
//! The storage-agnostic pieces (models, code keys, text helpers, the cache,
//! the dataset holder) live in [`ncm_lookup_core`]; this crate adds the
//! native backends.
//!
//! ## Quick Start
//!
//! ```bash
//! ncm init                              # create database
//! ncm hydrate --file data/ncm.json      # build the snapshot from a dump
//! ncm hydrate                           # ... or from the backend
//! ncm describe 0101.21.00 84            # look up descriptions
//! ncm info                              # snapshot size and age
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Versioned schema setup |
//! | [`sqlite_store`] | SQLite snapshot store with a lazily opened pool |
//! | [`backend`] | REST client for the backend serving the NCM table |
//! | [`cache_cmd`] | `hydrate`, `describe`, `info`, `clear` commands |
//! | [`text_cmd`] | Code and text utility commands |

pub mod backend;
pub mod cache_cmd;
pub mod config;
pub mod db;
pub mod migrate;
pub mod sqlite_store;
pub mod text_cmd;

pub use ncm_lookup_core::{codes, context, dataset, format, models, storage, store};
