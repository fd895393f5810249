//! Lango API Library Crate
//!
//! HTTP surface of the coach: configuration, the file-backed queue store,
//! prompt template loading, handlers and routing. The `api` binary is a thin
//! wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod store;
pub mod templates;
