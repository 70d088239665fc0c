//! Municipal Street Directory Library
//!
//! Core modules behind the `callejero` binary (`main.rs`).
//!
//! ## Modules
//! - **`resolver`**: The address resolution engine. Normalizes free-text street
//!   queries, matches them against house-number ranges with type and parity
//!   rules, and attaches coordinates from an external geocoding service.
//! - **`directory`**: The record store and the plumbing around it (CRUD,
//!   section lookups, statistics, SQL-dump import).
//! - **`config`**: Command-line and environment configuration.
//! - **`error`**: The request-level error taxonomy and its HTTP mapping.

pub mod config;
pub mod directory;
pub mod error;
pub mod resolver;

use axum::Extension;
use axum::Router;
use axum::routing::{get, put};
use directory::handlers::*;
use resolver::engine::AddressResolver;
use resolver::handlers::handle_search;
use std::sync::Arc;

/// HTTP routes of the service, wired to an injected store and resolver.
pub fn router(store: SharedStore, resolver: Arc<AddressResolver>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/search", get(handle_search))
        .route("/api/streets", get(handle_street_lookup))
        .route("/api/streets/:id", get(handle_get_entry))
        .route(
            "/api/admin/streets",
            get(handle_list_entries).post(handle_create_entry),
        )
        .route(
            "/api/admin/streets/:id",
            put(handle_update_entry).delete(handle_delete_entry),
        )
        .route("/api/admin/sections", get(handle_sections))
        .route("/api/admin/stats", get(handle_stats))
        .layer(Extension(store))
        .layer(Extension(resolver))
}
