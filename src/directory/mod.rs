//! Street Directory Module
//!
//! Owns the address-range records and every operation that writes or
//! aggregates them.
//!
//! ## Submodules
//! - **`store`**: the `RecordStore` seam and the `DashMap`-backed `MemoryStore`.
//! - **`handlers`**: CRUD, section lookup, section summary and statistics endpoints.
//! - **`reports`**: pure aggregations used by the admin endpoints and the CLI.
//! - **`import`**: loader for census SQL dumps.
//! - **`types`**: records and DTOs.

pub mod handlers;
pub mod import;
pub mod reports;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
