//! Address Resolution Module
//!
//! Resolves free-text street queries against the directory.
//!
//! ## Pipeline
//! 1. **Normalize** (`normalizer`): strip a recognised street-type prefix.
//! 2. **Match** (`matcher`): name substring, exact type, range containment and parity.
//! 3. **Enrich** (`enricher`): one concurrent geocoding lookup per match.
//! 4. **Compose** (`engine`): reject invalid input, return an empty list on no match.
//!
//! ## Submodules
//! - **`engine`**: `AddressResolver`, the pipeline entry point.
//! - **`geocoder`**: the `Geocoder` seam and the Nominatim client.
//! - **`handlers`**: HTTP handler for the search endpoint.
//! - **`types`**: request and response DTOs.

pub mod engine;
pub mod enricher;
pub mod geocoder;
pub mod handlers;
pub mod matcher;
pub mod normalizer;
pub mod types;
