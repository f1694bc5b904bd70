//! Ingestion of tool records from storage rows and seed files.
//!
//! Turns untyped rows (as returned by the data store) into typed `Tool`
//! entities, and loads seed data for local runs.

pub mod mapping;
pub mod seed;

pub use mapping::{map_row, map_rows, MappingError};
pub use seed::{load_seed_rows, SeedError};
