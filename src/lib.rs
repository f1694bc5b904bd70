//! Toolshelf - catalog service for AI tools
//!
//! Browsing, filtering, comparing, reviewing and administering tool listings
//! on top of pluggable data store, file storage and identity collaborators.
//! The listing pipeline in [`catalog`] is pure and synchronous; everything
//! that talks to a collaborator lives in [`services`].

pub mod app;
pub mod auth;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod files;
pub mod forms;
pub mod handlers;
pub mod ingestion;
pub mod services;
pub mod state;
pub mod store;

// Re-export key types for convenience
pub use app::build_router;
pub use catalog::{FilterCriteria, Pricing, SortKey, Tool};
pub use compare::Comparison;
pub use config::{BackendMode, Config};
pub use error::{AppError, Result};
pub use state::AppState;
