//! Shared types, error model, and configuration for reviewharvest.
//!
//! This crate is the foundation depended on by all other reviewharvest crates.
//! It provides:
//! - [`ReviewHarvestError`] — the unified error type
//! - Domain types ([`AppId`], [`Cursor`], [`Review`], [`ReviewPage`])
//! - Configuration ([`AppConfig`], [`HarvestConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, HarvestConfig, HttpConfig, PurchaseType, QueryConfig, ReviewFilter, ReviewType,
    StorefrontConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, ReviewHarvestError};
pub use types::{
    AppId, Cursor, LISTING_PAGE_SIZE, MAX_PAGE_SIZE, Review, ReviewPage, START_CURSOR,
};
