//! Configuration module for link rewriting
//!
//! This module provides the `RewriteConfig` struct and its type-safe builder
//! describing the wiki being archived and which media kinds are scraped.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{RewriteConfigBuilder, WithBaseUrl};
pub use types::RewriteConfig;
