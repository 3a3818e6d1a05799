//! Shared test support for the lens dashboard crates
//!
//! This crate provides:
//! - `CatalogBuilder`, a fluent builder for small issue graphs
//! - Ready-made catalogs for the end-to-end scenarios (`fixtures`)
//! - Proptest strategies for random catalogs, lenses, key and intent scripts

#![forbid(unsafe_code)]

pub mod builder;
pub mod fixtures;
pub mod strategies;

// Re-export key types for convenience
pub use builder::CatalogBuilder;
pub use strategies::{
    INTENT_POOL, KEY_POOL, LABEL_POOL, arb_catalog, arb_catalog_and_lens, arb_intent_script,
    arb_intent_token, arb_key_name, arb_key_script, arb_lens, issue_id, proptest_config,
    proptest_config_scripted,
};
