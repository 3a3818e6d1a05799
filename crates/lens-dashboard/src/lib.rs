//! Interactive view state for the lens dashboard
//!
//! This crate provides:
//! - `LensDashboard`, one lens over a borrowed catalog with every key intent
//! - Flat, ego-centered, workstream and grouped views with their cursors
//! - Viewport and scroll arithmetic
//! - The scope input box and in-place fuzzy search
//! - Named keys, intents and the view-aware keymap
//! - Text dump reports and serializable snapshots

#![forbid(unsafe_code)]

pub mod dashboard;
pub mod grouped;
pub mod keys;
pub mod navigation;
pub mod report;
pub mod scope_input;
pub mod search;
pub mod viewport;
pub mod workstreams;

// Re-export key types for convenience
pub use dashboard::LensDashboard;
pub use keys::{BINDINGS, Intent, KeyBinding, KeyInput, KeyOutcome, bindings_for};
pub use report::DashboardSnapshot;
pub use viewport::Viewport;
