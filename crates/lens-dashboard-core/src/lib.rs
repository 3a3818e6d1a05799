//! Core model and materialization pipeline for the lens dashboard
//!
//! This crate provides:
//! - The issue model and catalog index (`Issue`, `Catalog`, `CatalogIndex`)
//! - Lens descriptors and per-depth primary sets (`LensKind`, `LensDescriptor`)
//! - Scope filtering (`Scope`, `ScopeMode`)
//! - Tree and ego-centered layouts with tree-drawing metadata
//! - Workstream partitioning and attribute grouping
//! - The lens selector and a fuzzy matcher
//! - Configuration (`DashboardConfig`, environment parsing)
//! - Common error types

#![forbid(unsafe_code)]

pub mod catalog;
pub mod centrality;
pub mod config;
pub mod depth;
pub mod ego;
pub mod error;
pub mod flatten;
pub mod fuzzy;
pub mod grouping;
pub mod lens;
pub mod models;
pub mod scope;
pub mod selector;
pub mod sorting;
pub mod tree;
pub mod workstream;

// Re-export key types for convenience
pub use catalog::{Catalog, CatalogIndex, IssueIdx, IssueSet};
pub use centrality::{Centrality, CentralityRank, CentralityTable};
pub use config::{DEFAULT_UNBOUNDED_DEPTH, DashboardConfig, ViewMode};
pub use depth::DepthOption;
pub use ego::{EgoLayout, EgoRow, build_ego_layout};
pub use error::{Error as LensError, Result as LensResult};
pub use flatten::{FlatNode, flatten, tree_prefix};
pub use grouping::{GroupByMode, GroupedSection, Grouper};
pub use lens::{LensDescriptor, LensKind, PrimaryTable};
pub use models::{Dependency, DependencyKind, EffectiveStatus, Issue, IssueType, Status};
pub use scope::{Scope, ScopeMode};
pub use selector::{LensItem, LensItemKind, LensSelection, LensSelector, SearchMode};
pub use sorting::{LabelCount, compare_hierarchical_ids, sort_by_status_priority};
pub use tree::{Forest, TreeBuilder, TreeNode, TreeStats};
pub use workstream::{
    ComponentPartitioner, CrossBlocker, GroupingOptions, PartitionInput, Partitioner, Workstream,
    subdivide_all, workstream_tree,
};
