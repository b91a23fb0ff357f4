//! relsieve - declarative filter compilation for relational backends
//!
//! This crate compiles a nested specification of filterable fields through:
//! - Flattening the specification tree into key paths with pattern semantics
//! - Merging cross-table paths into a deduplicated join tree
//! - Per-backend pattern-match fragment synthesis (five dialect profiles)
//! - Reusable predicate descriptors resolved against runtime values
//! - AND/OR predicate grouping applied to an abstract relation

pub mod utils;

pub mod filter_pipeline;
pub mod filter_spec;
pub mod join_resolver;
pub mod or_grouper;
pub mod path_extractor;
pub mod predicate_compiler;
pub mod relation;
pub mod sql_dialect;
