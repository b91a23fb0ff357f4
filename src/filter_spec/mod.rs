//! The authoring surface: the declarative field-specification tree, the
//! parallel pattern-mode trees declared through `like`/`ilike`, and the
//! builder that assembles both with explicit nesting context.

pub mod ast;
pub mod builder;
pub mod errors;

pub use ast::{
    CaseSensitivity, FieldSpec, KeyPath, MatchMode, ModeNode, ModeTree, PatternSemantics,
};
pub use builder::{FilterSpec, FilterSpecBuilder};
pub use errors::SpecError;
