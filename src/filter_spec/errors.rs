use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpecError {
    #[error("Empty nested mapping in field specification (every relation needs at least one field)")]
    EmptyMapping,
    #[error("Unsupported node in field specification: {node} (allowed: strings, arrays, objects)")]
    UnsupportedNode { node: String },
    #[error("Unsupported node in pattern-mode declaration: {node} (allowed: mode names and nested objects)")]
    UnsupportedModeNode { node: String },
    #[error("Unknown match mode `{mode}` (allowed: circumfix, prefix, suffix, or a circumfix synonym)")]
    UnknownMatchMode { mode: String },
    #[error("OR-marker `{or_key}` has no preceding sibling to group with")]
    OrphanOrMarker { or_key: String },
    #[error("Pattern mode declared for `{path}` but no such field exists in the specification")]
    ModeWithoutField { path: String },
}
