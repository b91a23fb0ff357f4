use thiserror::Error;

use crate::filter_spec::SpecError;
use crate::join_resolver::JoinError;
use crate::sql_dialect::DialectError;

/// Compile-time failures. All of these are configuration-class errors:
/// raised once at specification compile time, fatal to that
/// specification's construction, never deferred to query time.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("Invalid filter specification: {0}")]
    Spec(#[from] SpecError),
    #[error("Join resolution failed: {0}")]
    Join(#[from] JoinError),
    #[error("Dialect configuration error: {0}")]
    Dialect(#[from] DialectError),
}
