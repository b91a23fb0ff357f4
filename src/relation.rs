//! External collaborator interfaces: the storage-layer relation the
//! compiled predicates are applied to, and the value source supplying
//! runtime filter input.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::filter_spec::KeyPath;
use crate::join_resolver::JoinTree;

/// Comparison operators the storage collaborator must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Neq,
    In,
    NotIn,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    IsNull,
    IsNotNull,
}

impl CompareOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Between => "BETWEEN",
            CompareOp::IsNull => "IS NULL",
            CompareOp::IsNotNull => "IS NOT NULL",
        }
    }
}

/// A column reference. Nested fields are qualified through the collection
/// alias their join introduces; top-level fields are bare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn bare(name: impl Into<String>) -> Self {
        ColumnRef {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        ColumnRef {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}.{}", qualifier, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Read access to the raw filter input.
///
/// `None` means the key is absent and imposes no constraint; an explicit
/// JSON null is a present value (null equality / nullability operators
/// stay expressible).
pub trait ValueSource {
    fn get(&self, path: &KeyPath) -> Option<&Value>;
}

impl ValueSource for serde_json::Map<String, Value> {
    fn get(&self, path: &KeyPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = serde_json::Map::get(self, first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

impl ValueSource for Value {
    fn get(&self, path: &KeyPath) -> Option<&Value> {
        ValueSource::get(self.as_object()?, path)
    }
}

/// The storage collaborator. Implementations translate these calls into
/// their engine's query composition; every method takes and returns the
/// relation by value so filters chain, and `Clone` lets alternatives for
/// an OR branch derive from the same base.
pub trait Relation: Clone + Sized {
    /// Join along the resolved nested-association descriptor.
    fn join(self, joins: &JoinTree) -> Self;

    /// Structured comparison on a column. Membership operators receive the
    /// whole collection as `value`; `Between` receives a two-element array.
    fn where_cmp(self, column: &ColumnRef, op: CompareOp, value: &Value) -> Self;

    /// Raw predicate fragment with positional `?` binds.
    fn where_raw(self, fragment: &str, binds: &[Value]) -> Self;

    /// Disjunction with another relation derived from the same base.
    fn or(self, other: Self) -> Self;

    /// The empty-result sentinel.
    fn none(self) -> Self;
}
