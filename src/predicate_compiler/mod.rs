//! Turns extracted field targets into immutable predicate descriptors and
//! resolves each descriptor against a runtime value: declared pattern
//! semantics first, value-shape inspection otherwise.

pub mod pattern;
pub mod value_shape;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter_spec::{KeyPath, PatternSemantics};
use crate::path_extractor::FieldTarget;
use crate::relation::{ColumnRef, CompareOp, Relation};
use crate::sql_dialect::DialectAdapter;
use crate::utils::pluralize;

/// A compiled, immutable predicate for one terminal field. Built once per
/// specification; the non-pattern operator kind is resolved per query from
/// the shape of the runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateDescriptor {
    /// Stripped specification path (relations + column).
    pub key_path: KeyPath,
    /// Where the runtime value is read from.
    pub value_path: KeyPath,
    /// Column reference, qualified through the collection alias of the
    /// last relation segment when the field is nested.
    pub column: ColumnRef,
    /// Declared pattern semantics, if any.
    pub pattern: Option<PatternSemantics>,
}

/// Descriptor construction is pure; the order of the input targets is
/// preserved so OR grouping can zip against it.
pub fn compile(targets: &[FieldTarget]) -> Vec<PredicateDescriptor> {
    targets
        .iter()
        .map(|target| {
            // A nested field qualifies through the pluralized name of its
            // innermost relation: one-to-many semantics come from the inner
            // join plus this filter, so a parent matches when ANY joined
            // row satisfies the predicate.
            let column = match target.key_path.relations().last() {
                Some(relation) => {
                    ColumnRef::qualified(pluralize(relation), target.key_path.column())
                }
                None => ColumnRef::bare(target.key_path.column()),
            };
            PredicateDescriptor {
                key_path: target.key_path.clone(),
                value_path: target.value_path.clone(),
                column,
                pattern: target.pattern,
            }
        })
        .collect()
}

/// What one descriptor resolves to against one present runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPredicate {
    /// A structured comparison through `Relation::where_cmp`.
    Compare { op: CompareOp, value: Value },
    /// A raw LIKE fragment; each bind group is one application of the
    /// fragment, multiple groups OR-chain.
    Like {
        fragment: String,
        bind_groups: Vec<Vec<Value>>,
    },
    /// Matches no rows (empty membership short-circuit).
    MatchNone,
}

impl PredicateDescriptor {
    /// Resolve this descriptor against a present runtime value. `None`
    /// means the value imposes no constraint after all (shape degradation
    /// never errors).
    pub fn resolve(
        &self,
        value: &Value,
        dialect: &dyn DialectAdapter,
    ) -> Option<ResolvedPredicate> {
        match &self.pattern {
            Some(semantics) => pattern::resolve_pattern(&self.column, value, semantics, dialect),
            None => value_shape::resolve_value_shape(value),
        }
    }
}

impl ResolvedPredicate {
    /// Apply to a relation. OR-chained bind groups derive each alternative
    /// from the same base, mirroring how the composed relation is built.
    pub fn apply<R: Relation>(&self, base: R, column: &ColumnRef) -> R {
        match self {
            ResolvedPredicate::Compare { op, value } => base.where_cmp(column, *op, value),
            ResolvedPredicate::Like {
                fragment,
                bind_groups,
            } => {
                let mut groups = bind_groups.iter();
                let first = match groups.next() {
                    Some(group) => group,
                    None => return base.none(),
                };
                let mut relation = base.clone().where_raw(fragment, first);
                for group in groups {
                    relation = relation.or(base.clone().where_raw(fragment, group));
                }
                relation
            }
            ResolvedPredicate::MatchNone => base.none(),
        }
    }
}
