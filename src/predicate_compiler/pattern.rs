//! Pattern-predicate synthesis: turns a declared match mode plus a runtime
//! value into a dialect-specific LIKE fragment with its bind groups.

use serde_json::Value;

use super::ResolvedPredicate;
use crate::filter_spec::PatternSemantics;
use crate::relation::ColumnRef;
use crate::sql_dialect::{DialectAdapter, MultiTermStrategy};

/// Resolve a pattern-declared field against its runtime value.
///
/// A scalar value is a single term; a collection is a multi-term match
/// (ANY term matching suffices). An empty collection matches nothing.
/// Values that cannot act as terms (null, mappings) impose no constraint.
pub fn resolve_pattern(
    column: &ColumnRef,
    value: &Value,
    semantics: &PatternSemantics,
    dialect: &dyn DialectAdapter,
) -> Option<ResolvedPredicate> {
    let raw_terms: Vec<String> = match value {
        Value::Null => return None,
        Value::Array(items) => {
            let terms: Vec<String> = items.iter().filter_map(term_of).collect();
            if terms.is_empty() {
                return Some(ResolvedPredicate::MatchNone);
            }
            terms
        }
        other => match term_of(other) {
            Some(term) => vec![term],
            None => {
                log::warn!(
                    "pattern filter on `{}` received a non-term value; imposing no constraint",
                    column
                );
                return None;
            }
        },
    };

    let prepared: Vec<String> = raw_terms
        .iter()
        .map(|term| dialect.prepare_term(term, semantics.mode, semantics.case))
        .collect();

    let column_expr = dialect.column_expr(&column.to_string(), semantics.case);
    let operator = dialect.like_operator(semantics.case);

    match dialect.multi_term_strategy() {
        MultiTermStrategy::ArrayAny => Some(ResolvedPredicate::Like {
            fragment: format!("{} {} ANY (ARRAY[?])", column_expr, operator),
            bind_groups: vec![vec![Value::Array(
                prepared.into_iter().map(Value::String).collect(),
            )]],
        }),
        MultiTermStrategy::OrChain => Some(ResolvedPredicate::Like {
            fragment: format!(
                "{} {} ?{}",
                column_expr,
                operator,
                dialect.escape_clause().unwrap_or("")
            ),
            bind_groups: prepared
                .into_iter()
                .map(|term| vec![Value::String(term)])
                .collect(),
        }),
    }
}

fn term_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
