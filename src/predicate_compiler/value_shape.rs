//! Per-query value-shape resolution for fields without declared pattern
//! semantics. Checked in priority order: bound-alias mappings, explicit
//! operator mappings, two-element ranges, membership collections, plain
//! equality. Shape mismatches degrade to the next priority instead of
//! erroring, so partial user input stays permissive.

use serde_json::{Map, Value};

use super::ResolvedPredicate;
use crate::relation::CompareOp;

/// Keys that read as an inclusive lower bound.
pub const LOWER_BOUND_ALIASES: &[&str] = &["from", "since", "after", "start", "min"];
/// Keys that read as an inclusive upper bound.
pub const UPPER_BOUND_ALIASES: &[&str] = &["to", "until", "before", "end", "max"];

pub fn resolve_value_shape(value: &Value) -> Option<ResolvedPredicate> {
    match value {
        Value::Object(map) => resolve_mapping(map),
        Value::Array(items) => resolve_collection(items),
        // An explicit null is a present value: null equality.
        Value::Null => Some(ResolvedPredicate::Compare {
            op: CompareOp::Eq,
            value: Value::Null,
        }),
        scalar => Some(ResolvedPredicate::Compare {
            op: CompareOp::Eq,
            value: scalar.clone(),
        }),
    }
}

fn resolve_mapping(map: &Map<String, Value>) -> Option<ResolvedPredicate> {
    if let Some(between) = map.get("between") {
        match between {
            Value::Object(inner) => {
                if let Some(resolved) = resolve_bounds(inner) {
                    return Some(resolved);
                }
            }
            Value::Array(items) if items.len() == 2 => {
                return Some(ResolvedPredicate::Compare {
                    op: CompareOp::Between,
                    value: Value::Array(items.clone()),
                });
            }
            _ => {}
        }
    }

    if let Some(resolved) = resolve_bounds(map) {
        return Some(resolved);
    }
    if let Some(resolved) = resolve_explicit_operator(map) {
        return Some(resolved);
    }

    // Neither bound-like nor operator keys: equality against the whole value.
    Some(ResolvedPredicate::Compare {
        op: CompareOp::Eq,
        value: Value::Object(map.clone()),
    })
}

/// Both bounds present yields an inclusive `BETWEEN`; a single bound
/// yields the corresponding one-sided comparison.
fn resolve_bounds(map: &Map<String, Value>) -> Option<ResolvedPredicate> {
    let lower = first_alias(map, LOWER_BOUND_ALIASES);
    let upper = first_alias(map, UPPER_BOUND_ALIASES);
    match (lower, upper) {
        (Some(lower), Some(upper)) => Some(ResolvedPredicate::Compare {
            op: CompareOp::Between,
            value: Value::Array(vec![lower.clone(), upper.clone()]),
        }),
        (Some(lower), None) => Some(ResolvedPredicate::Compare {
            op: CompareOp::Gte,
            value: lower.clone(),
        }),
        (None, Some(upper)) => Some(ResolvedPredicate::Compare {
            op: CompareOp::Lte,
            value: upper.clone(),
        }),
        (None, None) => None,
    }
}

fn first_alias<'a>(map: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|key| map.get(*key))
        .filter(|value| !value.is_null())
}

fn resolve_explicit_operator(map: &Map<String, Value>) -> Option<ResolvedPredicate> {
    for (key, value) in map {
        let resolved = match key.as_str() {
            "neq" => ResolvedPredicate::Compare {
                op: CompareOp::Neq,
                value: value.clone(),
            },
            "not_in" => membership(CompareOp::NotIn, value),
            "in" => membership(CompareOp::In, value),
            "is_null" => null_check(value, false),
            "is_not_null" => null_check(value, true),
            "gt" => comparison(CompareOp::Gt, value),
            "gte" => comparison(CompareOp::Gte, value),
            "lt" => comparison(CompareOp::Lt, value),
            "lte" => comparison(CompareOp::Lte, value),
            _ => continue,
        };
        // The first recognized operator key wins; extra keys are ignored.
        return Some(resolved);
    }
    None
}

fn comparison(op: CompareOp, value: &Value) -> ResolvedPredicate {
    ResolvedPredicate::Compare {
        op,
        value: value.clone(),
    }
}

/// Membership against an empty collection must match nothing, never
/// everything and never a malformed clause. A scalar operand is treated
/// as a one-element collection.
fn membership(op: CompareOp, value: &Value) -> ResolvedPredicate {
    let items = match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    if items.is_empty() {
        return ResolvedPredicate::MatchNone;
    }
    ResolvedPredicate::Compare {
        op,
        value: Value::Array(items),
    }
}

/// `is_null: false` flips to a not-null check and vice versa; any non-bool
/// operand reads as true (the key's presence is the request).
fn null_check(value: &Value, not_null: bool) -> ResolvedPredicate {
    let requested = value.as_bool().unwrap_or(true);
    let op = match (not_null, requested) {
        (false, true) | (true, false) => CompareOp::IsNull,
        _ => CompareOp::IsNotNull,
    };
    ResolvedPredicate::Compare {
        op,
        value: Value::Null,
    }
}

fn resolve_collection(items: &[Value]) -> Option<ResolvedPredicate> {
    if items.is_empty() {
        return Some(ResolvedPredicate::MatchNone);
    }
    // A two-element ordered pair of comparable scalars reads as an
    // inclusive range.
    if items.len() == 2 && items.iter().all(range_endpoint) {
        return Some(ResolvedPredicate::Compare {
            op: CompareOp::Between,
            value: Value::Array(items.to_vec()),
        });
    }
    Some(ResolvedPredicate::Compare {
        op: CompareOp::In,
        value: Value::Array(items.to_vec()),
    })
}

fn range_endpoint(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_))
}
