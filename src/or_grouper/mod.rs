//! Groups predicate descriptors that share an OR-marked scope.
//!
//! Grouping happens over the extraction order in a single left-to-right
//! pass: an OR-marked target joins the group currently being assembled
//! (anchored by the sibling declared immediately before its marker), and
//! the group flushes as soon as the walk leaves the OR-marked scope.
//! Within a group predicates combine with OR; across groups with AND.

use serde::{Deserialize, Serialize};

use crate::path_extractor::FieldTarget;
use crate::predicate_compiler::PredicateDescriptor;

/// Descriptors whose predicates OR together. Singleton groups are the
/// common case; membership is fixed at specification time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrGroup {
    pub members: Vec<PredicateDescriptor>,
}

/// Fold the descriptor list (parallel to `targets`) into its groups.
pub fn group(targets: &[FieldTarget], descriptors: Vec<PredicateDescriptor>) -> Vec<OrGroup> {
    debug_assert_eq!(targets.len(), descriptors.len());

    let mut groups: Vec<OrGroup> = Vec::new();
    for (target, descriptor) in targets.iter().zip(descriptors) {
        match (&target.or_scope, groups.last_mut()) {
            (Some(_), Some(current)) => current.members.push(descriptor),
            // An OR target with nothing before it is rejected during
            // extraction; if one slips through it stands alone.
            _ => groups.push(OrGroup {
                members: vec![descriptor],
            }),
        }
    }

    log::debug!(
        "grouped {} descriptor(s) into {} predicate group(s)",
        groups.iter().map(|g| g.members.len()).sum::<usize>(),
        groups.len()
    );
    groups
}
