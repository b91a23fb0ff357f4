//! Merges the relation prefixes of many key paths into one deduplicated
//! join tree — the nested-association descriptor handed to the storage
//! collaborator.
//!
//! The first prefix observed at a position becomes that position's value.
//! When a second, distinct child needs the same position, the position is
//! promoted from a single branch to a branch list (one parent joining
//! several associations). Growing structure beneath an entry of an
//! already-promoted list is irreconcilable and fails compilation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter_spec::KeyPath;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JoinError {
    #[error(
        "Irreconcilable join conflict: cannot nest `{child}` beneath `{parent}` once `{parent}` sits in a promoted branch list"
    )]
    Conflict { parent: String, child: String },
}

/// A node beneath a relation in the join tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinNode {
    /// Join the relation itself; nothing beneath
    Terminal,
    /// A single nested association
    One(String, Box<JoinNode>),
    /// Promoted branch list: several distinct associations under one parent
    Many(Vec<(String, JoinNode)>),
}

/// The merged join tree: root relations in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinTree {
    pub roots: Vec<(String, JoinNode)>,
}

/// Fold the relation prefixes of `key_paths` into one tree. Paths with no
/// relation prefix contribute nothing; an all-terminal input resolves to
/// an empty join tree (`None`). Runs in O(total path length).
pub fn resolve(key_paths: &[KeyPath]) -> Result<Option<JoinTree>, JoinError> {
    let mut tree = JoinTree::default();
    for path in key_paths {
        let prefix = path.relations();
        if prefix.is_empty() {
            continue;
        }
        tree.insert(prefix)?;
    }
    Ok((!tree.roots.is_empty()).then_some(tree))
}

impl JoinTree {
    fn insert(&mut self, prefix: &[String]) -> Result<(), JoinError> {
        let (first, rest) = prefix.split_first().expect("non-empty prefix");
        match self.roots.iter().position(|(name, _)| name == first) {
            Some(index) => insert_into(&mut self.roots[index].1, rest),
            None => {
                self.roots.push((first.clone(), node_from(rest)));
                Ok(())
            }
        }
    }
}

fn node_from(rest: &[String]) -> JoinNode {
    match rest.split_first() {
        None => JoinNode::Terminal,
        Some((head, tail)) => JoinNode::One(head.clone(), Box::new(node_from(tail))),
    }
}

fn insert_into(node: &mut JoinNode, rest: &[String]) -> Result<(), JoinError> {
    let (head, tail) = match rest.split_first() {
        // Joining the parent alone adds nothing new.
        None => return Ok(()),
        Some(split) => split,
    };
    match node {
        JoinNode::Terminal => {
            *node = JoinNode::One(head.clone(), Box::new(node_from(tail)));
            Ok(())
        }
        JoinNode::One(child, sub) if child == head => insert_into(sub, tail),
        JoinNode::One(..) => {
            // Scalar -> list promotion: the parent now branches into two
            // distinct associations. The existing branch keeps its subtree.
            let existing = std::mem::replace(node, JoinNode::Terminal);
            let (child, sub) = match existing {
                JoinNode::One(child, sub) => (child, *sub),
                _ => unreachable!("matched One above"),
            };
            *node = JoinNode::Many(vec![(child, sub), (head.clone(), node_from(tail))]);
            Ok(())
        }
        JoinNode::Many(entries) => match entries.iter().position(|(name, _)| name == head) {
            Some(index) => {
                let (name, sub) = &entries[index];
                if subsumes(sub, tail) {
                    Ok(())
                } else {
                    Err(JoinError::Conflict {
                        parent: name.clone(),
                        child: tail.first().cloned().unwrap_or_default(),
                    })
                }
            }
            // Absorbing another sibling is the same promotion rule.
            None => {
                entries.push((head.clone(), node_from(tail)));
                Ok(())
            }
        },
    }
}

/// Whether `node` already contains the whole chain `rest`.
fn subsumes(node: &JoinNode, rest: &[String]) -> bool {
    let (head, tail) = match rest.split_first() {
        None => return true,
        Some(split) => split,
    };
    match node {
        JoinNode::Terminal => false,
        JoinNode::One(child, sub) => child == head && subsumes(sub, tail),
        JoinNode::Many(entries) => entries
            .iter()
            .find(|(name, _)| name == head)
            .is_some_and(|(_, sub)| subsumes(sub, tail)),
    }
}
