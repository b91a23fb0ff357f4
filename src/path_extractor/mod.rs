//! Flattens the field-specification tree into an ordered list of terminal
//! targets: key path, runtime value path, pattern semantics merged by
//! structural position, and OR-scope membership.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::filter_spec::{
    CaseSensitivity, FieldSpec, FilterSpec, KeyPath, PatternSemantics, SpecError,
};

/// One terminal field discovered in the specification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTarget {
    /// Relation traversals plus terminal column, OR-markers stripped.
    pub key_path: KeyPath,
    /// Where the runtime value is read from: the stripped path, or the
    /// configured query key when one is set.
    pub value_path: KeyPath,
    /// Pattern semantics declared for this structural position, if any.
    pub pattern: Option<PatternSemantics>,
    /// The stripped prefix at which the enclosing OR-marker sat; `None`
    /// for fields that AND with their siblings.
    pub or_scope: Option<Vec<String>>,
}

/// Walk the specification depth-first and produce its targets in
/// declaration order. Pure function over the input trees.
pub fn extract(spec: &FilterSpec) -> Result<Vec<FieldTarget>, SpecError> {
    let mut walk = Walk {
        spec,
        targets: Vec::new(),
        emitted: HashSet::new(),
        visited_positions: HashSet::new(),
    };
    walk.node(
        &spec.fields,
        &mut Vec::new(),
        &mut Vec::new(),
        None,
        /* first_sibling */ true,
    )?;
    walk.check_mode_coverage()?;

    log::debug!(
        "extracted {} filter target(s) from specification",
        walk.targets.len()
    );
    Ok(walk.targets)
}

struct Walk<'a> {
    spec: &'a FilterSpec,
    targets: Vec<FieldTarget>,
    /// Stripped key paths already emitted; duplicates collapse to the
    /// first occurrence.
    emitted: HashSet<Vec<String>>,
    /// Full structural positions visited, used to validate that every
    /// declared pattern mode annotates an existing field.
    visited_positions: HashSet<Vec<String>>,
}

impl Walk<'_> {
    fn node(
        &mut self,
        node: &FieldSpec,
        full: &mut Vec<String>,
        stripped: &mut Vec<String>,
        or_scope: Option<&Vec<String>>,
        first_sibling: bool,
    ) -> Result<(), SpecError> {
        match node {
            FieldSpec::Field(name) => {
                if name == &self.spec.or_key {
                    // A bare OR-marker carries no branch of its own.
                    return Err(SpecError::OrphanOrMarker {
                        or_key: self.spec.or_key.clone(),
                    });
                }
                self.terminal(name, full, stripped, or_scope);
                Ok(())
            }
            FieldSpec::Fields(items) => {
                // An array element equal to the OR-marker switches the
                // remaining siblings into the OR-group anchored by the
                // sibling before the marker.
                let mut scope: Option<Vec<String>> = or_scope.cloned();
                let mut seen_sibling = !first_sibling;
                for item in items {
                    if let FieldSpec::Field(name) = item {
                        if name == &self.spec.or_key {
                            if !seen_sibling {
                                return Err(SpecError::OrphanOrMarker {
                                    or_key: self.spec.or_key.clone(),
                                });
                            }
                            scope = Some(stripped.clone());
                            continue;
                        }
                    }
                    self.node(item, full, stripped, scope.as_ref(), !seen_sibling)?;
                    seen_sibling = true;
                }
                Ok(())
            }
            FieldSpec::Nested(entries) => {
                if entries.is_empty() {
                    return Err(SpecError::EmptyMapping);
                }
                let mut seen_sibling = !first_sibling;
                for (key, value) in entries {
                    if key == &self.spec.or_key {
                        if !seen_sibling {
                            return Err(SpecError::OrphanOrMarker {
                                or_key: self.spec.or_key.clone(),
                            });
                        }
                        // The marker traverses the full structural path but
                        // not the stripped one.
                        full.push(key.clone());
                        let scope = stripped.clone();
                        self.node(value, full, stripped, Some(&scope), false)?;
                        full.pop();
                    } else {
                        full.push(key.clone());
                        stripped.push(key.clone());
                        self.node(value, full, stripped, or_scope, true)?;
                        stripped.pop();
                        full.pop();
                    }
                    seen_sibling = true;
                }
                Ok(())
            }
        }
    }

    fn terminal(
        &mut self,
        name: &str,
        full: &mut Vec<String>,
        stripped: &mut Vec<String>,
        or_scope: Option<&Vec<String>>,
    ) {
        full.push(name.to_string());
        stripped.push(name.to_string());
        self.visited_positions.insert(full.clone());

        if self.emitted.insert(stripped.clone()) {
            let key_path = KeyPath::new(stripped.clone());
            let value_path = match &self.spec.query_key {
                Some(query_key) => KeyPath::single(query_key.clone()),
                None => key_path.clone(),
            };
            let pattern = self.pattern_at(full);
            self.targets.push(FieldTarget {
                key_path,
                value_path,
                pattern,
                or_scope: or_scope.cloned(),
            });
        }

        stripped.pop();
        full.pop();
    }

    /// Case-sensitive declarations take precedence when both classes
    /// annotate the same position.
    fn pattern_at(&self, position: &[String]) -> Option<PatternSemantics> {
        if let Some(mode) = self.spec.like.mode_at(position) {
            return Some(PatternSemantics {
                mode,
                case: CaseSensitivity::Sensitive,
            });
        }
        self.spec.ilike.mode_at(position).map(|mode| PatternSemantics {
            mode,
            case: CaseSensitivity::Insensitive,
        })
    }

    fn check_mode_coverage(&self) -> Result<(), SpecError> {
        for tree in [&self.spec.like, &self.spec.ilike] {
            for path in tree.leaf_paths() {
                if !self.visited_positions.contains(&path) {
                    return Err(SpecError::ModeWithoutField {
                        path: path.join("."),
                    });
                }
            }
        }
        Ok(())
    }
}
