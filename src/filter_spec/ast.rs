use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::errors::SpecError;

/// A node in the field-specification tree.
///
/// Leaves are terminal column identifiers. Mapping keys are relation names
/// (leading to further nesting) or the reserved OR-marker. Mapping entries
/// keep their declaration order, which is semantic: an OR-marker groups
/// with the sibling declared immediately before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldSpec {
    /// A terminal field name
    Field(String),
    /// A set of sibling specifications under the current prefix
    Fields(Vec<FieldSpec>),
    /// An ordered relation-name -> subtree mapping
    Nested(Vec<(String, FieldSpec)>),
}

impl FieldSpec {
    /// Build a specification tree from a JSON value: strings become terminal
    /// fields, arrays become sibling sets, objects become nested mappings
    /// (declaration order is preserved).
    pub fn from_json(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::String(s) => Ok(FieldSpec::Field(s.clone())),
            Value::Array(items) => {
                let mut specs = Vec::with_capacity(items.len());
                for item in items {
                    specs.push(FieldSpec::from_json(item)?);
                }
                Ok(FieldSpec::Fields(specs))
            }
            Value::Object(map) => {
                if map.is_empty() {
                    return Err(SpecError::EmptyMapping);
                }
                let mut entries = Vec::with_capacity(map.len());
                for (key, val) in map {
                    entries.push((key.clone(), FieldSpec::from_json(val)?));
                }
                Ok(FieldSpec::Nested(entries))
            }
            other => Err(SpecError::UnsupportedNode {
                node: other.to_string(),
            }),
        }
    }
}

/// An ordered identifier sequence from the specification root to a terminal
/// column. The first N-1 segments are relation traversals; the last segment
/// is the column. Key paths are derived once and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn new(segments: Vec<String>) -> Self {
        KeyPath(segments)
    }

    pub fn single(segment: impl Into<String>) -> Self {
        KeyPath(vec![segment.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The terminal column segment.
    pub fn column(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// The relation traversal prefix (everything but the column).
    pub fn relations(&self) -> &[String] {
        match self.0.len() {
            0 => &[],
            n => &self.0[..n - 1],
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        KeyPath(iter.into_iter().map(Into::into).collect())
    }
}

/// Pattern-match mode for a field: contains, starts-with, or ends-with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Wildcards on both sides: the value matches anywhere in the column
    Circumfix,
    /// Trailing wildcard: the column starts with the value
    Prefix,
    /// Leading wildcard: the column ends with the value
    Suffix,
}

impl MatchMode {
    /// Parse a declared mode name, folding the circumfix synonyms
    /// (`parafix`, `confix`, `ambifix`) before any merge happens.
    pub fn parse(name: &str) -> Result<Self, SpecError> {
        match name {
            "circumfix" | "parafix" | "confix" | "ambifix" => Ok(MatchMode::Circumfix),
            "prefix" => Ok(MatchMode::Prefix),
            "suffix" => Ok(MatchMode::Suffix),
            other => Err(SpecError::UnknownMatchMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Whether a pattern match respects letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

/// A match mode plus its case-sensitivity class, attached to one key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSemantics {
    pub mode: MatchMode,
    pub case: CaseSensitivity,
}

/// A pattern-mode declaration tree mirroring the shape of the field tree,
/// with `MatchMode` leaves. Lookups are by structural position, so the
/// tree may traverse the same relation keys (including OR-markers) as the
/// field specification it annotates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeTree {
    entries: Vec<(String, ModeNode)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModeNode {
    Mode(MatchMode),
    Tree(ModeTree),
}

impl ModeTree {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, ModeNode)] {
        &self.entries
    }

    /// Build a mode tree from a JSON object whose string leaves are mode
    /// names. Synonyms normalize during this parse.
    pub fn from_json(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, val) in map {
                    let node = match val {
                        Value::String(name) => ModeNode::Mode(MatchMode::parse(name)?),
                        Value::Object(_) => ModeNode::Tree(ModeTree::from_json(val)?),
                        other => {
                            return Err(SpecError::UnsupportedModeNode {
                                node: other.to_string(),
                            })
                        }
                    };
                    entries.push((key.clone(), node));
                }
                Ok(ModeTree { entries })
            }
            other => Err(SpecError::UnsupportedModeNode {
                node: other.to_string(),
            }),
        }
    }

    /// Deep-merge another tree into this one. Later declarations win on
    /// leaves; subtrees merge recursively.
    pub fn merge(&mut self, other: ModeTree) {
        for (key, node) in other.entries {
            match self.entries.iter().position(|(k, _)| *k == key) {
                Some(index) => match (&mut self.entries[index].1, node) {
                    (ModeNode::Tree(a), ModeNode::Tree(b)) => a.merge(b),
                    (slot, node) => *slot = node,
                },
                None => self.entries.push((key, node)),
            }
        }
    }

    /// Wrap this tree under a chain of context keys, innermost last.
    pub fn wrap_in_context(self, context: &[String]) -> ModeTree {
        let mut wrapped = self;
        for key in context.iter().rev() {
            wrapped = ModeTree {
                entries: vec![(key.clone(), ModeNode::Tree(wrapped))],
            };
        }
        wrapped
    }

    /// Look up the mode at a structural position, or `None` when no mode
    /// was declared there.
    pub fn mode_at(&self, path: &[String]) -> Option<MatchMode> {
        let (first, rest) = path.split_first()?;
        let node = self
            .entries
            .iter()
            .find(|(key, _)| key == first)
            .map(|(_, node)| node)?;
        match node {
            ModeNode::Mode(mode) => rest.is_empty().then_some(*mode),
            ModeNode::Tree(tree) => tree.mode_at(rest),
        }
    }

    /// All declared leaf positions, in declaration order.
    pub fn leaf_paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        self.collect_leaf_paths(&mut Vec::new(), &mut paths);
        paths
    }

    fn collect_leaf_paths(&self, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        for (key, node) in &self.entries {
            prefix.push(key.clone());
            match node {
                ModeNode::Mode(_) => out.push(prefix.clone()),
                ModeNode::Tree(tree) => tree.collect_leaf_paths(prefix, out),
            }
            prefix.pop();
        }
    }

    /// The field-specification shape of this declaration tree: keys become
    /// structure, leaf keys become terminal fields. Pattern declarations
    /// register their paths as filterable fields, so a bare `like` is a
    /// complete specification by itself.
    pub fn to_field_spec(&self) -> FieldSpec {
        let mut out = Vec::with_capacity(self.entries.len());
        for (key, node) in &self.entries {
            match node {
                ModeNode::Mode(_) => out.push(FieldSpec::Field(key.clone())),
                ModeNode::Tree(tree) => {
                    out.push(FieldSpec::Nested(vec![(key.clone(), tree.to_field_spec())]))
                }
            }
        }
        if out.len() == 1 {
            out.pop().expect("single entry")
        } else {
            FieldSpec::Fields(out)
        }
    }
}
