use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ast::{FieldSpec, ModeTree};
use super::errors::SpecError;

pub const DEFAULT_OR_KEY: &str = "or";

/// A complete, declaration-time filter specification: the field tree, the
/// pattern-mode trees, and the reserved-key configuration. This is the
/// input to compilation and the unit of cache identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub fields: FieldSpec,
    pub like: ModeTree,
    pub ilike: ModeTree,
    pub or_key: String,
    /// When set, every filter reads its runtime value from this single key
    /// instead of its own key path.
    pub query_key: Option<String>,
}

impl FilterSpec {
    pub fn builder() -> FilterSpecBuilder {
        FilterSpecBuilder::new()
    }

    /// A specification with no pattern declarations, straight from a JSON
    /// field tree.
    pub fn from_json(fields: &Value) -> Result<Self, SpecError> {
        Ok(FilterSpec {
            fields: FieldSpec::from_json(fields)?,
            like: ModeTree::default(),
            ilike: ModeTree::default(),
            or_key: DEFAULT_OR_KEY.to_string(),
            query_key: None,
        })
    }
}

/// Block-style declaration builder. The nesting context lives on the
/// builder and travels through `nested` closures, so declarations compose
/// without any shared or global state.
///
/// ```
/// use relsieve::filter_spec::FilterSpec;
/// use serde_json::json;
///
/// let spec = FilterSpec::builder()
///     .field("title")
///     .nested("author", |author| {
///         author.field("first_name");
///     })
///     .like(json!({ "title": "circumfix" }))
///     .build()
///     .unwrap();
/// assert_eq!(spec.or_key, "or");
/// ```
#[derive(Debug, Default)]
pub struct FilterSpecBuilder {
    context: Vec<String>,
    fields: Vec<FieldSpec>,
    /// Raw like/ilike declarations with their context snapshot; parsed and
    /// merged at build time so errors surface from `build`.
    pending_like: Vec<(Vec<String>, Value)>,
    pending_ilike: Vec<(Vec<String>, Value)>,
    or_key: Option<String>,
    query_key: Option<String>,
}

impl FilterSpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a terminal filterable field in the current context.
    pub fn field(&mut self, name: impl Into<String>) -> &mut Self {
        let spec = self.wrap_in_context(FieldSpec::Field(name.into()));
        self.fields.push(spec);
        self
    }

    /// Declare several sibling fields at once.
    pub fn fields<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let siblings = FieldSpec::Fields(
            names
                .into_iter()
                .map(|name| FieldSpec::Field(name.into()))
                .collect(),
        );
        let spec = self.wrap_in_context(siblings);
        self.fields.push(spec);
        self
    }

    /// Declare a raw field subtree (e.g. built with `FieldSpec::from_json`)
    /// in the current context.
    pub fn subtree(&mut self, spec: FieldSpec) -> &mut Self {
        let spec = self.wrap_in_context(spec);
        self.fields.push(spec);
        self
    }

    /// Open a nested relation context; declarations inside the closure are
    /// wrapped under `name`.
    pub fn nested(&mut self, name: impl Into<String>, scope: impl FnOnce(&mut Self)) -> &mut Self {
        self.context.push(name.into());
        scope(self);
        self.context.pop();
        self
    }

    /// Open an OR-group: declarations inside the closure combine with the
    /// sibling declared immediately before this call using OR instead of
    /// the default AND.
    pub fn or_group(&mut self, scope: impl FnOnce(&mut Self)) -> &mut Self {
        let key = self
            .or_key
            .clone()
            .unwrap_or_else(|| DEFAULT_OR_KEY.to_string());
        self.nested(key, scope)
    }

    /// Declare case-sensitive pattern matching. The JSON object mirrors the
    /// field tree shape with mode-name leaves; declared paths are
    /// auto-registered as filterable fields.
    pub fn like(&mut self, declaration: Value) -> &mut Self {
        self.pending_like.push((self.context.clone(), declaration));
        self
    }

    /// Declare case-insensitive pattern matching; otherwise identical to
    /// [`like`](Self::like).
    pub fn ilike(&mut self, declaration: Value) -> &mut Self {
        self.pending_ilike.push((self.context.clone(), declaration));
        self
    }

    /// Override the reserved OR-marker key (default `"or"`). Must be called
    /// before any `or_group` declarations for the override to apply to them.
    pub fn or_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.or_key = Some(key.into());
        self
    }

    /// Route every filter's runtime value through one input key.
    pub fn query_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.query_key = Some(key.into());
        self
    }

    pub fn build(&mut self) -> Result<FilterSpec, SpecError> {
        let mut like = ModeTree::default();
        for (context, declaration) in self.pending_like.drain(..) {
            let tree = ModeTree::from_json(&declaration)?.wrap_in_context(&context);
            like.merge(tree);
        }
        let mut ilike = ModeTree::default();
        for (context, declaration) in self.pending_ilike.drain(..) {
            let tree = ModeTree::from_json(&declaration)?.wrap_in_context(&context);
            ilike.merge(tree);
        }

        let mut fields = std::mem::take(&mut self.fields);
        // Pattern declarations define their fields too; append them after
        // the explicit ones so OR-markers keep their anchors.
        if !like.is_empty() {
            fields.push(like.to_field_spec());
        }
        if !ilike.is_empty() {
            fields.push(ilike.to_field_spec());
        }

        let fields = match fields.len() {
            0 => return Err(SpecError::EmptyMapping),
            1 => fields.pop().expect("single field spec"),
            _ => FieldSpec::Fields(fields),
        };

        Ok(FilterSpec {
            fields,
            like,
            ilike,
            or_key: self
                .or_key
                .take()
                .unwrap_or_else(|| DEFAULT_OR_KEY.to_string()),
            query_key: self.query_key.take(),
        })
    }

    fn wrap_in_context(&self, spec: FieldSpec) -> FieldSpec {
        let mut wrapped = spec;
        for key in self.context.iter().rev() {
            wrapped = FieldSpec::Nested(vec![(key.clone(), wrapped)]);
        }
        wrapped
    }
}
