//! The orchestration façade: compile a specification once into grouped
//! predicate descriptors, then apply them per query — null-guarding every
//! member, joining once along the merged tree of the active groups, and
//! conjoining each group's OR-composed predicate.

pub mod cache;
mod errors;

pub use errors::CompileError;

use std::sync::Arc;

use crate::filter_spec::{FilterSpec, KeyPath};
use crate::join_resolver;
use crate::or_grouper::{self, OrGroup};
use crate::path_extractor;
use crate::predicate_compiler::{self, PredicateDescriptor, ResolvedPredicate};
use crate::relation::{Relation, ValueSource};
use crate::sql_dialect::{Dialect, DialectAdapter};

/// A fully compiled specification: descriptors grouped and bound to a
/// dialect, reusable across queries and threads.
pub struct CompiledFilter {
    groups: Vec<OrGroup>,
    dialect: Arc<dyn DialectAdapter>,
}

/// The compile-then-apply façade.
pub struct FilterPipeline {
    compiled: Arc<CompiledFilter>,
}

impl FilterPipeline {
    /// Compile `spec` for the named dialect, reusing the global compiled
    /// cache when this specification identity was seen before. Unknown
    /// dialect identifiers fail here, not at query time.
    pub fn new(spec: &FilterSpec, dialect: &str) -> Result<Self, CompileError> {
        let dialect = Dialect::parse(dialect)?;
        let key = cache::fingerprint(spec, dialect);
        if let Some(compiled) = cache::get(&key) {
            log::debug!("compiled-filter cache hit for {}", &key[..12]);
            return Ok(FilterPipeline { compiled });
        }
        let compiled = Arc::new(CompiledFilter::build(spec, Arc::new(dialect))?);
        Ok(FilterPipeline {
            compiled: cache::insert(key, compiled),
        })
    }

    /// Compile with a custom dialect adapter. Custom adapters have no
    /// stable identity, so the result bypasses the cache.
    pub fn with_adapter(
        spec: &FilterSpec,
        adapter: Arc<dyn DialectAdapter>,
    ) -> Result<Self, CompileError> {
        Ok(FilterPipeline {
            compiled: Arc::new(CompiledFilter::build(spec, adapter)?),
        })
    }

    pub fn compiled(&self) -> &Arc<CompiledFilter> {
        &self.compiled
    }

    /// Apply every group with at least one present value to `base`.
    pub fn apply<R: Relation>(&self, values: &dyn ValueSource, base: R) -> R {
        self.compiled.apply(values, base)
    }
}

impl CompiledFilter {
    fn build(spec: &FilterSpec, dialect: Arc<dyn DialectAdapter>) -> Result<Self, CompileError> {
        let targets = path_extractor::extract(spec)?;
        let descriptors = predicate_compiler::compile(&targets);

        // Resolving the full join tree up front surfaces irreconcilable
        // path conflicts at compile time; per-query resolution only ever
        // sees a subset of these paths in the same relative order.
        let key_paths: Vec<KeyPath> = descriptors.iter().map(|d| d.key_path.clone()).collect();
        let join_tree = join_resolver::resolve(&key_paths)?;
        log::debug!(
            "compiled {} descriptor(s); join tree: {:?}",
            descriptors.len(),
            join_tree
        );

        let groups = or_grouper::group(&targets, descriptors);
        Ok(CompiledFilter { groups, dialect })
    }

    pub fn groups(&self) -> &[OrGroup] {
        &self.groups
    }

    /// Per-query application. Groups with no present (or all
    /// non-constraining) values are skipped entirely — their joins are
    /// never issued.
    pub fn apply<R: Relation>(&self, values: &dyn ValueSource, base: R) -> R {
        let mut active_groups: Vec<Vec<(&PredicateDescriptor, ResolvedPredicate)>> = Vec::new();
        let mut join_paths: Vec<KeyPath> = Vec::new();
        for group in &self.groups {
            let members: Vec<(&PredicateDescriptor, ResolvedPredicate)> = group
                .members
                .iter()
                .filter_map(|descriptor| {
                    let value = values.get(&descriptor.value_path)?;
                    let resolved = descriptor.resolve(value, self.dialect.as_ref())?;
                    Some((descriptor, resolved))
                })
                .collect();
            if members.is_empty() {
                continue;
            }
            join_paths.extend(members.iter().map(|(d, _)| d.key_path.clone()));
            active_groups.push(members);
        }

        if active_groups.is_empty() {
            return base;
        }

        let mut relation = match join_resolver::resolve(&join_paths) {
            Ok(Some(tree)) => base.join(&tree),
            Ok(None) => base,
            Err(err) => {
                // Conflicts are caught at compile time; a subset of the
                // compiled paths cannot introduce a new one.
                log::error!("join resolution failed at query time: {}", err);
                base
            }
        };

        for members in &active_groups {
            relation = apply_group(relation, members);
        }
        relation
    }
}

fn apply_group<R: Relation>(
    relation: R,
    members: &[(&PredicateDescriptor, ResolvedPredicate)],
) -> R {
    match members {
        [] => relation,
        [(descriptor, resolved)] => resolved.apply(relation, &descriptor.column),
        [(first_descriptor, first_resolved), rest @ ..] => {
            let mut composed = first_resolved.apply(relation.clone(), &first_descriptor.column);
            for (descriptor, resolved) in rest {
                composed = composed.or(resolved.apply(relation.clone(), &descriptor.column));
            }
            composed
        }
    }
}
