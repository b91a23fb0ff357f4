//! Structure of compiled specifications: grouping, qualification, and the
//! custom-adapter seam.

use std::sync::Arc;

use serde_json::json;

use relsieve::filter_pipeline::FilterPipeline;
use relsieve::filter_spec::{CaseSensitivity, FilterSpec, MatchMode};
use relsieve::relation::ColumnRef;
use relsieve::sql_dialect::{Dialect, DialectAdapter, MultiTermStrategy};

fn compile(spec: &FilterSpec) -> FilterPipeline {
    // Route through the adapter entry point so these structural tests stay
    // independent of the global cache.
    FilterPipeline::with_adapter(spec, Arc::new(Dialect::Generic)).unwrap()
}

#[test]
fn descriptors_group_in_declaration_order() {
    let spec = FilterSpec::builder()
        .field("title")
        .or_group(|group| {
            group.field("content");
        })
        .nested("author", |author| {
            author.field("first_name");
        })
        .build()
        .unwrap();
    let pipeline = compile(&spec);

    let groups = pipeline.compiled().groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(
        groups[0]
            .members
            .iter()
            .map(|m| m.key_path.to_string())
            .collect::<Vec<_>>(),
        vec!["title", "content"]
    );
    assert_eq!(groups[1].members[0].key_path.to_string(), "author.first_name");
    assert_eq!(
        groups[1].members[0].column,
        ColumnRef::qualified("authors", "first_name")
    );
}

#[test]
fn value_paths_strip_or_markers() {
    let spec = FilterSpec::builder()
        .field("title")
        .or_group(|group| {
            group.nested("author", |author| {
                author.field("first_name");
            });
        })
        .build()
        .unwrap();
    let pipeline = compile(&spec);

    let member = &pipeline.compiled().groups()[0].members[1];
    assert_eq!(member.key_path.to_string(), "author.first_name");
    assert_eq!(member.value_path.to_string(), "author.first_name");
}

/// A deliberately odd profile: case folding like oracle, native array
/// membership like postgres.
struct FoldedArrayDialect;

impl DialectAdapter for FoldedArrayDialect {
    fn like_operator(&self, _case: CaseSensitivity) -> &'static str {
        "LIKE"
    }

    fn multi_term_strategy(&self) -> MultiTermStrategy {
        MultiTermStrategy::ArrayAny
    }

    fn escapes_terms(&self) -> bool {
        false
    }

    fn uppercases(&self, case: CaseSensitivity) -> bool {
        case == CaseSensitivity::Insensitive
    }
}

#[test]
fn custom_adapters_satisfy_the_same_contract() {
    let spec = FilterSpec::builder()
        .ilike(json!({ "title": "prefix" }))
        .build()
        .unwrap();
    let pipeline = FilterPipeline::with_adapter(&spec, Arc::new(FoldedArrayDialect)).unwrap();

    let descriptor = &pipeline.compiled().groups()[0].members[0];
    let resolved = descriptor
        .resolve(&json!("bar"), &FoldedArrayDialect)
        .unwrap();

    use relsieve::predicate_compiler::ResolvedPredicate;
    assert_eq!(
        resolved,
        ResolvedPredicate::Like {
            fragment: "UPPER(title) LIKE ANY (ARRAY[?])".to_string(),
            bind_groups: vec![vec![json!(["BAR%"])]],
        }
    );
}

#[test]
fn pattern_semantics_reach_the_descriptor() {
    let spec = FilterSpec::builder()
        .like(json!({ "title": "suffix" }))
        .build()
        .unwrap();
    let pipeline = compile(&spec);

    let descriptor = &pipeline.compiled().groups()[0].members[0];
    let pattern = descriptor.pattern.expect("declared pattern");
    assert_eq!(pattern.mode, MatchMode::Suffix);
    assert_eq!(pattern.case, CaseSensitivity::Sensitive);
}
