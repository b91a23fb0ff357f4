//! Equality, membership and guard behavior on top-level and nested fields.

use serde_json::json;

use relsieve::filter_pipeline::FilterPipeline;
use relsieve::filter_spec::FilterSpec;

use crate::support::MemRelation;

fn articles() -> MemRelation {
    MemRelation::new(vec![
        json!({
            "title": "One",
            "content": "alpha",
            "published": "2024-01-01T12:00:00Z",
            "authors": [{ "first_name": "Ada", "last_name": "Lovelace" }],
        }),
        json!({
            "title": "Two",
            "content": "beta",
            "published": "2024-06-01T12:00:00Z",
            "authors": [{ "first_name": "Ada", "last_name": "Lovelace" }],
        }),
        json!({
            "title": "Three",
            "content": null,
            "published": "2024-12-01T12:00:00Z",
            "authors": [{ "first_name": "Alan", "last_name": "Turing" }],
        }),
    ])
}

fn spec() -> FilterSpec {
    FilterSpec::builder()
        .fields(["title", "content", "published"])
        .nested("author", |author| {
            author.field("first_name");
        })
        .build()
        .unwrap()
}

#[test]
fn empty_input_returns_the_unfiltered_base() -> anyhow::Result<()> {
    let pipeline = FilterPipeline::new(&spec(), "generic")?;
    let result = pipeline.apply(&json!({}), articles());

    assert_eq!(result.titles(), vec!["One", "Two", "Three"]);
    assert_eq!(result.join_count(), 0);
    Ok(())
}

#[test]
fn top_level_equality() {
    let pipeline = FilterPipeline::new(&spec(), "generic").unwrap();
    let result = pipeline.apply(&json!({ "title": "Two" }), articles());

    assert_eq!(result.titles(), vec!["Two"]);
    assert_eq!(result.join_count(), 0);
}

#[test]
fn absent_fields_impose_no_constraint() {
    let pipeline = FilterPipeline::new(&spec(), "generic").unwrap();
    let result = pipeline.apply(&json!({ "content": "alpha" }), articles());

    assert_eq!(result.titles(), vec!["One"]);
}

#[test]
fn nested_equality_returns_only_the_matching_parent() {
    // Ada and Alan each wrote their own articles; filtering on the joined
    // author name narrows to the right parents.
    let pipeline = FilterPipeline::new(&spec(), "generic").unwrap();
    let result = pipeline.apply(&json!({ "author": { "first_name": "Alan" } }), articles());

    assert_eq!(result.titles(), vec!["Three"]);
    assert_eq!(result.join_count(), 1);
}

#[test]
fn membership_collections_filter_with_in() {
    let pipeline = FilterPipeline::new(&spec(), "generic").unwrap();
    let result = pipeline.apply(&json!({ "title": ["One", "Three", "Nine"] }), articles());

    assert_eq!(result.titles(), vec!["One", "Three"]);
}

#[test]
fn explicit_null_matches_null_columns() {
    let pipeline = FilterPipeline::new(&spec(), "generic").unwrap();
    let result = pipeline.apply(&json!({ "content": null }), articles());

    assert_eq!(result.titles(), vec!["Three"]);
}

#[test]
fn independent_fields_combine_with_and() {
    let pipeline = FilterPipeline::new(&spec(), "generic").unwrap();
    let result = pipeline.apply(
        &json!({ "author": { "first_name": "Ada" }, "content": "beta" }),
        articles(),
    );

    assert_eq!(result.titles(), vec!["Two"]);
}
