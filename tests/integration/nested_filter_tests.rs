//! Joined fields: qualification, join dedup, and OR-group semantics.

use serde_json::json;

use relsieve::filter_pipeline::FilterPipeline;
use relsieve::filter_spec::FilterSpec;
use relsieve::join_resolver::JoinNode;

use crate::support::MemRelation;

fn library() -> MemRelation {
    MemRelation::new(vec![
        json!({
            "title": "Analytical Engines",
            "content": "Numbers",
            "authors": [{
                "first_name": "Ada",
                "last_name": "Lovelace",
                "reviews": [{ "title": "Visionary", "content": "ahead of its time" }],
            }],
        }),
        json!({
            "title": "Computing Machinery",
            "content": "Intelligence",
            "authors": [{
                "first_name": "Alan",
                "last_name": "Turing",
                "reviews": [{ "title": "Imitation", "content": "a fine game" }],
            }],
        }),
    ])
}

#[test]
fn filters_through_a_two_level_join() {
    let spec = FilterSpec::builder()
        .nested("author", |author| {
            author.nested("reviews", |reviews| {
                reviews.field("title");
            });
        })
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "generic").unwrap();

    let result = pipeline.apply(
        &json!({ "author": { "reviews": { "title": "Imitation" } } }),
        library(),
    );

    assert_eq!(result.titles(), vec!["Computing Machinery"]);
    assert_eq!(result.join_count(), 1);
}

#[test]
fn fields_sharing_a_relation_prefix_produce_exactly_one_join() {
    let spec = FilterSpec::builder()
        .nested("author", |author| {
            author.fields(["first_name", "last_name"]);
        })
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "generic").unwrap();

    let result = pipeline.apply(
        &json!({ "author": { "first_name": "Ada", "last_name": "Lovelace" } }),
        library(),
    );

    assert_eq!(result.titles(), vec!["Analytical Engines"]);
    assert_eq!(result.join_count(), 1);
    let joins = result.joins();
    assert_eq!(
        joins[0].roots,
        vec![("author".to_string(), JoinNode::Terminal)]
    );
}

#[test]
fn unused_nested_filters_issue_no_join() {
    let spec = FilterSpec::builder()
        .field("title")
        .nested("author", |author| {
            author.field("first_name");
        })
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "generic").unwrap();

    let result = pipeline.apply(&json!({ "title": "Analytical Engines" }), library());

    assert_eq!(result.titles(), vec!["Analytical Engines"]);
    assert_eq!(result.join_count(), 0);
}

#[test]
fn or_marked_branch_rescues_a_non_matching_sibling() {
    // { title: ..., or: { author.first_name: ... } } — only the author
    // branch matches, the parent must still come back.
    let spec = FilterSpec::builder()
        .like(json!({
            "title": "circumfix",
            "or": { "author": { "first_name": "circumfix" } },
        }))
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "generic").unwrap();

    let result = pipeline.apply(
        &json!({ "title": "zzz", "author": { "first_name": "Ada" } }),
        library(),
    );
    assert_eq!(result.titles(), vec!["Analytical Engines"]);
}

#[test]
fn without_the_or_marker_siblings_combine_with_and() {
    let spec = FilterSpec::builder()
        .like(json!({
            "title": "circumfix",
            "author": { "first_name": "circumfix" },
        }))
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "generic").unwrap();

    let result = pipeline.apply(
        &json!({ "title": "zzz", "author": { "first_name": "Ada" } }),
        library(),
    );
    assert!(result.titles().is_empty());
}

#[test]
fn or_group_members_are_individually_null_guarded() {
    // Only the OR branch has a value; the absent anchor contributes no
    // predicate and must not poison the group.
    let spec = FilterSpec::builder()
        .like(json!({
            "title": "circumfix",
            "or": { "content": "circumfix" },
        }))
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "generic").unwrap();

    let result = pipeline.apply(&json!({ "content": "Intel" }), library());
    assert_eq!(result.titles(), vec!["Computing Machinery"]);
}

#[test]
fn configurable_or_key() {
    let spec = FilterSpec::builder()
        .or_key("any_of")
        .like(json!({
            "title": "circumfix",
            "any_of": { "content": "circumfix" },
        }))
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "generic").unwrap();

    let result = pipeline.apply(
        &json!({ "title": "zzz", "content": "Numbers" }),
        library(),
    );
    assert_eq!(result.titles(), vec!["Analytical Engines"]);
}

#[test]
fn equality_and_pattern_filters_mix_across_groups() {
    let spec = FilterSpec::builder()
        .nested("author", |author| {
            author.field("first_name");
        })
        .like(json!({ "title": "prefix" }))
        .build()
        .unwrap();
    let pipeline = FilterPipeline::new(&spec, "postgres").unwrap();

    let result = pipeline.apply(
        &json!({ "author": { "first_name": "Ada" }, "title": "Analytical" }),
        library(),
    );
    assert_eq!(result.titles(), vec!["Analytical Engines"]);

    let miss = pipeline.apply(
        &json!({ "author": { "first_name": "Alan" }, "title": "Analytical" }),
        library(),
    );
    assert!(miss.titles().is_empty());
}
