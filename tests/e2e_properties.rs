//! Property tests for the quantified invariants (§8): planner determinism,
//! envelope byte-involution, and graph-write MERGE-clause idempotence.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use kg_discovery_pipeline::graphdb::{GraphDatabase, InMemoryGraphDatabase};
use kg_discovery_pipeline::graphwrite::Dyad;
use kg_discovery_pipeline::model::{PropertyMap, Value};
use kg_discovery_pipeline::pipeline::{CloudEvent, GenerateOptions};
use kg_discovery_pipeline::planner::{plan_expansion_queries, DataSource};
use kg_discovery_pipeline::taxonomy::search::Search;
use kg_discovery_pipeline::taxonomy::{Comparator, NodeConstraint, NodeType, Taxonomy, TaxonomyNode, TaxonomyNodeId, TaxonomyRelationship, RelationshipMultiplicity};

mod common;

fn people_taxonomy() -> Arc<Taxonomy> {
    let a = TaxonomyNode::new("A", NodeType::Person).with_attribute("name", "");
    let b = TaxonomyNode::new("B", NodeType::Email).with_attribute("name", "");
    let rel = TaxonomyRelationship::new(
        "r1",
        "KNOWS",
        RelationshipMultiplicity::RequiredOne,
        TaxonomyNodeId::from("A"),
        TaxonomyNodeId::from("B"),
    );
    Arc::new(
        Taxonomy::new("t1", "people", TaxonomyNodeId::from("A"), vec![a, b], vec![rel], vec![], vec![]).unwrap(),
    )
}

fn searched_for(taxonomy: Arc<Taxonomy>, name_prefix: &str) -> Search {
    let mut search = Search::new("s1", taxonomy);
    let nc = NodeConstraint::new(
        TaxonomyNodeId::from("A"),
        NodeType::Person,
        "name",
        Comparator::StartsWith,
        Value::from(name_prefix),
        ["name"],
    )
    .unwrap();
    search.append_node_constraint(nc);
    search
}

proptest! {
    /// §8: "two distinct planner invocations with equal inputs produce equal
    /// ExpansionQuery lists (in the same order)". Compared by canonical shape
    /// since `id` is freshly minted per call.
    #[test]
    fn planner_is_deterministic_for_equal_inputs(name_prefix in "[A-Za-z]{1,10}") {
        common::init_tracing();
        let taxonomy = people_taxonomy();
        let sources = [DataSource::Cve, DataSource::DataScraper];

        let first = plan_expansion_queries(&searched_for(taxonomy.clone(), &name_prefix), &sources);
        let second = plan_expansion_queries(&searched_for(taxonomy, &name_prefix), &sources);

        let first_keys: Vec<String> = first.iter().map(|q| q.canonical_key()).collect();
        let second_keys: Vec<String> = second.iter().map(|q| q.canonical_key()).collect();
        prop_assert_eq!(first_keys, second_keys);
    }

    /// §8: "Envelope derivation is an involution on `data.value` when no
    /// payload transform is applied (round-trip equality of bytes)".
    #[test]
    fn derive_from_round_trips_payload_bytes(term in "[A-Za-z0-9]{1,12}") {
        common::init_tracing();
        let root = CloudEvent::generate(json!({"term": term}), "Person", "pipeline", GenerateOptions::default()).unwrap();
        let decoded = root.payload().unwrap();
        let derived = root.derive_from(&decoded).unwrap();
        let round_tripped = derived.payload().unwrap();
        prop_assert_eq!(decoded, round_tripped);
    }

    /// §8: "Graph-write idempotence: executing the same dyad stream twice
    /// yields the same graph state." A MERGE clause is idempotent at the
    /// store precisely when its text is deterministic across calls, so this
    /// checks that `to_merge_clause` produces byte-identical output for the
    /// same `Dyad` and that committing it twice yields two identical chunks.
    #[test]
    fn dyad_merge_clause_is_idempotent(from_name in "[A-Za-z]{1,10}", to_name in "[A-Za-z]{1,10}") {
        let dyad = Dyad {
            from_type: "Person".into(),
            from_props: PropertyMap::from([("name".to_string(), Value::from(from_name))]),
            edge_type: "KNOWS".into(),
            edge_props: PropertyMap::new(),
            to_type: "Organization".into(),
            to_props: PropertyMap::from([("name".to_string(), Value::from(to_name))]),
        };

        let clause_a = dyad.to_merge_clause().unwrap();
        let clause_b = dyad.to_merge_clause().unwrap();
        prop_assert_eq!(&clause_a, &clause_b);

        let rt = tokio::runtime::Runtime::new().unwrap();
        let db = InMemoryGraphDatabase::new();
        rt.block_on(db.execute_chunk(std::slice::from_ref(&clause_a))).unwrap();
        rt.block_on(db.execute_chunk(std::slice::from_ref(&clause_b))).unwrap();

        let chunks = db.committed_chunks();
        prop_assert_eq!(chunks[0].clone(), chunks[1].clone());
    }
}
