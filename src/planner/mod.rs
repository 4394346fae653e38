//! Search planner (§4.1): turns a `Search` into a list of `ExpansionQuery`
//! values plus an executable graph-query string.
//!
//! Backend-agnostic: the planner only reads a `Taxonomy`/`Search`, it never
//! touches a storage backend directly.

pub mod expansion;

pub use expansion::{DataSource, ExpansionQuery, PayloadItem, PropertyItem};

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::model::Value;
use crate::taxonomy::{NodeConstraint, Search, TaxonomyNode, TaxonomyNodeId, TaxonomyRelationship};

/// Node-id sequence for one traversal path. Taxonomies are shallow in
/// practice, so paths are kept inline up to 8 hops before spilling to the
/// heap.
type NodePath = SmallVec<[TaxonomyNodeId; 8]>;

/// Indices built once per `Search` invocation (§4.1).
struct Indices<'t> {
    node_by_id: HashMap<&'t TaxonomyNodeId, &'t TaxonomyNode>,
    rel_by_pair: HashMap<(&'t TaxonomyNodeId, &'t TaxonomyNodeId), &'t TaxonomyRelationship>,
    constraints_by_node: HashMap<&'t TaxonomyNodeId, Vec<&'t NodeConstraint>>,
}

impl<'t> Indices<'t> {
    fn build(search: &'t Search) -> Self {
        let taxonomy = &search.taxonomy;
        let node_by_id = taxonomy.nodes.iter().map(|n| (&n.id, n)).collect();
        let rel_by_pair = taxonomy
            .relationships
            .iter()
            .map(|r| ((&r.source_id, &r.target_id), r))
            .collect();

        let mut constraints_by_node: HashMap<&TaxonomyNodeId, Vec<&NodeConstraint>> = HashMap::new();
        for nc in search.effective_node_constraints() {
            constraints_by_node.entry(&nc.affected_node_id).or_default().push(nc);
        }

        Self {
            node_by_id,
            rel_by_pair,
            constraints_by_node,
        }
    }

    fn has_constraint(&self, id: &TaxonomyNodeId) -> bool {
        self.constraints_by_node.get(id).is_some_and(|v| !v.is_empty())
    }

    fn properties_for(&self, id: &TaxonomyNodeId) -> Vec<PropertyItem> {
        self.constraints_by_node
            .get(id)
            .into_iter()
            .flatten()
            .map(|nc| PropertyItem::new(nc.comparator.tag(), nc.value.clone(), nc.attribute_name.clone()))
            .collect()
    }
}

/// All simple directed paths from `start` to every other reachable node,
/// mirroring a depth-first `all_simple_paths` traversal over a directed
/// multigraph. Emitted in discovery order. Traversal adjacency is derived
/// from the `relById` index rather than rebuilt from the raw relationship
/// list.
fn all_simple_paths(indices: &Indices<'_>, start: &TaxonomyNodeId) -> Vec<NodePath> {
    let mut adjacency: HashMap<&TaxonomyNodeId, Vec<&TaxonomyNodeId>> = HashMap::new();
    for &(src, tgt) in indices.rel_by_pair.keys() {
        adjacency.entry(src).or_default().push(tgt);
    }

    let mut paths = Vec::new();
    let mut current: NodePath = SmallVec::new();
    current.push(start.clone());
    let mut on_path: HashSet<TaxonomyNodeId> = HashSet::new();
    on_path.insert(start.clone());

    fn dfs(
        node: &TaxonomyNodeId,
        adjacency: &HashMap<&TaxonomyNodeId, Vec<&TaxonomyNodeId>>,
        current: &mut NodePath,
        on_path: &mut HashSet<TaxonomyNodeId>,
        paths: &mut Vec<NodePath>,
    ) {
        if let Some(neighbors) = adjacency.get(node) {
            for &next in neighbors {
                if on_path.contains(next) {
                    continue; // simple paths only, no revisits
                }
                current.push(next.clone());
                on_path.insert(next.clone());
                paths.push(current.clone());
                dfs(next, adjacency, current, on_path, paths);
                on_path.remove(next);
                current.pop();
            }
        }
    }

    dfs(start, &adjacency, &mut current, &mut on_path, &mut paths);
    paths
}

/// Builds the list of `ExpansionQuery` values for a `Search` across the
/// given data sources, deduplicated by structural shape (§4.1).
pub fn plan_expansion_queries(search: &Search, data_sources: &[DataSource]) -> Vec<ExpansionQuery> {
    let indices = Indices::build(search);
    let paths = all_simple_paths(&indices, &search.taxonomy.start_id);

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for path in &paths {
        for &source in data_sources {
            if let Some(query) = build_expansion_query(search, &indices, path, source) {
                let key = query.canonical_key();
                if seen.insert(key) {
                    results.push(query);
                }
            }
        }
    }

    results
}

fn build_expansion_query(
    search: &Search,
    indices: &Indices<'_>,
    path: &NodePath,
    source: DataSource,
) -> Option<ExpansionQuery> {
    let mut items = Vec::new();

    for window in path.windows(2) {
        let (from_id, _to_id) = (&window[0], &window[1]);
        if indices.has_constraint(from_id) {
            items.push(node_item(indices, from_id, source));
        }
    }

    if let Some(last) = path.last() {
        if indices.has_constraint(last) {
            items.push(node_item(indices, last, source));
        }
    }

    items.push(PayloadItem {
        key: "tenant-name".to_owned(),
        value: Value::from(search.id.clone()),
        subject: "Tenant".to_owned(),
        taxonomy_node_id: None,
        properties: Vec::new(),
        data_source: None,
    });

    let query = ExpansionQuery {
        id: uuid::Uuid::new_v4().to_string(),
        search_id: search.id.clone(),
        taxonomy_id: search.taxonomy.id.clone(),
        items,
    };

    query.has_any_properties().then_some(query)
}

fn node_item(indices: &Indices<'_>, id: &TaxonomyNodeId, source: DataSource) -> PayloadItem {
    let node = indices.node_by_id.get(id).expect("path nodes are taxonomy members");
    let name_value = node.attributes.get("name").cloned().unwrap_or(Value::Null);
    PayloadItem {
        key: "name".to_owned(),
        value: name_value,
        subject: node.node_type.tag().to_owned(),
        taxonomy_node_id: Some(id.clone()),
        properties: indices.properties_for(id),
        data_source: Some(source),
    }
}

/// The three-clause executable graph query (§4.1, §6.4).
#[derive(Debug, Clone)]
pub struct GraphQuery {
    pub match_clause: String,
    pub optional_match_clause: String,
    pub where_clause: String,
}

impl GraphQuery {
    pub fn to_statement(&self) -> String {
        format!(
            "MATCH {} OPTIONAL MATCH {} WHERE {} RETURN DISTINCT *",
            self.match_clause, self.optional_match_clause, self.where_clause
        )
    }
}

fn format_dyad(rel: &TaxonomyRelationship, indices: &Indices<'_>) -> Option<String> {
    let src = indices.node_by_id.get(&rel.source_id)?;
    let tgt = indices.node_by_id.get(&rel.target_id)?;
    Some(format!(
        "({}:{})-[:{}]-({}:{})",
        src.id, src.node_type.tag(), rel.rel_type, tgt.id, tgt.node_type.tag()
    ))
}

/// Builds the graph-query string for a `Search`: required-multiplicity
/// dyads in `MATCH`, optional-multiplicity dyads in `OPTIONAL MATCH`, and
/// every effective node constraint conjoined in `WHERE`.
pub fn build_graph_query(search: &Search) -> GraphQuery {
    let indices = Indices::build(search);

    let required: Vec<String> = search
        .taxonomy
        .relationships
        .iter()
        .filter(|r| r.multiplicity.is_required())
        .filter_map(|r| format_dyad(r, &indices))
        .collect();

    let optional: Vec<String> = search
        .taxonomy
        .relationships
        .iter()
        .filter(|r| !r.multiplicity.is_required())
        .filter_map(|r| format_dyad(r, &indices))
        .collect();

    let mut where_clause = String::from("1=1");
    for nc in search.effective_node_constraints() {
        where_clause.push_str(" AND ");
        where_clause.push_str(&nc.affected_node_id.to_string());
        where_clause.push('.');
        where_clause.push_str(&nc.attribute_name);
        where_clause.push_str(nc.comparator.wire_token());
        where_clause.push_str(&nc.value.as_cypher_literal());
    }

    GraphQuery {
        match_clause: required.join(", "),
        optional_match_clause: optional.join(", "),
        where_clause,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Comparator, NodeType, RelationshipMultiplicity, Taxonomy};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn simple_search() -> Search {
        let a = TaxonomyNode::new("A", NodeType::Person).with_attribute("name", "");
        let b = TaxonomyNode::new("B", NodeType::Email).with_attribute("name", "");
        let rel = TaxonomyRelationship::new(
            "r1",
            "KNOWS",
            RelationshipMultiplicity::RequiredOne,
            TaxonomyNodeId::from("A"),
            TaxonomyNodeId::from("B"),
        );
        let taxonomy = Taxonomy::new(
            "t1",
            "people",
            TaxonomyNodeId::from("A"),
            vec![a, b],
            vec![rel],
            vec![],
            vec![],
        )
        .unwrap();

        let mut search = Search::new("s1", Arc::new(taxonomy));
        let nc = NodeConstraint::new(
            TaxonomyNodeId::from("A"),
            NodeType::Person,
            "name",
            Comparator::StartsWith,
            Value::from("Tom"),
            ["name"],
        )
        .unwrap();
        search.append_node_constraint(nc);
        search
    }

    #[test]
    fn scenario_simple_search_emits_one_query_per_data_source() {
        let search = simple_search();
        let queries = plan_expansion_queries(&search, &[DataSource::Cve, DataSource::DataScraper]);
        assert_eq!(queries.len(), 2);
        for q in &queries {
            assert!(q.has_any_properties());
            let a_item = q
                .items
                .iter()
                .find(|i| i.taxonomy_node_id.as_ref().map(|id| id.0.as_str()) == Some("A"))
                .expect("constrained start node must be present");
            assert_eq!(a_item.properties.len(), 1);
            assert_eq!(a_item.properties[0].key, "STARTSWITH");
        }
    }

    #[test]
    fn paths_without_any_constraint_are_dropped() {
        let a = TaxonomyNode::new("A", NodeType::Person);
        let b = TaxonomyNode::new("B", NodeType::Email);
        let rel = TaxonomyRelationship::new(
            "r1",
            "KNOWS",
            RelationshipMultiplicity::RequiredOne,
            TaxonomyNodeId::from("A"),
            TaxonomyNodeId::from("B"),
        );
        let taxonomy = Taxonomy::new(
            "t2",
            "unconstrained",
            TaxonomyNodeId::from("A"),
            vec![a, b],
            vec![rel],
            vec![],
            vec![],
        )
        .unwrap();
        let search = Search::new("s2", Arc::new(taxonomy));
        let queries = plan_expansion_queries(&search, &[DataSource::Cve]);
        assert!(queries.is_empty());
    }

    #[test]
    fn graph_query_formats_required_and_optional_clauses() {
        let search = simple_search();
        let gq = build_graph_query(&search);
        assert_eq!(gq.match_clause, "(A:Person)-[:KNOWS]-(B:Email)");
        assert_eq!(gq.optional_match_clause, "");
        assert_eq!(gq.where_clause, "1=1 AND A.name STARTS WITH 'Tom'");
        assert!(gq.to_statement().ends_with("RETURN DISTINCT *"));
    }
}
