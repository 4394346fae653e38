//! `Search` layers additional constraints over a loaded taxonomy without
//! mutating it (§9 design note: layering, not inheritance).

use std::sync::Arc;

use super::constraint::{NodeConstraint, RelationshipConstraint};
use super::Taxonomy;

/// A search against one taxonomy. Holds its own append-only constraint
/// lists; the taxonomy's own constraints are always consulted alongside
/// them, never replaced.
#[derive(Debug, Clone)]
pub struct Search {
    pub id: String,
    pub taxonomy: Arc<Taxonomy>,
    node_constraints: Vec<NodeConstraint>,
    relationship_constraints: Vec<RelationshipConstraint>,
}

impl Search {
    pub fn new(id: impl Into<String>, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            id: id.into(),
            taxonomy,
            node_constraints: Vec::new(),
            relationship_constraints: Vec::new(),
        }
    }

    /// Appends a node constraint. Never removes or replaces an existing
    /// constraint — a Search only ever narrows the result set.
    pub fn append_node_constraint(&mut self, constraint: NodeConstraint) {
        self.node_constraints.push(constraint);
    }

    pub fn append_relationship_constraint(&mut self, constraint: RelationshipConstraint) {
        self.relationship_constraints.push(constraint);
    }

    /// All node constraints in effect: the taxonomy's own plus this
    /// search's layered additions, taxonomy constraints first.
    pub fn effective_node_constraints(&self) -> Vec<&NodeConstraint> {
        self.taxonomy
            .node_constraints
            .iter()
            .chain(self.node_constraints.iter())
            .collect()
    }

    pub fn effective_relationship_constraints(&self) -> Vec<&RelationshipConstraint> {
        self.taxonomy
            .relationship_constraints
            .iter()
            .chain(self.relationship_constraints.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::taxonomy::constraint::Comparator;
    use crate::taxonomy::node::{NodeType, TaxonomyNode, TaxonomyNodeId};
    use crate::taxonomy::relationship::RelationshipMultiplicity;
    use crate::taxonomy::{TaxonomyRelationship};

    fn tiny_taxonomy() -> Arc<Taxonomy> {
        let person = TaxonomyNode::new("p1", NodeType::Person).with_attribute("name", "");
        let email = TaxonomyNode::new("e1", NodeType::Email).with_attribute("name", "");
        let rel = TaxonomyRelationship::new(
            "r1",
            "HAS_EMAIL",
            RelationshipMultiplicity::RequiredOne,
            TaxonomyNodeId::from("p1"),
            TaxonomyNodeId::from("e1"),
        );
        Arc::new(
            Taxonomy::new(
                "t1",
                "person-taxonomy",
                TaxonomyNodeId::from("p1"),
                vec![person, email],
                vec![rel],
                vec![],
                vec![],
            )
            .unwrap(),
        )
    }

    #[test]
    fn search_is_append_only_superset_of_taxonomy_constraints() {
        let taxonomy = tiny_taxonomy();
        let mut search = Search::new("s1", taxonomy.clone());
        assert!(search.effective_node_constraints().is_empty());

        let nc = NodeConstraint::new(
            TaxonomyNodeId::from("p1"),
            NodeType::Person,
            "name",
            Comparator::StartsWith,
            Value::from("Tom"),
            ["name"],
        )
        .unwrap();
        search.append_node_constraint(nc);

        assert_eq!(search.effective_node_constraints().len(), 1);
        assert_eq!(taxonomy.node_constraints.len(), 0, "taxonomy itself must stay untouched");
    }
}
