//! Taxonomy: an immutable typed multi-graph loaded once per process and
//! never mutated (§3). `Search` (see `search` submodule) layers additional
//! constraints on top without touching the loaded taxonomy.

pub mod constraint;
pub mod node;
pub mod relationship;
pub mod search;

pub use constraint::{Comparator, Constraint, NodeConstraint, RelationshipConstraint};
pub use node::{NodeType, TaxonomyNode, TaxonomyNodeId};
pub use relationship::{RelationshipMultiplicity, TaxonomyRelId, TaxonomyRelationship};
pub use search::Search;

use std::sync::Arc;

use crate::error::{Error, Result};

/// An immutable typed multi-graph: nodes carry a `NodeType` and attribute
/// schema; edges carry a relationship type and multiplicity constraint.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub id: String,
    pub name: String,
    pub start_id: TaxonomyNodeId,
    pub nodes: Vec<TaxonomyNode>,
    pub relationships: Vec<TaxonomyRelationship>,
    pub node_constraints: Vec<NodeConstraint>,
    pub relationship_constraints: Vec<RelationshipConstraint>,
}

impl Taxonomy {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_id: TaxonomyNodeId,
        nodes: Vec<TaxonomyNode>,
        relationships: Vec<TaxonomyRelationship>,
        node_constraints: Vec<NodeConstraint>,
        relationship_constraints: Vec<RelationshipConstraint>,
    ) -> Result<Self> {
        let taxonomy = Self {
            id: id.into(),
            name: name.into(),
            start_id,
            nodes,
            relationships,
            node_constraints,
            relationship_constraints,
        };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Checks the invariants from §3: every relationship resolves its
    /// endpoints within the node list, `start_id` resolves to a member node,
    /// and every constraint targets an existing node/relationship.
    fn validate(&self) -> Result<()> {
        if self.node(&self.start_id).is_none() {
            return Err(Error::Validation(format!(
                "start node {} is not a member of taxonomy {}",
                self.start_id, self.name
            )));
        }
        for rel in &self.relationships {
            if self.node(&rel.source_id).is_none() {
                return Err(Error::Validation(format!(
                    "relationship {} references unknown source node {}",
                    rel.id, rel.source_id
                )));
            }
            if self.node(&rel.target_id).is_none() {
                return Err(Error::Validation(format!(
                    "relationship {} references unknown target node {}",
                    rel.id, rel.target_id
                )));
            }
        }
        for nc in &self.node_constraints {
            if self.node(&nc.affected_node_id).is_none() {
                return Err(Error::Validation(format!(
                    "node constraint references unknown node {}",
                    nc.affected_node_id
                )));
            }
        }
        for rc in &self.relationship_constraints {
            if !self
                .relationships
                .iter()
                .any(|r| r.id == rc.affected_relationship_id)
            {
                return Err(Error::Validation(format!(
                    "relationship constraint references unknown relationship {}",
                    rc.affected_relationship_id
                )));
            }
        }
        Ok(())
    }

    pub fn node(&self, id: &TaxonomyNodeId) -> Option<&TaxonomyNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn start_node(&self) -> &TaxonomyNode {
        self.node(&self.start_id)
            .expect("validated at construction")
    }

    /// The first node of the given type, used by the parser's `email` special
    /// case (§4.2) and similar well-known-node lookups.
    pub fn node_of_type(&self, node_type: NodeType) -> Option<&TaxonomyNode> {
        self.nodes.iter().find(|n| n.node_type == node_type)
    }

    pub fn relationships_from(&self, id: &TaxonomyNodeId) -> impl Iterator<Item = &TaxonomyRelationship> {
        self.relationships.iter().filter(move |r| &r.source_id == id)
    }

    pub fn node_constraints_for(&self, id: &TaxonomyNodeId) -> impl Iterator<Item = &NodeConstraint> {
        self.node_constraints.iter().filter(move |c| &c.affected_node_id == id)
    }
}

/// Collaborator contract for loading a taxonomy artifact by id. The crate
/// ships `FileTaxonomyStore` as the sole reference implementation; a real
/// deployment may back this with a schema service instead.
pub trait TaxonomyStore: Send + Sync {
    fn load(&self, taxonomy_id: &str) -> Result<Arc<Taxonomy>>;
}

/// Loads taxonomies from JSON artifacts under a directory, named
/// `taxonomy_{id}.json` (the serialized-artifact analogue of the original
/// per-id `taxonomy_{id}.joblib` files).
pub struct FileTaxonomyStore {
    artifact_dir: std::path::PathBuf,
}

impl FileTaxonomyStore {
    pub fn new(artifact_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    fn artifact_path(&self, taxonomy_id: &str) -> std::path::PathBuf {
        self.artifact_dir.join(format!("taxonomy_{taxonomy_id}.json"))
    }
}

impl TaxonomyStore for FileTaxonomyStore {
    fn load(&self, taxonomy_id: &str) -> Result<Arc<Taxonomy>> {
        let path = self.artifact_path(taxonomy_id);
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("failed to read taxonomy artifact {}: {e}", path.display()))
        })?;
        let artifact: TaxonomyArtifact = serde_json::from_str(&raw)?;
        Ok(Arc::new(artifact.into_taxonomy(taxonomy_id)?))
    }
}

/// Serialization-friendly shape for a taxonomy artifact on disk.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct TaxonomyArtifact {
    name: String,
    start_id: String,
    nodes: Vec<TaxonomyNode>,
    relationships: Vec<TaxonomyRelationship>,
    node_constraints: Vec<NodeConstraint>,
    #[serde(default)]
    relationship_constraints: Vec<RelationshipConstraint>,
}

impl TaxonomyArtifact {
    fn into_taxonomy(self, taxonomy_id: &str) -> Result<Taxonomy> {
        Taxonomy::new(
            taxonomy_id,
            self.name,
            TaxonomyNodeId::from(self.start_id),
            self.nodes,
            self.relationships,
            self.node_constraints,
            self.relationship_constraints,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::relationship::RelationshipMultiplicity;

    fn tiny_taxonomy() -> Taxonomy {
        let person = TaxonomyNode::new("p1", NodeType::Person).with_attribute("name", "");
        let email = TaxonomyNode::new("e1", NodeType::Email).with_attribute("name", "");
        let rel = TaxonomyRelationship::new(
            "r1",
            "HAS_EMAIL",
            RelationshipMultiplicity::RequiredOne,
            TaxonomyNodeId::from("p1"),
            TaxonomyNodeId::from("e1"),
        );
        Taxonomy::new(
            "t1",
            "person-taxonomy",
            TaxonomyNodeId::from("p1"),
            vec![person, email],
            vec![rel],
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn rejects_dangling_start_node() {
        let result = Taxonomy::new(
            "t2",
            "broken",
            TaxonomyNodeId::from("missing"),
            vec![TaxonomyNode::new("p1", NodeType::Person)],
            vec![],
            vec![],
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn node_of_type_finds_email_node() {
        let t = tiny_taxonomy();
        let found = t.node_of_type(NodeType::Email).unwrap();
        assert_eq!(found.id, TaxonomyNodeId::from("e1"));
    }
}
