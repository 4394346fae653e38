//! Taxonomy relationship identity, type and multiplicity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::TaxonomyNodeId;
use crate::model::PropertyMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyRelId(pub String);

impl fmt::Display for TaxonomyRelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaxonomyRelId {
    fn from(s: &str) -> Self {
        TaxonomyRelId(s.to_owned())
    }
}

/// Cardinality constraint on a taxonomy edge (§6.3). REQUIRED_* relationships
/// are emitted in the planner's MATCH clause; OPTIONAL_* in OPTIONAL MATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipMultiplicity {
    RequiredOne,
    RequiredMany,
    OptionalMany,
    OptionalZeroOrMore,
}

impl RelationshipMultiplicity {
    pub fn is_required(self) -> bool {
        matches!(self, Self::RequiredOne | Self::RequiredMany)
    }
}

/// A directed edge between two taxonomy nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyRelationship {
    pub id: TaxonomyRelId,
    pub rel_type: String,
    pub multiplicity: RelationshipMultiplicity,
    pub source_id: TaxonomyNodeId,
    pub target_id: TaxonomyNodeId,
    pub properties: PropertyMap,
}

impl TaxonomyRelationship {
    pub fn new(
        id: impl Into<TaxonomyRelId>,
        rel_type: impl Into<String>,
        multiplicity: RelationshipMultiplicity,
        source_id: TaxonomyNodeId,
        target_id: TaxonomyNodeId,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            multiplicity,
            source_id,
            target_id,
            properties: PropertyMap::new(),
        }
    }
}
