//! Constraint sum type: a narrowing condition attached to a taxonomy node or
//! relationship (§3). Node/Relationship constraints are kept as distinct
//! variants rather than a class hierarchy (§9 design note).

use serde::{Deserialize, Serialize};

use super::node::{NodeType, TaxonomyNodeId};
use super::relationship::TaxonomyRelId;
use crate::error::{Error, Result};
use crate::model::Value;

/// Comparison operator, with the wire token used when formatting the
/// planner's WHERE clause (§6.3, §6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    StartsWith,
    EndsWith,
    Equals,
    Different,
    GreaterThan,
    LessThan,
    GreaterOrEqualThan,
    LessOrEqualThan,
    Contains,
    Regex,
}

impl Comparator {
    pub fn wire_token(self) -> &'static str {
        match self {
            Comparator::StartsWith => " STARTS WITH ",
            Comparator::EndsWith => " ENDS WITH ",
            Comparator::Equals => " = ",
            Comparator::Different => " <> ",
            Comparator::GreaterThan => " > ",
            Comparator::LessThan => " < ",
            Comparator::GreaterOrEqualThan => " >= ",
            Comparator::LessOrEqualThan => " <= ",
            Comparator::Contains => " CONTAINS ",
            Comparator::Regex => " =~ ",
        }
    }

    /// Tag as carried in a `properties` payload item's `key` field (§6.1).
    pub fn tag(self) -> &'static str {
        match self {
            Comparator::StartsWith => "STARTSWITH",
            Comparator::EndsWith => "ENDSWITH",
            Comparator::Equals => "EQUALS",
            Comparator::Different => "DIFFERENT",
            Comparator::GreaterThan => "GREATERTHAN",
            Comparator::LessThan => "LESSTHAN",
            Comparator::GreaterOrEqualThan => "GREATEROREQUALTHAN",
            Comparator::LessOrEqualThan => "LESSOREQUALTHAN",
            Comparator::Contains => "CONTAINS",
            Comparator::Regex => "REGEX",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConstraint {
    pub affected_node_id: TaxonomyNodeId,
    pub node_type: NodeType,
    pub attribute_name: String,
    pub comparator: Comparator,
    pub value: Value,
}

impl NodeConstraint {
    /// Constructs a constraint, validating that `attribute_name` is part of
    /// the target node's attribute schema (the original's `NodeConstraint`
    /// raises `TypeError` for the same condition).
    pub fn new(
        affected_node_id: TaxonomyNodeId,
        node_type: NodeType,
        attribute_name: impl Into<String>,
        comparator: Comparator,
        value: Value,
        known_attributes: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self> {
        let attribute_name = attribute_name.into();
        let known: Vec<String> = known_attributes.into_iter().map(|s| s.as_ref().to_owned()).collect();
        if !known.iter().any(|a| a == &attribute_name) {
            return Err(Error::Validation(format!(
                "attribute {attribute_name} does not exist for node type {}",
                node_type.tag()
            )));
        }
        Ok(Self {
            affected_node_id,
            node_type,
            attribute_name,
            comparator,
            value,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipConstraint {
    pub affected_relationship_id: TaxonomyRelId,
    pub relationship_type: String,
    pub attribute_name: String,
    pub comparator: Comparator,
    pub value: Value,
}

/// A narrowing condition, either on a node or on a relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constraint {
    Node(NodeConstraint),
    Relationship(RelationshipConstraint),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_attribute() {
        let result = NodeConstraint::new(
            TaxonomyNodeId::from("n1"),
            NodeType::Person,
            "nickname",
            Comparator::Equals,
            Value::from("Tom"),
            ["name", "email"],
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn accepts_known_attribute() {
        let result = NodeConstraint::new(
            TaxonomyNodeId::from("n1"),
            NodeType::Person,
            "name",
            Comparator::StartsWith,
            Value::from("Tom"),
            ["name", "email"],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn wire_tokens_match_cypher_surface() {
        assert_eq!(Comparator::StartsWith.wire_token(), " STARTS WITH ");
        assert_eq!(Comparator::Equals.wire_token(), " = ");
        assert_eq!(Comparator::Regex.wire_token(), " =~ ");
    }
}
