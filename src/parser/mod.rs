//! Advanced query parser (§4.2, §6.2): compiles `key:value AND …` text into
//! taxonomy-bound node constraints.
//!
//! Known, preserved behavior (§9, §10.5): the leading `AND`-delimited atom
//! (the "entity type") is discarded. Whether this is intentional type
//! discrimination or an off-by-one was never resolved upstream; this
//! implementation keeps the discard rather than guessing a fix.

use crate::error::{Error, Result};
use crate::model::Value;
use crate::taxonomy::{Comparator, NodeConstraint, NodeType, Taxonomy};

/// Parses `filters` against `taxonomy`, binding each `key:value` atom to
/// either the well-known Email node (when `key == "email"`) or the
/// taxonomy's start node.
pub fn parse_advanced_query(filters: &str, taxonomy: &Taxonomy) -> Result<Vec<NodeConstraint>> {
    let mut atoms = filters.split(" AND ");
    atoms.next(); // entity-type prefix, discarded — see module doc.

    let start_node = taxonomy.start_node();
    let mut constraints = Vec::new();

    for atom in atoms {
        let atom = atom.trim();
        if atom.is_empty() {
            return Err(Error::Parse("empty constraint atom".into()));
        }
        let (key, value) = atom
            .split_once(':')
            .ok_or_else(|| Error::Parse(format!("atom '{atom}' is missing ':'")))?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(Error::Parse(format!("atom '{atom}' has an empty key")));
        }

        let constraint = if key.eq_ignore_ascii_case("email") {
            let email_node = taxonomy.node_of_type(NodeType::Email).ok_or_else(|| {
                Error::Validation("taxonomy has no Email-typed node to bind the email filter to".into())
            })?;
            NodeConstraint::new(
                email_node.id.clone(),
                NodeType::Email,
                "name",
                Comparator::Equals,
                Value::from(value),
                email_node.attribute_names(),
            )?
        } else {
            NodeConstraint::new(
                start_node.id.clone(),
                start_node.node_type,
                key,
                Comparator::StartsWith,
                Value::from(value),
                start_node.attribute_names(),
            )?
        };
        constraints.push(constraint);
    }

    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::node::{TaxonomyNode, TaxonomyNodeId};
    use crate::taxonomy::relationship::RelationshipMultiplicity;
    use crate::taxonomy::TaxonomyRelationship;

    fn taxonomy_with_email() -> Taxonomy {
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
    fn parses_email_and_generic_atoms() {
        let taxonomy = taxonomy_with_email();
        let constraints =
            parse_advanced_query("person AND email: a@b.co AND name: LA", &taxonomy).unwrap();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].affected_node_id, TaxonomyNodeId::from("e1"));
        assert!(matches!(constraints[0].comparator, Comparator::Equals));
        assert_eq!(constraints[0].value.as_str(), Some("a@b.co"));

        assert_eq!(constraints[1].affected_node_id, TaxonomyNodeId::from("p1"));
        assert!(matches!(constraints[1].comparator, Comparator::StartsWith));
        assert_eq!(constraints[1].value.as_str(), Some("LA"));
    }

    #[test]
    fn discards_leading_entity_type_atom() {
        let taxonomy = taxonomy_with_email();
        let constraints = parse_advanced_query("person AND name: Tom", &taxonomy).unwrap();
        assert_eq!(constraints.len(), 1);
    }

    #[test]
    fn rejects_atom_without_colon() {
        let taxonomy = taxonomy_with_email();
        let result = parse_advanced_query("person AND nocolonhere", &taxonomy);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_empty_atom() {
        let taxonomy = taxonomy_with_email();
        let result = parse_advanced_query("person AND  AND name: Tom", &taxonomy);
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
