//! Taxonomy node identity and type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::PropertyMap;

/// Opaque node identifier, stable within one taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyNodeId(pub String);

impl fmt::Display for TaxonomyNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaxonomyNodeId {
    fn from(s: &str) -> Self {
        TaxonomyNodeId(s.to_owned())
    }
}

impl From<String> for TaxonomyNodeId {
    fn from(s: String) -> Self {
        TaxonomyNodeId(s)
    }
}

/// The 19-tag taxonomy node type enumeration (§6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Organization,
    Person,
    Thing,
    Product,
    DigitalDocument,
    Vulnerability,
    Place,
    Email,
    Website,
    Phone,
    Passport,
    School,
    BankAccount,
    Patent,
    Certification,
    PublishedWork,
    SocialSecurityNumber,
    SocialMedia,
    DataBreach,
}

impl NodeType {
    /// The schema.org-shaped label used when the graph writer or query
    /// builder needs a smaller, store-facing type vocabulary. Every tag
    /// collapses to one of {Organization, Person, Thing} (§6.3).
    pub fn schema_collapse(self) -> &'static str {
        match self {
            NodeType::Organization | NodeType::School => "Organization",
            NodeType::Person => "Person",
            NodeType::Thing
            | NodeType::Product
            | NodeType::DigitalDocument
            | NodeType::Vulnerability
            | NodeType::Place
            | NodeType::Email
            | NodeType::Website
            | NodeType::Phone
            | NodeType::Passport
            | NodeType::BankAccount
            | NodeType::Patent
            | NodeType::Certification
            | NodeType::PublishedWork
            | NodeType::SocialSecurityNumber
            | NodeType::SocialMedia
            | NodeType::DataBreach => "Thing",
        }
    }

    /// The full tag name, used as a graph label when the planner needs the
    /// un-collapsed type (e.g. in required/optional MATCH clauses).
    pub fn tag(self) -> &'static str {
        match self {
            NodeType::Organization => "Organization",
            NodeType::Person => "Person",
            NodeType::Thing => "Thing",
            NodeType::Product => "Product",
            NodeType::DigitalDocument => "DigitalDocument",
            NodeType::Vulnerability => "Vulnerability",
            NodeType::Place => "Place",
            NodeType::Email => "Email",
            NodeType::Website => "Website",
            NodeType::Phone => "Phone",
            NodeType::Passport => "Passport",
            NodeType::School => "School",
            NodeType::BankAccount => "BankAccount",
            NodeType::Patent => "Patent",
            NodeType::Certification => "Certification",
            NodeType::PublishedWork => "PublishedWork",
            NodeType::SocialSecurityNumber => "SocialSecurityNumber",
            NodeType::SocialMedia => "SocialMedia",
            NodeType::DataBreach => "DataBreach",
        }
    }

    /// Parses a tag name as produced by `tag()`. Used by the graph-write
    /// planner's `types` map validation (unknown tags are reported, not
    /// fatal to the whole batch).
    pub fn from_tag(s: &str) -> Option<Self> {
        Some(match s {
            "Organization" => NodeType::Organization,
            "Person" => NodeType::Person,
            "Thing" => NodeType::Thing,
            "Product" => NodeType::Product,
            "DigitalDocument" => NodeType::DigitalDocument,
            "Vulnerability" => NodeType::Vulnerability,
            "Place" => NodeType::Place,
            "Email" => NodeType::Email,
            "Website" => NodeType::Website,
            "Phone" => NodeType::Phone,
            "Passport" => NodeType::Passport,
            "School" => NodeType::School,
            "BankAccount" => NodeType::BankAccount,
            "Patent" => NodeType::Patent,
            "Certification" => NodeType::Certification,
            "PublishedWork" => NodeType::PublishedWork,
            "SocialSecurityNumber" => NodeType::SocialSecurityNumber,
            "SocialMedia" => NodeType::SocialMedia,
            "DataBreach" => NodeType::DataBreach,
            _ => return None,
        })
    }
}

/// A node in a taxonomy: an identity, a type tag, and its attribute schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub id: TaxonomyNodeId,
    pub node_type: NodeType,
    pub attributes: PropertyMap,
}

impl TaxonomyNode {
    pub fn new(id: impl Into<TaxonomyNodeId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            attributes: PropertyMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<crate::model::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The attribute names a constraint is allowed to target.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_collapse_has_only_three_targets() {
        let all = [
            NodeType::Organization,
            NodeType::Person,
            NodeType::Thing,
            NodeType::Product,
            NodeType::DigitalDocument,
            NodeType::Vulnerability,
            NodeType::Place,
            NodeType::Email,
            NodeType::Website,
            NodeType::Phone,
            NodeType::Passport,
            NodeType::School,
            NodeType::BankAccount,
            NodeType::Patent,
            NodeType::Certification,
            NodeType::PublishedWork,
            NodeType::SocialSecurityNumber,
            NodeType::SocialMedia,
            NodeType::DataBreach,
        ];
        for t in all {
            let collapsed = t.schema_collapse();
            assert!(matches!(collapsed, "Organization" | "Person" | "Thing"));
        }
    }

    #[test]
    fn tag_round_trips_through_from_tag() {
        assert_eq!(NodeType::from_tag("Email"), Some(NodeType::Email));
        assert_eq!(NodeType::from_tag("NotARealType"), None);
    }
}
