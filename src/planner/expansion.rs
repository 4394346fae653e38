//! Wire-facing types for the planner's output: a payload fan-out item, its
//! attached properties, and the resulting `ExpansionQuery` (§3, §6.1).

use serde::{Deserialize, Serialize};

use crate::model::Value;
use crate::taxonomy::TaxonomyNodeId;

/// A fetchable data source, as declared to a Search (§6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSource {
    Cve,
    DataScraper,
    PeopleDataLabs,
    CoAuthors,
    SocialMediaExtractor,
    EmailBreachDetector,
    SamsDataset,
}

impl DataSource {
    pub fn tag(self) -> &'static str {
        match self {
            DataSource::Cve => "CVE",
            DataSource::DataScraper => "dataScraper",
            DataSource::PeopleDataLabs => "peopleDataLabs",
            DataSource::CoAuthors => "coAuthors",
            DataSource::SocialMediaExtractor => "socialMediaExtractor",
            DataSource::EmailBreachDetector => "emailBreachDetector",
            DataSource::SamsDataset => "samsDataset",
        }
    }
}

/// A single constraint restated as a payload property (§6.1: `{key, value,
/// subject, type:"property"}`, `key` carrying the comparator tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyItem {
    pub key: String,
    pub value: Value,
    pub subject: String,
    #[serde(rename = "type")]
    pub item_type: String,
}

impl PropertyItem {
    pub fn new(comparator_tag: &str, value: Value, attribute_name: impl Into<String>) -> Self {
        Self {
            key: comparator_tag.to_owned(),
            value,
            subject: attribute_name.into(),
            item_type: "property".to_owned(),
        }
    }
}

/// One fan-out item of an `ExpansionQuery` payload (§6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadItem {
    pub key: String,
    pub value: Value,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_node_id: Option<TaxonomyNodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
}

/// One unit of planner output: a path through the taxonomy, narrowed to one
/// data source, with constraint-derived properties attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionQuery {
    pub id: String,
    pub search_id: String,
    pub taxonomy_id: String,
    pub items: Vec<PayloadItem>,
}

impl ExpansionQuery {
    /// Canonical form used to deduplicate structurally-identical queries
    /// produced by different paths (ids excluded — only shape matters).
    pub fn canonical_key(&self) -> String {
        #[derive(Serialize)]
        struct Canonical<'a> {
            taxonomy_id: &'a str,
            items: &'a [PayloadItem],
        }
        serde_json::to_string(&Canonical {
            taxonomy_id: &self.taxonomy_id,
            items: &self.items,
        })
        .expect("PayloadItem serialization cannot fail")
    }

    pub fn has_any_properties(&self) -> bool {
        self.items.iter().any(|i| !i.properties.is_empty())
    }
}
