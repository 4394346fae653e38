//! A dyad: one source-node/relationship/target-node triple ready to be
//! formatted as a MERGE clause (§4.4, §6.4).

use crate::error::{Error, Result};
use crate::model::{PropertyMap, Value};

#[derive(Debug, Clone)]
pub struct Dyad {
    pub from_type: String,
    pub from_props: PropertyMap,
    pub edge_type: String,
    pub edge_props: PropertyMap,
    pub to_type: String,
    pub to_props: PropertyMap,
}

fn format_props(props: &PropertyMap) -> String {
    if props.is_empty() {
        return String::new();
    }
    let mut keys: Vec<&String> = props.keys().collect();
    keys.sort();
    let body = keys
        .into_iter()
        .map(|k| format!("{k}: {}", props[k].as_cypher_literal()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" {{{body}}}")
}

fn require_name(props: &PropertyMap, role: &str) -> Result<()> {
    match props.get("name") {
        Some(Value::Null) | None => Err(Error::Validation(format!(
            "dyad {role} node is missing its required 'name' property"
        ))),
        Some(_) => Ok(()),
    }
}

impl Dyad {
    /// Formats this dyad as a `MERGE (from)-[rel]->(to)` clause. Known,
    /// accepted surface: values are interpolated directly into the clause
    /// text, not parameterized at the store's API (§9 open question) — a
    /// production deployment MUST parameterize this at the call site.
    pub fn to_merge_clause(&self) -> Result<String> {
        require_name(&self.from_props, "from")?;
        require_name(&self.to_props, "to")?;

        Ok(format!(
            "(:{}{})-[:{}{}]->(:{}{})",
            self.from_type,
            format_props(&self.from_props),
            self.edge_type,
            format_props(&self.edge_props),
            self.to_type,
            format_props(&self.to_props),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
    }

    #[test]
    fn formats_a_full_dyad() {
        let dyad = Dyad {
            from_type: "Person".into(),
            from_props: props(&[("name", "V")]),
            edge_type: "HAS_PROVIDED_BUSINESS_TO".into(),
            edge_props: props(&[("amount", "42")]),
            to_type: "Organization".into(),
            to_props: props(&[("name", "Acme")]),
        };
        let clause = dyad.to_merge_clause().unwrap();
        assert_eq!(
            clause,
            "(:Person {name: 'V'})-[:HAS_PROVIDED_BUSINESS_TO {amount: '42'}]->(:Organization {name: 'Acme'})"
        );
    }

    #[test]
    fn missing_name_on_either_side_is_fatal() {
        let dyad = Dyad {
            from_type: "Person".into(),
            from_props: PropertyMap::new(),
            edge_type: "KNOWS".into(),
            edge_props: PropertyMap::new(),
            to_type: "Organization".into(),
            to_props: props(&[("name", "Acme")]),
        };
        assert!(matches!(dyad.to_merge_clause(), Err(Error::Validation(_))));
    }
}
