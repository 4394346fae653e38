//! Graph-write planner (§4.4): projects staged documents onto a configurable
//! dyad schema and persists them in bounded, transactional chunks.

pub mod document;
pub mod dyad;

pub use document::{DocumentStream, StagedDocument, SubEntity};
pub use dyad::Dyad;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::graphdb::GraphDatabase;
use crate::model::{PropertyMap, Value};
use crate::taxonomy::NodeType;

/// The projection plan (§4.4). `from`/`to`/`relationship` are the
/// authoritative keys (§9, §10.5) — `fromType`/`toType` naming from the
/// system this was distilled from is not carried over.
#[derive(Debug, Clone)]
pub struct WritePlan {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub relationship: Vec<String>,
    pub from_props: Vec<String>,
    pub to_props: Vec<String>,
    pub relationship_props: Vec<String>,
    pub prop_map: HashMap<String, String>,
    pub types: HashMap<String, String>,
    pub thresholds: HashMap<String, f64>,
}

impl WritePlan {
    /// Right-pads `from`/`to`/`relationship` to the longest of the three by
    /// repeating each list's first element (§4.4).
    pub fn equalized(mut self) -> Result<Self> {
        let longest = [self.from.len(), self.to.len(), self.relationship.len()]
            .into_iter()
            .max()
            .unwrap_or(0);

        for list in [&mut self.from, &mut self.to, &mut self.relationship] {
            if list.is_empty() {
                continue;
            }
            let first = list[0].clone();
            while list.len() < longest {
                list.push(first.clone());
            }
        }
        Ok(self)
    }

    fn projection_count(&self) -> usize {
        self.from.len().min(self.to.len()).min(self.relationship.len())
    }

    fn node_type_tag(&self, field: &str) -> Result<String> {
        let tag = self
            .types
            .get(field)
            .ok_or_else(|| Error::Validation(format!("no type mapping for field '{field}'")))?;
        NodeType::from_tag(tag)
            .ok_or_else(|| Error::Validation(format!("unknown node type tag '{tag}' for field '{field}'")))?;
        Ok(tag.clone())
    }

    fn rename(&self, key: &str) -> String {
        self.prop_map.get(key).cloned().unwrap_or_else(|| key.to_owned())
    }
}

/// Candidates on a document field surviving that field's score threshold
/// (§4.4: `score >= threshold`, inclusive).
fn surviving_candidates<'a>(doc: &'a StagedDocument, field: &str, thresholds: &HashMap<String, f64>) -> Vec<&'a SubEntity> {
    let threshold = thresholds.get(field).copied().unwrap_or(0.0);
    doc.get(field)
        .into_iter()
        .flatten()
        .filter(|c| c.score >= threshold)
        .collect()
}

/// Projects `keys` off the first candidate that survived threshold
/// filtering (§4.4 steps 2-3: filter, then project survivors; never a
/// candidate the threshold already dropped).
fn extract_props(survivors: &[&SubEntity], keys: &[String], plan: &WritePlan) -> PropertyMap {
    let mut props = PropertyMap::new();
    if let Some(first) = survivors.first() {
        for key in keys {
            let value = if key == "answer" {
                Some(first.answer.clone())
            } else {
                None
            };
            if let Some(json_value) = value {
                props.insert(plan.rename(key), json_to_value(&json_value));
            }
        }
    }
    props
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

/// Projects one staged document into zero or more dyads. A projection is
/// skipped (not an error) when either its `from` or `to` field has no
/// surviving candidate after threshold filtering — a dyad additionally
/// requires a `name` property on both endpoints, which `Dyad::to_merge_clause`
/// enforces as fatal once a candidate has been chosen.
pub fn project_document(doc: &StagedDocument, plan: &WritePlan) -> Result<Vec<Dyad>> {
    let mut dyads = Vec::new();

    for i in 0..plan.projection_count() {
        let from_field = &plan.from[i];
        let to_field = &plan.to[i];
        let edge_type = plan.relationship[i].clone();

        let from_candidates = surviving_candidates(doc, from_field, &plan.thresholds);
        let to_candidates = surviving_candidates(doc, to_field, &plan.thresholds);
        if from_candidates.is_empty() || to_candidates.is_empty() {
            continue;
        }

        let from_type = plan.node_type_tag(from_field)?;
        let to_type = plan.node_type_tag(to_field)?;

        let from_props = extract_props(&from_candidates, &plan.from_props, plan);
        let to_props = extract_props(&to_candidates, &plan.to_props, plan);
        let edge_props = plan
            .relationship_props
            .iter()
            .filter_map(|field| {
                surviving_candidates(doc, field, &plan.thresholds)
                    .first()
                    .map(|c| (plan.rename(field), json_to_value(&c.answer)))
            })
            .collect();

        dyads.push(Dyad {
            from_type,
            from_props,
            edge_type,
            edge_props,
            to_type,
            to_props,
        });
    }

    Ok(dyads)
}

#[derive(Debug, Clone, Default)]
pub struct WriteStats {
    pub dyads_written: usize,
    pub chunks_committed: usize,
}

/// Streams documents out of `stream`, projects each into dyads, and
/// commits fixed-size chunks of MERGE clauses transactionally. Stops and
/// surfaces the error on the first failing chunk or dyad — the caller
/// decides whether to retry (§4.4, §7: `UpstreamError` is not retried by
/// the core).
pub async fn write_stream(
    stream: &mut dyn DocumentStream,
    plan: &WritePlan,
    db: &dyn GraphDatabase,
    chunk_size: usize,
) -> Result<WriteStats> {
    let mut stats = WriteStats::default();
    let mut buffer: Vec<String> = Vec::with_capacity(chunk_size);

    while let Some(doc) = stream.next_document().await? {
        for dyad in project_document(&doc, plan)? {
            buffer.push(dyad.to_merge_clause()?);
            stats.dyads_written += 1;
            if buffer.len() >= chunk_size {
                db.execute_chunk(&buffer).await?;
                stats.chunks_committed += 1;
                buffer.clear();
            }
        }
    }

    if !buffer.is_empty() {
        db.execute_chunk(&buffer).await?;
        stats.chunks_committed += 1;
    }

    Ok(stats)
}
