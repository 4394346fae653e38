//! Staged documents and the lazy stream collaborator contract (§4.4, §9:
//! the staged-document pipeline must never materialize all hits in memory).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::Result;

/// One candidate extraction for an entity field, as staged by an upstream
/// document parser — e.g. `{"answer": "V", "score": 0.95}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubEntity {
    pub answer: Json,
    #[serde(default)]
    pub score: f64,
}

/// A staged document: entity-field name → candidate extractions.
pub type StagedDocument = HashMap<String, Vec<SubEntity>>;

/// Collaborator contract for a lazy, restartable document cursor. The
/// crate ships `VecDocumentStream` as the sole reference implementation;
/// a real deployment backs this with the staging store's scroll/cursor API.
#[async_trait]
pub trait DocumentStream: Send {
    async fn next_document(&mut self) -> Result<Option<StagedDocument>>;
}

/// An in-memory, `Vec`-backed document stream, used to drive graph-write
/// planner tests deterministically.
pub struct VecDocumentStream {
    documents: std::collections::VecDeque<StagedDocument>,
}

impl VecDocumentStream {
    pub fn new(documents: Vec<StagedDocument>) -> Self {
        Self {
            documents: documents.into(),
        }
    }
}

#[async_trait]
impl DocumentStream for VecDocumentStream {
    async fn next_document(&mut self) -> Result<Option<StagedDocument>> {
        Ok(self.documents.pop_front())
    }
}
