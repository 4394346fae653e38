//! Graph database collaborator contract.
//!
//! The crate only defines the seam; an actual Bolt/Neo4j driver is an
//! external collaborator reached through this trait. `InMemoryGraphDatabase`
//! is the sole bundled implementation, used for tests and embedding.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Executes one chunk of MERGE clauses as a single transactional
/// statement. Implementations must roll back the whole chunk on failure
/// and surface the error rather than retrying it (§4.4, §7).
#[async_trait]
pub trait GraphDatabase: Send + Sync {
    async fn execute_chunk(&self, merge_clauses: &[String]) -> Result<()>;
}

#[derive(Default)]
struct Inner {
    committed_chunks: Vec<Vec<String>>,
}

/// Records every chunk it is asked to execute; can be configured to fail
/// on a specific chunk index to exercise the rollback/surface path.
pub struct InMemoryGraphDatabase {
    inner: Mutex<Inner>,
    fail_at_chunk: Option<usize>,
}

impl InMemoryGraphDatabase {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_at_chunk: None,
        }
    }

    pub fn failing_at_chunk(chunk_index: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_at_chunk: Some(chunk_index),
        }
    }

    pub fn committed_chunks(&self) -> Vec<Vec<String>> {
        self.inner.lock().committed_chunks.clone()
    }
}

impl Default for InMemoryGraphDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphDatabase for InMemoryGraphDatabase {
    async fn execute_chunk(&self, merge_clauses: &[String]) -> Result<()> {
        let mut inner = self.inner.lock();
        let chunk_index = inner.committed_chunks.len();
        if self.fail_at_chunk == Some(chunk_index) {
            return Err(Error::Upstream(format!("simulated store failure on chunk {chunk_index}")));
        }
        inner.committed_chunks.push(merge_clauses.to_vec());
        Ok(())
    }
}
