//! In-memory event bus fake (§10.4). The sole bundled implementation of
//! `EventConsumer`/`EventProducer`; a real deployment backs these traits
//! with an actual partitioned bus instead.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CloudEvent, EventConsumer, EventProducer, InboundEvent};
use crate::error::Result;

#[derive(Default)]
struct Inner {
    queue: VecDeque<InboundEvent>,
    committed: Vec<InboundEvent>,
    published: Vec<(String, Option<String>, CloudEvent)>,
}

/// A single-process topic-less queue standing in for a partitioned bus.
/// Events pushed with `push_inbound` are returned by `poll` in FIFO order;
/// `publish` records its arguments for assertions instead of sending them
/// anywhere.
pub struct InMemoryEventBus {
    inner: Mutex<Inner>,
    next_offset: AtomicU64,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            next_offset: AtomicU64::new(0),
        }
    }

    pub fn push_inbound(&self, topic: impl Into<String>, key: Option<String>, envelope: CloudEvent) {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        self.inner.lock().queue.push_back(InboundEvent {
            topic: topic.into(),
            key,
            envelope,
            offset,
        });
    }

    pub fn committed(&self) -> Vec<InboundEvent> {
        self.inner.lock().committed.clone()
    }

    pub fn published(&self) -> Vec<(String, Option<String>, CloudEvent)> {
        self.inner.lock().published.clone()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventConsumer for InMemoryEventBus {
    async fn poll(&self, _timeout: Duration) -> Result<Option<InboundEvent>> {
        Ok(self.inner.lock().queue.pop_front())
    }

    async fn commit(&self, event: &InboundEvent) -> Result<()> {
        self.inner.lock().committed.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl EventProducer for InMemoryEventBus {
    async fn publish(&self, topic: &str, key: Option<String>, envelope: CloudEvent) -> Result<()> {
        self.inner.lock().published.push((topic.to_owned(), key, envelope));
        Ok(())
    }
}
