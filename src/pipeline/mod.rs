//! Pipeline runtime (§4.3, §5): a generic event-driven stage. Subscribes to
//! inbound topics, dispatches to a user handler with bounded concurrency,
//! republishes 0..N result events while preserving causal metadata.

pub mod envelope;
pub mod fake;
pub mod topic;

pub use envelope::{CloudEvent, GenerateOptions};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as Json;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

/// One event pulled off an inbound topic.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub topic: String,
    pub key: Option<String>,
    pub envelope: CloudEvent,
    pub offset: u64,
}

/// Collaborator contract for the event bus's consume side.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    async fn poll(&self, timeout: Duration) -> Result<Option<InboundEvent>>;
    async fn commit(&self, event: &InboundEvent) -> Result<()>;
}

/// Collaborator contract for the event bus's produce side.
#[async_trait]
pub trait EventProducer: Send + Sync {
    async fn publish(&self, topic: &str, key: Option<String>, envelope: CloudEvent) -> Result<()>;
}

/// A stage's business logic: decode payload in, 0..N payloads out. Modeled
/// as an iterator-producing handler (§9) rather than a `T | List[T]` union.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        payload: Json,
        event_name: &str,
        tenant: &str,
        correlation_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<Json>>;
}

#[derive(Debug, Clone)]
pub struct PipelineStageConfig {
    pub environment: String,
    pub service_name: String,
    pub outbound_event: String,
    pub key_prefix: Option<String>,
    pub max_workers: usize,
}

/// Runs one stage of the pipeline: poll, dispatch, publish, commit.
pub struct PipelineStage<C, P, H> {
    consumer: Arc<C>,
    producer: Arc<P>,
    handler: Arc<H>,
    config: PipelineStageConfig,
    semaphore: Option<Arc<Semaphore>>,
}

impl<C, P, H> PipelineStage<C, P, H>
where
    C: EventConsumer + 'static,
    P: EventProducer + 'static,
    H: Handler + 'static,
{
    pub fn new(consumer: Arc<C>, producer: Arc<P>, handler: Arc<H>, config: PipelineStageConfig) -> Self {
        let semaphore = (config.max_workers > 0).then(|| Arc::new(Semaphore::new(config.max_workers)));
        Self {
            consumer,
            producer,
            handler,
            config,
            semaphore,
        }
    }

    /// Polls until `should_continue` returns false (tests use this to run a
    /// bounded number of iterations instead of looping forever).
    pub async fn run_until(&self, mut should_continue: impl FnMut() -> bool) -> Result<()> {
        while should_continue() {
            if let Some(sem) = &self.semaphore {
                // Strict cap: wait for a slot before issuing the next poll.
                let permit = sem.clone().acquire_owned().await.map_err(|_| Error::Bus("semaphore closed".into()))?;
                let Some(event) = self.consumer.poll(Duration::from_secs(1)).await? else {
                    drop(permit);
                    continue;
                };
                let stage = self.dispatch_clone();
                tokio::spawn(async move {
                    stage.process_event(event).await;
                    drop(permit);
                });
            } else {
                let Some(event) = self.consumer.poll(Duration::from_secs(1)).await? else {
                    continue;
                };
                self.process_event(event).await;
            }
        }
        Ok(())
    }

    fn dispatch_clone(&self) -> DispatchHandle<C, P, H> {
        DispatchHandle {
            consumer: self.consumer.clone(),
            producer: self.producer.clone(),
            handler: self.handler.clone(),
            config: self.config.clone(),
        }
    }

    async fn process_event(&self, event: InboundEvent) {
        self.dispatch_clone().process_event(event).await
    }
}

/// The per-event work, split out so it can be moved into a spawned task
/// without borrowing the owning `PipelineStage`.
struct DispatchHandle<C, P, H> {
    consumer: Arc<C>,
    producer: Arc<P>,
    handler: Arc<H>,
    config: PipelineStageConfig,
}

impl<C, P, H> DispatchHandle<C, P, H>
where
    C: EventConsumer,
    P: EventProducer,
    H: Handler,
{
    /// Dispatches to the handler, publishes its outputs, and commits.
    /// A handler error is isolated to this event: logged, no publish, but
    /// still committed as processed. A publish error is treated as fatal
    /// to the owning stage (§7) — it is logged and the event is left
    /// uncommitted so the bus redelivers it after the stage restarts.
    async fn process_event(&self, event: InboundEvent) {
        let tenant = topic::tenant_from_topic(&event.topic).unwrap_or("unknown").to_owned();
        let correlation_id = event.envelope.extensions.correlationid.clone();
        let parent_id = event.envelope.extensions.parent_id.clone();

        debug!(correlation_id, tenant, topic = %event.topic, "dispatching event");

        let outcome = async {
            let payload = event.envelope.payload()?;
            self.handler
                .handle(payload, &self.config.outbound_event, &tenant, &correlation_id, parent_id.as_deref())
                .await
        }
        .await;

        let should_commit = match outcome {
            Ok(payloads) => match self.publish_all(&event, &tenant, payloads).await {
                Ok(()) => true,
                Err(e) => {
                    error!(correlation_id, error = %e, "publish failed, leaving event uncommitted");
                    false
                }
            },
            Err(e) => {
                warn!(correlation_id, error = %e, "handler failed, event will not be republished");
                true
            }
        };

        if should_commit {
            if let Err(e) = self.consumer.commit(&event).await {
                error!(correlation_id, error = %e, "commit failed");
            }
        }
    }

    async fn publish_all(&self, event: &InboundEvent, tenant: &str, payloads: Vec<Json>) -> Result<()> {
        let outbound_topic = topic::outbound_topic(
            &self.config.environment,
            tenant,
            &self.config.service_name,
            &self.config.outbound_event,
        );

        let key = event.key.as_ref().and_then(|k| {
            self.config.key_prefix.as_ref().map(|prefix| topic::propagate_key(prefix, k))
        });

        // A single output is a pass-through: preserve the inbound event's
        // identity (§4.3). Only a fan-out (more than one output) mints child
        // events with a promoted parent id and incremented depth (§8
        // scenario 5).
        let fans_out = payloads.len() > 1;

        for payload in payloads {
            let outbound_envelope = if fans_out {
                event.envelope.derive_expansion(&payload)?
            } else {
                event.envelope.derive_from(&payload)?
            };
            info!(topic = %outbound_topic, "publishing event");
            self.producer.publish(&outbound_topic, key.clone(), outbound_envelope).await?;
        }
        Ok(())
    }
}
