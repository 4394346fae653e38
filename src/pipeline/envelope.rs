//! CloudEvent envelope (§4.5, §3): uniform message layout carrying
//! correlation and parent identifiers across stage boundaries.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::{Error, Result};

const DEFAULT_TTL: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extensions {
    pub correlationid: String,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub ttl: u32,
    pub depth: u32,
    #[serde(rename = "clientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeData {
    pub value: Vec<u8>,
}

/// The message envelope every pipeline stage consumes and produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEvent {
    pub id: String,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub time: DateTime<Utc>,
    pub subject: String,
    pub source: String,
    pub extensions: Extensions,
    pub data: EnvelopeData,
}

/// Optional knobs for `CloudEvent::generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub client_id: Option<String>,
    pub parent_id: Option<String>,
    pub depth: u32,
}

fn now_second_granularity() -> DateTime<Utc> {
    Utc.timestamp_opt(Utc::now().timestamp(), 0).single().expect("valid timestamp")
}

fn as_object_mut(payload: &mut Json) -> Result<&mut Map<String, Json>> {
    payload
        .as_object_mut()
        .ok_or_else(|| Error::Validation("cloud-event payload must be a JSON object".into()))
}

impl CloudEvent {
    /// Builds a fresh envelope. `correlationid` defaults to the new event
    /// id unless `payload` already carries a `correlationId` field, in
    /// which case that value is kept stable. The payload's own `id`,
    /// `searchId`, `correlationId` and `parentId` fields are overwritten to
    /// match the envelope so downstream handlers can rely on either.
    pub fn generate(
        mut payload: Json,
        subject: impl Into<String>,
        source: impl Into<String>,
        opts: GenerateOptions,
    ) -> Result<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        let correlationid = {
            let obj = as_object_mut(&mut payload)?;
            obj.get("correlationId")
                .and_then(Json::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| id.clone())
        };

        let extensions = Extensions {
            correlationid: correlationid.clone(),
            parent_id: opts.parent_id.clone(),
            ttl: DEFAULT_TTL,
            depth: opts.depth,
            client_id: opts.client_id,
        };

        {
            let obj = as_object_mut(&mut payload)?;
            obj.insert("id".into(), Json::String(id.clone()));
            obj.insert("searchId".into(), Json::String(id.clone()));
            obj.insert("correlationId".into(), Json::String(correlationid));
            obj.insert(
                "parentId".into(),
                opts.parent_id.clone().map(Json::String).unwrap_or(Json::Null),
            );
        }

        Ok(Self {
            id,
            parent_id: opts.parent_id,
            time: now_second_granularity(),
            subject: subject.into(),
            source: source.into(),
            extensions,
            data: EnvelopeData {
                value: serde_json::to_vec(&payload)?,
            },
        })
    }

    /// A pass-through derivation: same `id` and extensions, fresh `time`
    /// and payload bytes. Used by stages that forward a message unchanged
    /// in identity, only transformed in content.
    pub fn derive_from(&self, payload: &Json) -> Result<Self> {
        Ok(Self {
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
            time: now_second_granularity(),
            subject: self.subject.clone(),
            source: self.source.clone(),
            extensions: self.extensions.clone(),
            data: EnvelopeData {
                value: serde_json::to_vec(payload)?,
            },
        })
    }

    /// An expansion derivation: promotes this envelope's `id` to the new
    /// envelope's `parentId`, assigns a fresh `id`, increments `depth`, and
    /// resets `subject` to `"expansion"`. Unlike the implementation this
    /// behavior was distilled from, `correlationid` is carried over
    /// unchanged — it must stay stable across every descendant of a search
    /// (§3), not reset on each expansion step.
    pub fn derive_expansion(&self, payload: &Json) -> Result<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        Ok(Self {
            id: id.clone(),
            parent_id: Some(self.id.clone()),
            time: now_second_granularity(),
            subject: "expansion".to_owned(),
            source: self.source.clone(),
            extensions: Extensions {
                correlationid: self.extensions.correlationid.clone(),
                parent_id: Some(self.id.clone()),
                ttl: self.extensions.ttl,
                depth: self.extensions.depth + 1,
                client_id: self.extensions.client_id.clone(),
            },
            data: EnvelopeData {
                value: serde_json::to_vec(payload)?,
            },
        })
    }

    pub fn payload(&self) -> Result<Json> {
        Ok(serde_json::from_slice(&self.data.value)?)
    }
}
