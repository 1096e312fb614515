//! Wire envelopes delivered to the monitoring backend.
//!
//! Shapes follow the Application Insights ingestion schema: one envelope per
//! item, `data.baseType` naming the payload kind.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::event::{CustomDimensions, TelemetryEvent};
use crate::telemetry::identity::ApplicationIdentity;
use crate::telemetry::span::{DependencySpan, RequestSpan, TelemetryItem};

/// Envelope tag keys.
pub mod tags {
    pub const CLOUD_ROLE: &str = "ai.cloud.role";
    pub const OPERATION_ID: &str = "ai.operation.id";
    pub const OPERATION_PARENT_ID: &str = "ai.operation.parentId";
}

const SCHEMA_VERSION: u8 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub name: String,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i_key: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "baseType", content = "baseData")]
pub enum EnvelopeData {
    MessageData(MessageData),
    RequestData(RequestData),
    RemoteDependencyData(RemoteDependencyData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    pub ver: u8,
    pub message: String,
    pub severity_level: u8,
    pub properties: CustomDimensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    pub ver: u8,
    pub id: String,
    pub name: String,
    pub duration: String,
    pub response_code: String,
    pub success: bool,
    pub url: String,
    pub properties: CustomDimensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDependencyData {
    pub ver: u8,
    pub id: String,
    pub name: String,
    pub duration: String,
    pub result_code: String,
    pub success: bool,
    pub data: String,
    pub target: String,
    #[serde(rename = "type")]
    pub dependency_type: String,
    pub properties: CustomDimensions,
}

impl Envelope {
    pub fn from_item(item: &TelemetryItem) -> Self {
        match item {
            TelemetryItem::Event(event) => Self::from_event(event),
            TelemetryItem::Request(span) => Self::from_request(span),
            TelemetryItem::Dependency(span) => Self::from_dependency(span),
        }
    }

    fn from_event(event: &TelemetryEvent) -> Self {
        let mut tags = BTreeMap::new();
        if let Some(operation_id) = &event.operation_id {
            tags.insert(tags::OPERATION_ID.to_string(), operation_id.clone());
        }
        Self {
            name: "Microsoft.ApplicationInsights.Message".to_string(),
            time: event.timestamp,
            i_key: None,
            tags,
            data: EnvelopeData::MessageData(MessageData {
                ver: SCHEMA_VERSION,
                message: event.message.clone(),
                severity_level: event.severity.level_number(),
                properties: event.custom_dimensions.clone(),
            }),
        }
    }

    fn from_request(span: &RequestSpan) -> Self {
        Self {
            name: "Microsoft.ApplicationInsights.Request".to_string(),
            time: span.started_at,
            i_key: None,
            tags: operation_tags(span.trace.trace_id(), span.trace.parent_span_id()),
            data: EnvelopeData::RequestData(RequestData {
                ver: SCHEMA_VERSION,
                id: span.trace.span_id().to_string(),
                name: span.name.clone(),
                duration: format_duration(span.duration),
                response_code: span.response_code.to_string(),
                success: span.success(),
                url: span.url.clone(),
                properties: span.properties.clone(),
            }),
        }
    }

    fn from_dependency(span: &DependencySpan) -> Self {
        Self {
            name: "Microsoft.ApplicationInsights.RemoteDependency".to_string(),
            time: span.started_at,
            i_key: None,
            tags: operation_tags(span.trace.trace_id(), span.trace.parent_span_id()),
            data: EnvelopeData::RemoteDependencyData(RemoteDependencyData {
                ver: SCHEMA_VERSION,
                id: span.trace.span_id().to_string(),
                name: span.name.clone(),
                duration: format_duration(span.duration),
                result_code: span.result_code.map(|c| c.to_string()).unwrap_or_default(),
                success: span.success(),
                data: span.url.clone(),
                target: span.target.clone(),
                dependency_type: "HTTP".to_string(),
                properties: span.properties.clone(),
            }),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Stamps the producing application onto an envelope.
///
/// Applied by the client to every envelope before delivery.
pub fn tag(mut envelope: Envelope, identity: &ApplicationIdentity) -> Envelope {
    envelope
        .tags
        .insert(tags::CLOUD_ROLE.to_string(), identity.application_name().to_string());
    envelope
}

fn operation_tags(trace_id: &str, parent_id: Option<&str>) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert(tags::OPERATION_ID.to_string(), trace_id.to_string());
    if let Some(parent) = parent_id {
        tags.insert(tags::OPERATION_PARENT_ID.to_string(), parent.to_string());
    }
    tags
}

/// `DD.HH:MM:SS.ffffff`
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs / 3_600) % 24;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;
    format!(
        "{:02}.{:02}:{:02}:{:02}.{:06}",
        days,
        hours,
        minutes,
        seconds,
        duration.subsec_micros()
    )
}
