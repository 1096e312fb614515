//! `tracing` layer that forwards log events to the telemetry client.
//!
//! Event fields and the fields of every enclosing span become
//! `customDimensions`; innermost values win. Events below INFO and events on
//! the internal target are ignored.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{span, Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::telemetry::client::{TelemetryClient, INTERNAL_TARGET};
use crate::telemetry::event::{CustomDimensions, Severity, TelemetryEvent};

/// Span/event field that carries the operation (trace) id.
pub const OPERATION_ID_FIELD: &str = "operation_id";

pub struct TelemetryLayer {
    client: TelemetryClient,
}

impl TelemetryLayer {
    pub fn new(client: TelemetryClient) -> Self {
        Self { client }
    }
}

/// Recorded fields of a span, stored in its extensions.
struct SpanFields(CustomDimensions);

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: CustomDimensions,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name(), format!("{:?}", value));
        }
    }
}

impl<S> Layer<S> for TelemetryLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.fields));
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            fields.0.extend(visitor.fields);
        } else {
            extensions.insert(SpanFields(visitor.fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(INTERNAL_TARGET) {
            return;
        }
        let Some(severity) = Severity::from_level(metadata.level()) else {
            return;
        };

        let mut fields = CustomDimensions::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(span_fields) = span.extensions().get::<SpanFields>() {
                    fields.extend(span_fields.0.clone());
                }
            }
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        fields.extend(visitor.fields);

        let operation_id = fields.get(OPERATION_ID_FIELD).map(str::to_string);
        let event = TelemetryEvent::new(
            severity,
            visitor.message.unwrap_or_default(),
            self.client.identity(),
            fields,
        )
        .with_operation_id(operation_id);

        self.client.track(event);
    }
}
