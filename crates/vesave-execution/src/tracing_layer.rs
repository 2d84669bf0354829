//! Tracing layer that streams workflow events to a front end.
//!
//! Events emitted under the `vesave::workflow` target are converted to
//! [`WorkflowEvent`]s and pushed into an unbounded channel, so a UI can
//! render stage transitions as they happen.

use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use vesave_application::WORKFLOW_TARGET;
use vesave_core::workflow::{Stage, StepStatus};

/// Event data sent to the front end.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEvent {
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    pub message: String,
    pub run_id: Option<u64>,
    pub stage: Option<Stage>,
    pub status: Option<StepStatus>,
    pub error: Option<String>,
    /// Remaining structured fields
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

/// A tracing layer that sends workflow events to a channel.
pub struct WorkflowEventLayer {
    sender: mpsc::UnboundedSender<WorkflowEvent>,
}

impl WorkflowEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<WorkflowEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for WorkflowEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with(WORKFLOW_TARGET) {
            return;
        }

        let mut fields = HashMap::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let message = take_string(&mut fields, "message").unwrap_or_default();
        let run_id = fields.remove("run_id").and_then(|v| v.as_u64());
        let stage = take_string(&mut fields, "stage").and_then(|s| Stage::from_str(&s).ok());
        let status =
            take_string(&mut fields, "status").and_then(|s| StepStatus::from_str(&s).ok());
        let error = take_string(&mut fields, "error");

        let workflow_event = WorkflowEvent {
            level: event.metadata().level().to_string(),
            message,
            run_id,
            stage,
            status,
            error,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone means nobody is watching; drop the event.
        let _ = self.sender.send(workflow_event);
    }
}

fn take_string(fields: &mut HashMap<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}
