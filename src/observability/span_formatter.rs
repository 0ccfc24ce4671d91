//! Span serialization for the trace file.
//!
//! Every finished span becomes one self-contained JSON object:
//!
//! ```json
//! {
//!   "timestamp": "2024-05-01T12:00:00.123456Z",
//!   "service": "shikimore",
//!   "name": "handle_event",
//!   "trace_id": "4bf92f3577b34da6a3ce929d0e0e4736",
//!   "span_id": "00f067aa0ba902b7",
//!   "parent_span_id": null,
//!   "duration_us": 42,
//!   "attributes": {"event_type": "CommitQuery"},
//!   "events": [{"timestamp": "...", "name": "new search dispatched", "attributes": {}}],
//!   "status": "unset"
//! }
//! ```

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use serde_json::{json, Map, Value as JsonValue};

pub struct SpanFormatter {
    service: String,
}

impl SpanFormatter {
    /// Takes the service name from the resource's `service.name`.
    pub fn new(resource: &Resource) -> Self {
        let service = resource
            .iter()
            .find(|(key, _)| key.as_str() == "service.name")
            .map_or_else(|| "unknown".to_string(), |(_, value)| value.as_str().into_owned());
        Self { service }
    }

    pub fn format_span(&self, span: &SpanData) -> JsonValue {
        let parent = (span.parent_span_id != SpanId::INVALID)
            .then(|| format!("{:016x}", span.parent_span_id));
        let duration_us = span
            .end_time
            .duration_since(span.start_time)
            .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));

        let events: Vec<JsonValue> = span
            .events
            .iter()
            .map(|event| {
                json!({
                    "timestamp": rfc3339(event.timestamp),
                    "name": event.name,
                    "attributes": attributes(&event.attributes),
                })
            })
            .collect();

        json!({
            "timestamp": rfc3339(span.start_time),
            "service": self.service,
            "name": span.name,
            "trace_id": format!("{:032x}", span.span_context.trace_id()),
            "span_id": format!("{:016x}", span.span_context.span_id()),
            "parent_span_id": parent,
            "duration_us": duration_us,
            "attributes": attributes(&span.attributes),
            "events": events,
            "status": status(&span.status),
        })
    }
}

fn rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn attributes(attributes: &[KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = attributes
        .iter()
        .map(|kv| (kv.key.to_string(), value(&kv.value)))
        .collect();
    JsonValue::Object(map)
}

fn value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => json!(b),
        Value::I64(i) => json!(i),
        Value::F64(f) => json!(f),
        Value::String(s) => json!(s.as_str()),
        Value::Array(_) => json!(value.to_string()),
    }
}

fn status(status: &Status) -> JsonValue {
    match status {
        Status::Unset => json!("unset"),
        Status::Ok => json!("ok"),
        Status::Error { description } => json!({ "error": description.to_string() }),
    }
}

impl std::fmt::Debug for SpanFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanFormatter")
            .field("service", &self.service)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timestamps_are_utc_rfc3339() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_micros(1_500_000);
        assert_eq!(rfc3339(time), "1970-01-01T00:00:01.500000Z");
    }

    #[test]
    fn attributes_become_an_object() {
        let attrs = vec![
            KeyValue::new("query", "naruto"),
            KeyValue::new("page", 2_i64),
            KeyValue::new("has_more", true),
        ];
        assert_eq!(
            attributes(&attrs),
            json!({ "query": "naruto", "page": 2, "has_more": true })
        );
    }

    #[test]
    fn service_name_comes_from_resource() {
        let resource = Resource::new(vec![KeyValue::new("service.name", "shikimore")]);
        let formatter = SpanFormatter::new(&resource);
        assert_eq!(formatter.service, "shikimore");
    }
}
