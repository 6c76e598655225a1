//! Status record of an orchestration instance.
//!
//! An `OrchestrationStatus` is what a status query returns: identity,
//! timestamps, payloads and lifecycle phase of a single instance. It is built
//! once from the JSON response and never mutated afterwards.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::runtime_status::RuntimeStatus;
use super::timestamp::parse_timestamp;
use crate::error::StatusError;

const CREATED_TIME: &str = "createdTime";
const LAST_UPDATED_TIME: &str = "lastUpdatedTime";

/// Wire shape of a status document, before timestamps and status are checked
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusDocument {
    name: Option<String>,
    instance_id: Option<String>,
    created_time: Option<Value>,
    last_updated_time: Option<Value>,
    input: Option<Value>,
    output: Option<Value>,
    runtime_status: Option<String>,
    custom_status: Option<Value>,
    history: Option<Vec<Value>>,

    /// Any key not named above
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Queryable state of an orchestration instance
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationStatus {
    name: Option<String>,
    instance_id: Option<String>,
    created_time: DateTime<Utc>,
    last_updated_time: DateTime<Utc>,
    input: Option<Value>,
    output: Option<Value>,
    runtime_status: Option<RuntimeStatus>,
    custom_status: Option<Value>,
    history: Option<Vec<Value>>,
    extra: Map<String, Value>,
}

impl OrchestrationStatus {
    /// Start building a status record from raw field values
    pub fn builder() -> OrchestrationStatusBuilder {
        OrchestrationStatusBuilder::default()
    }

    /// Parse a status record from JSON text
    pub fn from_json(text: &str) -> Result<Self, StatusError> {
        let document: StatusDocument = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    /// Build a status record from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, StatusError> {
        let document: StatusDocument = serde_json::from_value(value)?;
        Self::from_document(document)
    }

    fn from_document(document: StatusDocument) -> Result<Self, StatusError> {
        let created_time = required_timestamp(CREATED_TIME, document.created_time)?;
        let last_updated_time = required_timestamp(LAST_UPDATED_TIME, document.last_updated_time)?;

        let runtime_status = document
            .runtime_status
            .as_deref()
            .map(RuntimeStatus::from_str)
            .transpose()?;

        if created_time > last_updated_time {
            debug!(
                instance_id = document.instance_id.as_deref().unwrap_or_default(),
                %created_time,
                %last_updated_time,
                "Status last updated before it was created"
            );
        }

        debug!(
            instance_id = document.instance_id.as_deref().unwrap_or_default(),
            runtime_status = runtime_status.map(|s| s.as_str()).unwrap_or("-"),
            extra_fields = document.extra.len(),
            "Parsed orchestration status"
        );

        Ok(Self {
            name: document.name,
            instance_id: document.instance_id,
            created_time,
            last_updated_time,
            input: document.input,
            output: document.output,
            runtime_status,
            custom_status: document.custom_status,
            history: document.history,
            extra: document.extra,
        })
    }

    /// Orchestrator function name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Unique ID of the instance.
    ///
    /// Fixed when the orchestrator is scheduled. Auto-generated IDs are
    /// UUIDs; user-specified IDs can have any format.
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    /// The instance ID as a UUID, if it is one
    pub fn instance_id_uuid(&self) -> Option<Uuid> {
        self.instance_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
    }

    /// When the instance was created.
    ///
    /// For a `Pending` instance this is the time it was scheduled.
    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }

    /// When the instance last updated its execution history
    pub fn last_updated_time(&self) -> DateTime<Utc> {
        self.last_updated_time
    }

    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn runtime_status(&self) -> Option<RuntimeStatus> {
        self.runtime_status
    }

    /// Check if the instance has reached a final phase
    pub fn is_terminal(&self) -> bool {
        self.runtime_status
            .map(|status| status.is_terminal())
            .unwrap_or(false)
    }

    /// User-defined status payload set by the orchestrator, if any
    pub fn custom_status(&self) -> Option<&Value> {
        self.custom_status.as_ref()
    }

    /// Execution history of the instance.
    ///
    /// The log can be large, so it is only present when the status query
    /// explicitly asked for it.
    pub fn history(&self) -> Option<&[Value]> {
        self.history.as_deref()
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    /// Keys of the document outside the declared fields, verbatim
    pub fn extra_fields(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl FromStr for OrchestrationStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

impl TryFrom<Value> for OrchestrationStatus {
    type Error = StatusError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn required_timestamp(
    field: &'static str,
    raw: Option<Value>,
) -> Result<DateTime<Utc>, StatusError> {
    match raw {
        None => Err(StatusError::MissingTimestamp { field }),
        Some(Value::String(s)) => parse_timestamp(field, &s),
        Some(other) => Err(StatusError::MalformedTimestamp {
            field,
            value: other.to_string(),
        }),
    }
}

/// Builder for an `OrchestrationStatus` from raw field values.
///
/// Timestamps and runtime status are given as the strings the wire carries
/// and are checked by `build()`, exactly like `from_json`.
#[derive(Debug, Clone, Default)]
pub struct OrchestrationStatusBuilder {
    fields: Map<String, Value>,
}

impl OrchestrationStatusBuilder {
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_field("name", Value::String(name.into()))
    }

    pub fn with_instance_id(self, instance_id: impl Into<String>) -> Self {
        self.with_field("instanceId", Value::String(instance_id.into()))
    }

    pub fn with_created_time(self, created_time: impl Into<String>) -> Self {
        self.with_field(CREATED_TIME, Value::String(created_time.into()))
    }

    pub fn with_last_updated_time(self, last_updated_time: impl Into<String>) -> Self {
        self.with_field(LAST_UPDATED_TIME, Value::String(last_updated_time.into()))
    }

    pub fn with_input(self, input: Value) -> Self {
        self.with_field("input", input)
    }

    pub fn with_output(self, output: Value) -> Self {
        self.with_field("output", output)
    }

    pub fn with_runtime_status(self, runtime_status: impl Into<String>) -> Self {
        self.with_field("runtimeStatus", Value::String(runtime_status.into()))
    }

    pub fn with_custom_status(self, custom_status: Value) -> Self {
        self.with_field("customStatus", custom_status)
    }

    pub fn with_history(self, history: Vec<Value>) -> Self {
        self.with_field("history", Value::Array(history))
    }

    /// Attach an additional field.
    ///
    /// A key that matches a declared wire name (e.g. `"instanceId"`) sets
    /// that field instead.
    pub fn with_extra(self, key: impl Into<String>, value: Value) -> Self {
        self.with_field(key, value)
    }

    fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Result<OrchestrationStatus, StatusError> {
        OrchestrationStatus::from_value(Value::Object(self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn running_document() -> Value {
        json!({
            "name": "HelloSequence",
            "instanceId": "9f5f7b8e2f3c4c8a9d0e1f2a3b4c5d6e",
            "createdTime": "2021-01-01T00:00:00Z",
            "lastUpdatedTime": "2021-01-01T00:05:00Z",
            "input": {"cities": ["Tokyo", "Seattle"]},
            "output": null,
            "runtimeStatus": "Running",
            "customStatus": "step-2"
        })
    }

    #[test]
    fn test_from_value_maps_wire_names() {
        let status = OrchestrationStatus::from_value(running_document()).unwrap();

        assert_eq!(status.name(), Some("HelloSequence"));
        assert_eq!(status.instance_id(), Some("9f5f7b8e2f3c4c8a9d0e1f2a3b4c5d6e"));
        assert_eq!(
            status.created_time(),
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            status.last_updated_time(),
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 5, 0).unwrap()
        );
        assert_eq!(status.input(), Some(&json!({"cities": ["Tokyo", "Seattle"]})));
        assert_eq!(status.output(), None);
        assert_eq!(status.runtime_status(), Some(RuntimeStatus::Running));
        assert_eq!(status.custom_status(), Some(&json!("step-2")));
        assert!(!status.has_history());
        assert!(status.extra_fields().is_empty());
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_missing_created_time_is_timestamp_error() {
        let mut doc = running_document();
        doc.as_object_mut().unwrap().remove("createdTime");

        let err = OrchestrationStatus::from_value(doc).unwrap_err();
        assert!(matches!(err, StatusError::MissingTimestamp { field: "createdTime" }));
    }

    #[test]
    fn test_null_last_updated_time_is_missing() {
        let mut doc = running_document();
        doc["lastUpdatedTime"] = Value::Null;

        let err = OrchestrationStatus::from_value(doc).unwrap_err();
        assert!(matches!(err, StatusError::MissingTimestamp { field: "lastUpdatedTime" }));
    }

    #[test]
    fn test_non_string_timestamp_is_malformed() {
        let mut doc = running_document();
        doc["createdTime"] = json!(1609459200);

        let err = OrchestrationStatus::from_value(doc).unwrap_err();
        assert!(err.is_timestamp_error());
        assert!(matches!(
            err,
            StatusError::MalformedTimestamp { field: "createdTime", ref value } if value == "1609459200"
        ));
    }

    #[test]
    fn test_unknown_runtime_status_rejected() {
        let mut doc = running_document();
        doc["runtimeStatus"] = json!("Hibernating");

        let err = OrchestrationStatus::from_value(doc).unwrap_err();
        assert!(matches!(err, StatusError::UnknownRuntimeStatus(ref s) if s == "Hibernating"));
    }

    #[test]
    fn test_non_object_document_rejected() {
        let err = OrchestrationStatus::from_value(json!(["Running"])).unwrap_err();
        assert!(matches!(err, StatusError::MalformedJson(_)));
    }

    #[test]
    fn test_builder_matches_from_json() {
        let built = OrchestrationStatus::builder()
            .with_name("HelloSequence")
            .with_instance_id("9f5f7b8e2f3c4c8a9d0e1f2a3b4c5d6e")
            .with_created_time("2021-01-01T00:00:00Z")
            .with_last_updated_time("2021-01-01T00:05:00Z")
            .with_input(json!({"cities": ["Tokyo", "Seattle"]}))
            .with_output(Value::Null)
            .with_runtime_status(RuntimeStatus::Running.as_str())
            .with_custom_status(json!("step-2"))
            .build()
            .unwrap();

        let parsed = OrchestrationStatus::from_json(&running_document().to_string()).unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_builder_extra_with_declared_name_sets_field() {
        let status = OrchestrationStatus::builder()
            .with_created_time("2021-01-01T00:00:00Z")
            .with_last_updated_time("2021-01-01T00:00:00Z")
            .with_extra("instanceId", json!("abc"))
            .with_extra("region", json!("westus"))
            .build()
            .unwrap();

        assert_eq!(status.instance_id(), Some("abc"));
        assert!(status.extra_field("instanceId").is_none());
        assert_eq!(status.extra_field("region"), Some(&json!("westus")));
    }

    #[test]
    fn test_builder_requires_timestamps() {
        let err = OrchestrationStatus::builder()
            .with_name("HelloSequence")
            .build()
            .unwrap_err();
        assert!(err.is_timestamp_error());
    }

    #[test]
    fn test_instance_id_uuid() {
        let status = OrchestrationStatus::from_value(running_document()).unwrap();
        assert_eq!(
            status.instance_id_uuid(),
            Some(Uuid::parse_str("9f5f7b8e-2f3c-4c8a-9d0e-1f2a3b4c5d6e").unwrap())
        );

        let mut doc = running_document();
        doc["instanceId"] = json!("order-42");
        let status = OrchestrationStatus::from_value(doc).unwrap();
        assert_eq!(status.instance_id_uuid(), None);
    }

    #[test]
    fn test_created_after_updated_is_accepted() {
        let mut doc = running_document();
        doc["createdTime"] = json!("2021-01-02T00:00:00Z");

        let status = OrchestrationStatus::from_value(doc).unwrap();
        assert!(status.created_time() > status.last_updated_time());
    }
}
