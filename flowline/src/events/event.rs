//! Supervisor event type for emitting lifecycle and diagnostic events.

use crate::errors::FatalPipelineFault;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// An event emitted by the supervision runtime.
///
/// Events are consumed by event sinks for logging, monitoring, or
/// analytics; emission is fire-and-forget and never blocks the state
/// machines producing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorEvent {
    /// The event type (e.g., "retry.scheduled", "node.fatal").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (RFC 3339).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl SupervisorEvent {
    /// Creates a new event with an empty payload.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: iso_timestamp(),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Creates a "retry.scheduled" event: an item will be re-executed
    /// after the given delay.
    #[must_use]
    pub fn retry_scheduled(node_id: &str, item_id: &str, attempt: u32, delay: Duration) -> Self {
        Self::new("retry.scheduled")
            .add_data("node_id", serde_json::json!(node_id))
            .add_data("item_id", serde_json::json!(item_id))
            .add_data("attempt", serde_json::json!(attempt))
            .add_data("delay_ms", serde_json::json!(delay.as_millis() as u64))
    }

    /// Creates an "item.exhausted" event: an item was routed to the
    /// dead-letter path.
    #[must_use]
    pub fn item_exhausted(node_id: &str, item_id: &str, attempts: u32) -> Self {
        Self::new("item.exhausted")
            .add_data("node_id", serde_json::json!(node_id))
            .add_data("item_id", serde_json::json!(item_id))
            .add_data("attempts", serde_json::json!(attempts))
    }

    /// Creates a "node.restarted" event.
    #[must_use]
    pub fn node_restarted(node_id: &str, total_restarts: u32, sequential_restarts: u32) -> Self {
        Self::new("node.restarted")
            .add_data("node_id", serde_json::json!(node_id))
            .add_data("total_restarts", serde_json::json!(total_restarts))
            .add_data("sequential_restarts", serde_json::json!(sequential_restarts))
    }

    /// Creates a "node.fatal" event from the escalated fault.
    #[must_use]
    pub fn node_fatal(fault: &FatalPipelineFault) -> Self {
        Self::new("node.fatal")
            .add_data("node_id", serde_json::json!(fault.node_id))
            .add_data("reason", serde_json::json!(fault.reason.to_string()))
            .add_data("message", serde_json::json!(fault.message))
    }

    /// Creates a "node.started" event.
    #[must_use]
    pub fn node_started(node_id: &str) -> Self {
        Self::new("node.started").add_data("node_id", serde_json::json!(node_id))
    }

    /// Creates a "node.stopped" event.
    #[must_use]
    pub fn node_stopped(node_id: &str, reason: &str) -> Self {
        Self::new("node.stopped")
            .add_data("node_id", serde_json::json!(node_id))
            .add_data("reason", serde_json::json!(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FatalReason;

    #[test]
    fn test_event_creation() {
        let event = SupervisorEvent::new("test.event");
        assert_eq!(event.event_type, "test.event");
        assert!(event.data.is_empty());
        assert!(event.timestamp.contains('T'));
    }

    #[test]
    fn test_retry_scheduled_payload() {
        let event = SupervisorEvent::retry_scheduled(
            "extract",
            "item-1",
            2,
            Duration::from_millis(400),
        );
        assert_eq!(event.event_type, "retry.scheduled");
        assert_eq!(event.data.get("node_id"), Some(&serde_json::json!("extract")));
        assert_eq!(event.data.get("attempt"), Some(&serde_json::json!(2)));
        assert_eq!(event.data.get("delay_ms"), Some(&serde_json::json!(400)));
    }

    #[test]
    fn test_item_exhausted_payload() {
        let event = SupervisorEvent::item_exhausted("load", "item-9", 4);
        assert_eq!(event.event_type, "item.exhausted");
        assert_eq!(event.data.get("attempts"), Some(&serde_json::json!(4)));
    }

    #[test]
    fn test_node_fatal_payload() {
        let fault = FatalPipelineFault::new(
            "sink",
            FatalReason::RestartLimitExceeded,
            "disk gone",
        );
        let event = SupervisorEvent::node_fatal(&fault);
        assert_eq!(event.event_type, "node.fatal");
        assert_eq!(
            event.data.get("reason"),
            Some(&serde_json::json!("restart limit exceeded"))
        );
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = SupervisorEvent::node_restarted("transform", 3, 1);
        let json = serde_json::to_string(&event).unwrap();
        let back: SupervisorEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.event_type, back.event_type);
        assert_eq!(event.data, back.data);
    }
}
