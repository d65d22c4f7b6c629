//! Event sink trait and implementations.

use super::SupervisorEvent;
use async_trait::async_trait;
use tracing::{debug, info, Level};

/// Trait for sinks that consume supervisor events.
///
/// The supervision state machines only ever call [`EventSink::try_emit`],
/// which must never block and never fail.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event: SupervisorEvent);

    /// Emits an event without blocking.
    ///
    /// Implementations must suppress their own errors; dropping an event is
    /// preferable to stalling the supervisor.
    fn try_emit(&self, event: SupervisorEvent);
}

/// A no-op event sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: SupervisorEvent) {
        // Intentionally empty - discards all events
    }

    fn try_emit(&self, _event: SupervisorEvent) {
        // Intentionally empty - discards all events
    }
}

/// An event sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event: &SupervisorEvent) {
        match self.level {
            Level::DEBUG => {
                debug!(
                    event_type = %event.event_type,
                    event_data = ?event.data,
                    "Event: {}", event.event_type
                );
            }
            _ => {
                info!(
                    event_type = %event.event_type,
                    event_data = ?event.data,
                    "Event: {}", event.event_type
                );
            }
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: SupervisorEvent) {
        self.log_event(&event);
    }

    fn try_emit(&self, event: SupervisorEvent) {
        self.log_event(&event);
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<SupervisorEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<SupervisorEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<SupervisorEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type.starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Returns the number of events with exactly this type.
    #[must_use]
    pub fn count_of(&self, event_type: &str) -> usize {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: SupervisorEvent) {
        self.events.write().push(event);
    }

    fn try_emit(&self, event: SupervisorEvent) {
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpEventSink;
        sink.emit(SupervisorEvent::node_started("a")).await;
        sink.try_emit(SupervisorEvent::node_stopped("a", "drained"));
        // Should not panic
    }

    #[tokio::test]
    async fn test_logging_sink() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let sink = LoggingEventSink::default();
        sink.emit(SupervisorEvent::node_started("a")).await;
        sink.try_emit(SupervisorEvent::retry_scheduled(
            "a",
            "i",
            1,
            Duration::from_millis(10),
        ));
        // Should not panic
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(SupervisorEvent::node_started("a")).await;
        sink.try_emit(SupervisorEvent::node_stopped("a", "drained"));

        assert_eq!(sink.len(), 2);
        let events = sink.events();
        assert_eq!(events[0].event_type, "node.started");
        assert_eq!(events[1].event_type, "node.stopped");
    }

    #[tokio::test]
    async fn test_collecting_sink_filter() {
        let sink = CollectingEventSink::new();
        sink.try_emit(SupervisorEvent::node_started("a"));
        sink.try_emit(SupervisorEvent::node_restarted("a", 1, 1));
        sink.try_emit(SupervisorEvent::item_exhausted("a", "i", 4));

        assert_eq!(sink.events_of_type("node.").len(), 2);
        assert_eq!(sink.count_of("item.exhausted"), 1);
        assert_eq!(sink.count_of("node.fatal"), 0);
    }

    #[tokio::test]
    async fn test_collecting_sink_clear() {
        let sink = CollectingEventSink::new();
        sink.try_emit(SupervisorEvent::node_started("a"));
        assert_eq!(sink.len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
