use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::info;

pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    ClientsImported,
    ScanCompleted,
    AllPagesSelected,
    SelectAllRejected,
    SelectionCleared,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub at: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl AuditEvent {
    pub fn new(kind: AuditEventKind, details: serde_json::Value) -> Self {
        Self {
            kind,
            at: Utc::now(),
            details,
        }
    }
}

/// Destination for audit events. Sinks are handed to the components that
/// emit events; there is no process-wide instance.
pub trait EventSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Bounded in-memory log. Oldest events are dropped once `capacity` is hit.
pub struct MemoryEventLog {
    capacity: usize,
    events: Mutex<VecDeque<AuditEvent>>,
}

impl MemoryEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        match self.events.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn count(&self, kind: AuditEventKind) -> usize {
        self.events().iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventSink for MemoryEventLog {
    fn record(&self, event: AuditEvent) {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.len() == self.capacity {
            guard.pop_front();
        }
        guard.push_back(event);
    }
}

/// Forwards events to the tracing subscriber.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: AuditEvent) {
        info!(kind = ?event.kind, details = %event.details, "audit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_log_is_isolated_per_instance() {
        let a = MemoryEventLog::default();
        let b = MemoryEventLog::default();
        a.record(AuditEvent::new(AuditEventKind::ScanCompleted, json!({})));
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn test_memory_log_drops_oldest_past_capacity() {
        let log = MemoryEventLog::new(2);
        log.record(AuditEvent::new(AuditEventKind::ClientsImported, json!({"n": 1})));
        log.record(AuditEvent::new(AuditEventKind::ScanCompleted, json!({"n": 2})));
        log.record(AuditEvent::new(AuditEventKind::SelectionCleared, json!({"n": 3})));

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, AuditEventKind::ScanCompleted);
        assert_eq!(log.count(AuditEventKind::ClientsImported), 0);
    }
}
