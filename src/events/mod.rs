//!
//! Notification sinks.
//!
//! Components write exactly one [`Event`] to their sink after each committed
//! operation. Delivery is synchronous; there is no buffering beyond what the
//! sink itself keeps.

pub use crate::primitives::Event;

/// Receiver of committed-operation notifications.
pub trait EventSink: std::fmt::Debug {
    fn emit(&mut self, event: Event);
}

/// Append-only in-memory event log, the default sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventLog(Vec<Event>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.0
    }

    pub fn last(&self) -> Option<&Event> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hands the accumulated events to the caller, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.0)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: Event) {
        tracing::trace!(?event, "event emitted");
        self.0.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: Event) {
        (**self).emit(event)
    }
}
