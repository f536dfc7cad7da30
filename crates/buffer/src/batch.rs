//! Live event batch.

use std::collections::VecDeque;

use engine_core::Event;

/// The ordered set of accepted events not yet handed to the sink.
#[derive(Debug, Default)]
pub struct EventBatch {
    events: VecDeque<Event>,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take events and reset the batch.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events).into()
    }

    /// Puts events back ahead of everything currently buffered, keeping
    /// their relative order.
    pub fn restore_front(&mut self, events: Vec<Event>) {
        self.events.reserve(events.len());
        for event in events.into_iter().rev() {
            self.events.push_front(event);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

/// A batch detached from the live buffer and queued for the sink.
#[derive(Debug)]
pub(crate) struct DetachedBatch {
    /// Detach order, for logs.
    pub seq: u64,
    pub events: Vec<Event>,
}
