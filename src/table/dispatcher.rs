//! Event dispatcher for the pub-sub seam between the controller and adapters

use crate::table::events::{EventSummary, GridEvent};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Trait for components that subscribe to grid events
pub trait GridSubscriber {
    /// Handle an event emitted by the controller
    fn on_grid_event(&mut self, event: &GridEvent);

    /// Get subscriber name for debugging
    fn name(&self) -> &str;
}

/// Fans controller events out to subscribers and keeps a bounded history
pub struct EventDispatcher {
    subscribers: Vec<Box<dyn GridSubscriber>>,

    /// Event history for debugging, without row snapshots
    event_history: Vec<EventSummary>,

    /// Maximum event history size
    max_history: usize,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::with_history(100)
    }

    pub fn with_history(max_history: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            event_history: Vec::new(),
            max_history,
        }
    }

    /// Add a subscriber
    pub fn subscribe(&mut self, subscriber: Box<dyn GridSubscriber>) {
        info!("EventDispatcher: Adding subscriber: {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Dispatch an event to every subscriber
    pub fn dispatch(&mut self, event: GridEvent) {
        let summary = EventSummary::from(&event);
        debug!("EventDispatcher: Dispatching event: {}", summary);

        if self.max_history > 0 {
            self.event_history.push(summary);
            if self.event_history.len() > self.max_history {
                self.event_history.remove(0);
            }
        }

        for subscriber in &mut self.subscribers {
            debug!(
                "EventDispatcher: Notifying subscriber: {}",
                subscriber.name()
            );
            subscriber.on_grid_event(&event);
        }
    }

    /// Get event history for debugging
    pub fn get_event_history(&self) -> &[EventSummary] {
        &self.event_history
    }

    pub fn clear_history(&mut self) {
        self.event_history.clear();
    }
}

/// Subscriber collecting every event into a shared list
///
/// Handy for hosts that poll instead of reacting, and for tests.
#[derive(Clone, Default)]
pub struct EventRecorder {
    name: String,
    events: Arc<Mutex<Vec<GridEvent>>>,
}

impl EventRecorder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<GridEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn error_count(&self) -> usize {
        self.events().iter().filter(|event| event.is_error()).count()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl GridSubscriber for EventRecorder {
    fn on_grid_event(&mut self, event: &GridEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
