//! Fan-out of validation events to in-process observers.

use agij_validation::ValidationEvent;

/// Synchronous fan-out event bus.
///
/// Listeners run inline on the service task, so a slow listener stalls every
/// queued command.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&ValidationEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ValidationEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &ValidationEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agij_types::JobId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn reset_event() -> ValidationEvent {
        ValidationEvent::NonceReset {
            job: JobId::new(1),
            nonce: 1,
        }
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&reset_event());
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn listener_filters_by_variant() {
        let finalized = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        let seen = Arc::clone(&finalized);
        bus.subscribe(Box::new(move |event| {
            if matches!(event, ValidationEvent::ValidationFinalized { .. }) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        }));

        bus.emit(&reset_event());
        bus.emit(&ValidationEvent::ValidationFinalized {
            job: JobId::new(1),
            nonce: 0,
            success: false,
            approvals: 0,
            rejections: 0,
            forced: true,
        });
        assert_eq!(finalized.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emit_without_listeners_is_noop() {
        let bus = EventBus::default();
        assert_eq!(bus.listener_count(), 0);
        bus.emit(&reset_event());
    }
}
