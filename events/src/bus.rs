//! In-process publish/subscribe dispatcher.
//!
//! Handlers are registered per event name during startup wiring. Publishing
//! never blocks the caller: each handler invocation is handed to a bounded
//! dispatch queue drained by a single dispatcher task, which runs every
//! invocation on its own task once a concurrency permit is available.
//!
//! # Backpressure
//!
//! At most `max_concurrent_handlers` invocations execute at once. While the
//! limit is reached, invocations wait in the dispatch queue. When the queue is
//! full, newly published invocations are dropped and a warning is logged; the
//! publisher is never blocked.

use crate::{DomainEvent, EventHandler};
use dashmap::DashMap;
use futures::FutureExt;
use log::*;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;

const DEFAULT_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_MAX_CONCURRENT_HANDLERS: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct EventBusConfig {
    /// Pending handler invocations buffered before new ones are dropped.
    pub queue_capacity: usize,
    /// Upper bound on handler invocations running at the same time.
    pub max_concurrent_handlers: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_concurrent_handlers: DEFAULT_MAX_CONCURRENT_HANDLERS,
        }
    }
}

/// One handler invocation waiting for a concurrency permit.
struct Dispatch {
    handler: Arc<dyn EventHandler>,
    event: Arc<DomainEvent>,
}

pub struct EventBus {
    handlers: DashMap<String, Vec<Arc<dyn EventHandler>>>,
    queue: mpsc::Sender<Dispatch>,
}

impl EventBus {
    /// Creates the bus and spawns its dispatcher task.
    ///
    /// Must be called from within a Tokio runtime. The dispatcher stops once
    /// the bus is dropped and the queue has drained.
    pub fn new(config: EventBusConfig) -> Self {
        let (queue, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let limiter = Arc::new(Semaphore::new(config.max_concurrent_handlers.max(1)));

        tokio::spawn(dispatch_loop(receiver, limiter));

        Self {
            handlers: DashMap::new(),
            queue,
        }
    }

    /// Register `handler` for events named `event_name`.
    ///
    /// Registering the same handler twice under one name results in two
    /// invocations per publish.
    pub fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>) {
        if event_name.is_empty() {
            warn!(
                "Ignoring subscription of {} to an empty event name",
                handler.name()
            );
            return;
        }

        info!("Subscribing {} to {} event", handler.name(), event_name);
        self.handlers
            .entry(event_name.to_string())
            .or_default()
            .push(handler);
    }

    /// Register one handler under several event names.
    pub fn subscribe_all(&self, event_names: &[&str], handler: Arc<dyn EventHandler>) {
        for event_name in event_names {
            self.subscribe(event_name, Arc::clone(&handler));
        }
    }

    /// Hand `event` to every handler registered under its name.
    ///
    /// Returns immediately. Handler failures are never reported back here.
    pub fn publish(&self, event: DomainEvent) {
        let name = event.name();

        // Clone the handler list so the map shard isn't held while enqueueing
        let handlers = match self.handlers.get(name) {
            Some(entry) => entry.value().clone(),
            None => {
                trace!("No handlers registered for {name} event");
                return;
            }
        };

        debug!("Publishing {name} event to {} handler(s)", handlers.len());

        let event = Arc::new(event);
        for handler in handlers {
            let dispatch = Dispatch {
                handler,
                event: Arc::clone(&event),
            };

            match self.queue.try_send(dispatch) {
                Ok(()) => {}
                Err(TrySendError::Full(dispatch)) => {
                    warn!(
                        "Event bus queue is full, dropping {name} event for {}",
                        dispatch.handler.name()
                    );
                }
                Err(TrySendError::Closed(dispatch)) => {
                    warn!(
                        "Event bus dispatcher has stopped, dropping {name} event for {}",
                        dispatch.handler.name()
                    );
                }
            }
        }
    }

    /// Number of registrations under `event_name`.
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers
            .get(event_name)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

async fn dispatch_loop(mut queue: mpsc::Receiver<Dispatch>, limiter: Arc<Semaphore>) {
    while let Some(dispatch) = queue.recv().await {
        let permit = match Arc::clone(&limiter).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        tokio::spawn(async move {
            let _permit = permit;
            let Dispatch { handler, event } = dispatch;

            let outcome = AssertUnwindSafe(handler.handle(&event))
                .catch_unwind()
                .await;

            if outcome.is_err() {
                error!(
                    "Event handler {} panicked while handling {} event",
                    handler.name(),
                    event.name()
                );
            }
        });
    }

    debug!("Event bus dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Id;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    struct RecordingHandler {
        label: usize,
        seen: UnboundedSender<(usize, DomainEvent)>,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            let _ = self.seen.send((self.label, event.clone()));
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl EventHandler for PanickingHandler {
        async fn handle(&self, _event: &DomainEvent) {
            panic!("handler failure");
        }
    }

    struct CountingHandler {
        count: AtomicUsize,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: &DomainEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn todo_created(todo_id: Id) -> DomainEvent {
        DomainEvent::TodoCreated {
            todo_id,
            user_id: 1,
        }
    }

    fn recorder(
        label: usize,
    ) -> (
        Arc<RecordingHandler>,
        UnboundedReceiver<(usize, DomainEvent)>,
    ) {
        let (seen, receiver) = unbounded_channel();
        (Arc::new(RecordingHandler { label, seen }), receiver)
    }

    #[tokio::test]
    async fn test_new_bus_has_no_handlers() {
        let bus = EventBus::default();
        assert_eq!(bus.handler_count("todo.created"), 0);
    }

    #[tokio::test]
    async fn test_subscribe_appends_handlers_per_event_name() {
        let bus = EventBus::default();
        let handler = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });

        for _ in 0..7 {
            bus.subscribe("todo.created", handler.clone());
        }
        for _ in 0..3 {
            bus.subscribe("todo.deleted", handler.clone());
        }

        assert_eq!(bus.handler_count("todo.created"), 7);
        assert_eq!(bus.handler_count("todo.deleted"), 3);
        assert_eq!(bus.handler_count("todo.updated"), 0);
    }

    #[tokio::test]
    async fn test_subscribe_ignores_empty_event_name() {
        let bus = EventBus::default();
        let (handler, _seen) = recorder(0);

        bus.subscribe("", handler);

        assert_eq!(bus.handler_count(""), 0);
    }

    #[tokio::test]
    async fn test_publish_invokes_every_subscribed_handler_once() {
        let bus = EventBus::default();
        let (seen, mut receiver) = unbounded_channel();
        let handler_count = 5;

        for label in 0..handler_count {
            bus.subscribe(
                "todo.created",
                Arc::new(RecordingHandler {
                    label,
                    seen: seen.clone(),
                }),
            );
        }

        bus.publish(todo_created(7));

        let mut labels = Vec::new();
        for _ in 0..handler_count {
            let (label, event) = timeout(WAIT, receiver.recv())
                .await
                .expect("handler was not invoked in time")
                .expect("channel closed");
            assert_eq!(event, todo_created(7));
            labels.push(label);
        }
        labels.sort_unstable();
        assert_eq!(labels, (0..handler_count).collect::<Vec<_>>());

        // No extra invocations
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_does_not_invoke_handlers_of_other_event_names() {
        let bus = EventBus::default();
        let (created_handler, mut created_seen) = recorder(0);
        let (deleted_handler, mut deleted_seen) = recorder(1);

        bus.subscribe("todo.created", created_handler);
        bus.subscribe("todo.deleted", deleted_handler);

        bus.publish(DomainEvent::TodoDeleted {
            todo_id: 3,
            user_id: 1,
        });

        timeout(WAIT, deleted_seen.recv())
            .await
            .expect("todo.deleted handler was not invoked")
            .expect("channel closed");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(created_seen.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_invoked_per_registration() {
        let bus = EventBus::default();
        let (handler, mut seen) = recorder(0);

        bus.subscribe("todo.created", handler.clone());
        bus.subscribe("todo.created", handler);

        bus.publish(todo_created(1));

        for _ in 0..2 {
            timeout(WAIT, seen.recv())
                .await
                .expect("duplicate registration was not invoked")
                .expect("channel closed");
        }
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish(todo_created(1));
        assert_eq!(bus.handler_count("todo.created"), 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_affect_siblings_or_later_publishes() {
        let bus = EventBus::default();
        let (handler, mut seen) = recorder(0);

        bus.subscribe("todo.created", Arc::new(PanickingHandler));
        bus.subscribe("todo.created", handler);

        bus.publish(todo_created(1));
        bus.publish(todo_created(2));

        let mut todo_ids = Vec::new();
        for _ in 0..2 {
            let (_, event) = timeout(WAIT, seen.recv())
                .await
                .expect("sibling handler was not invoked")
                .expect("channel closed");
            if let DomainEvent::TodoCreated { todo_id, .. } = event {
                todo_ids.push(todo_id);
            }
        }
        todo_ids.sort_unstable();
        assert_eq!(todo_ids, vec![1, 2]);
    }

    struct SlowHandler {
        active: AtomicUsize,
        peak: AtomicUsize,
        done: AtomicUsize,
    }

    #[async_trait]
    impl EventHandler for SlowHandler {
        async fn handle(&self, _event: &DomainEvent) {
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now_active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.done.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_handler_executions_are_capped() {
        let bus = EventBus::new(EventBusConfig {
            queue_capacity: 64,
            max_concurrent_handlers: 2,
        });
        let handler = Arc::new(SlowHandler {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
        });

        for _ in 0..10 {
            bus.subscribe("todo.created", handler.clone());
        }
        bus.publish(todo_created(1));

        timeout(WAIT, async {
            while handler.done.load(Ordering::SeqCst) < 10 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("not every handler completed");

        assert!(handler.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_publish_drops_invocations_when_queue_is_full() {
        let bus = EventBus::new(EventBusConfig {
            queue_capacity: 1,
            max_concurrent_handlers: 1,
        });
        let handler = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });
        bus.subscribe("todo.created", handler.clone());

        // The dispatcher can't run between these calls on a current-thread
        // runtime, so only the first invocation fits in the queue.
        for todo_id in 0..10 {
            bus.publish(todo_created(todo_id));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        let invoked = handler.count.load(Ordering::SeqCst);
        assert!(invoked >= 1);
        assert!(invoked < 10);
    }
}
