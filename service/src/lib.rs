use config::Config;
use entity_api::Database;
use events::{EventBus, EventBusConfig};
use log::info;
use sse::{Manager, SseDomainEventHandler};
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub event_bus: Arc<EventBus>,
    pub sse_manager: Arc<Manager>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        app_config: Config,
        database: &Arc<Database>,
        event_bus: &Arc<EventBus>,
        sse_manager: &Arc<Manager>,
    ) -> Self {
        Self {
            database: Arc::clone(database),
            event_bus: Arc::clone(event_bus),
            sse_manager: Arc::clone(sse_manager),
            config: app_config,
        }
    }

    /// Builds the store, event bus and SSE hub from `app_config` and subscribes
    /// the hub to every event that results in a client notification.
    ///
    /// Must be called from within a Tokio runtime since the bus spawns its
    /// dispatcher.
    pub fn init(app_config: Config) -> Self {
        info!(
            "Event bus config: queue_capacity={}, max_concurrent_handlers={}; \
             SSE queue_capacity={}, heartbeat={}s",
            app_config.event_bus_queue_capacity,
            app_config.event_bus_max_concurrent_handlers,
            app_config.sse_queue_capacity,
            app_config.sse_heartbeat_interval_secs,
        );

        let database = Arc::new(Database::new());
        let event_bus = Arc::new(EventBus::new(EventBusConfig {
            queue_capacity: app_config.event_bus_queue_capacity,
            max_concurrent_handlers: app_config.event_bus_max_concurrent_handlers,
        }));
        let sse_manager = Arc::new(Manager::new(app_config.sse_queue_capacity));

        event_bus.subscribe_all(
            SseDomainEventHandler::EVENT_NAMES,
            Arc::new(SseDomainEventHandler::new(Arc::clone(&sse_manager))),
        );

        Self::new(app_config, &database, &event_bus, &sse_manager)
    }

    pub fn db_ref(&self) -> &Database {
        self.database.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use events::names;

    #[tokio::test]
    async fn init_subscribes_sse_listener_to_notification_events() {
        let app_state = AppState::init(Config::parse_from(["todo_notify_rs"]));

        for name in [
            names::TODO_CREATED,
            names::TODO_UPDATED,
            names::TODO_DELETED,
            names::CHECKLIST_ITEM_ADDED,
            names::CHECKLIST_ITEM_UPDATED,
            names::CHECKLIST_ITEM_DELETED,
            names::USER_LOGGED_OUT,
        ] {
            assert_eq!(app_state.event_bus.handler_count(name), 1, "{name}");
        }
        assert_eq!(app_state.sse_manager.user_count(), 0);
    }
}
