//! Server-Sent Events (SSE) infrastructure for real-time updates.
//!
//! This crate provides the live notification registry that pushes to-do and
//! checklist changes from the backend to a user's open clients.
//!
//! # Architecture
//!
//! - **Many connections per user**: every open tab or device holds its own
//!   connection; a push fans out to all of them.
//! - **Single-lock registry**: one reader/writer lock guards the
//!   user → connections map. Pushes share the read lock; registration and
//!   removal take the write lock.
//! - **Best-effort delivery**: each connection has a bounded queue. A full
//!   queue, a closing connection, or an offline user all mean the
//!   notification is dropped. Clients reconcile on their next full fetch.
//! - **Server-side termination**: `remove_clients` force-closes every
//!   session of a user (e.g. on logout), even while the session is parked
//!   waiting for work.
//!
//! # Message Flow
//!
//! 1. Client opens `/sse` with a bearer token
//! 2. The web layer authenticates the user and runs a [`session::Session`]
//! 3. The session registers a connection, writes the `connected` payload,
//!    then drains queued payloads and writes heartbeats
//! 4. A domain operation publishes a `DomainEvent` on the event bus
//! 5. [`SseDomainEventHandler`] turns it into a payload and calls
//!    [`Manager::send`]
//! 6. The session writes the payload to the client
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry plus both ends of a connection
//! - `manager`: High-level entry point (delegates to ConnectionRegistry)
//! - `message`: Notification payload types
//! - `session`: Connection lifecycle and heartbeat protocol
//! - `domain_event_handler`: Bridges the event bus to the registry

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;
pub mod session;

pub use domain_event_handler::SseDomainEventHandler;
pub use manager::Manager;
