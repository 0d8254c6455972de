//! Lifecycle of a single streaming session.
//!
//! A session moves through `Connecting → Active → Closing → Closed`. While
//! active it waits on whichever comes first of: a server-side force-close,
//! the client going away, the heartbeat timer, or the next queued payload.
//! Every exit path unregisters the connection before the session ends.

use crate::connection::{Connection, UserId};
use crate::message::{Event, EventType};
use crate::Manager;
use async_trait::async_trait;
use log::*;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The hub removed the user's connections (e.g. logout).
    ForceClosed,
    /// The client went away.
    ClientDisconnected,
    /// Writing a payload or heartbeat failed.
    TransportFailed,
}

#[derive(Debug)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SSE transport error: {}", self.message)
    }
}

impl StdError for TransportError {}

/// Writes payloads to the wire. Implemented by the web layer; any error is
/// fatal to the session.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, event: &Event) -> Result<(), TransportError>;

    /// Write a keep-alive that carries no payload.
    async fn heartbeat(&mut self) -> Result<(), TransportError>;
}

pub struct Session {
    manager: Arc<Manager>,
    user_id: UserId,
    heartbeat_interval: Duration,
    state: ConnectionState,
}

impl Session {
    /// `heartbeat_interval` is raised to one millisecond if smaller, since a
    /// zero period cannot drive a timer.
    pub fn new(manager: Arc<Manager>, user_id: UserId, heartbeat_interval: Duration) -> Self {
        Self {
            manager,
            user_id,
            heartbeat_interval: heartbeat_interval.max(MIN_HEARTBEAT_INTERVAL),
            state: ConnectionState::Connecting,
        }
    }

    /// Drive the session until it closes. `client_gone` is cancelled by the
    /// transport when the client disconnects.
    pub async fn run<T: Transport>(
        mut self,
        mut transport: T,
        client_gone: CancellationToken,
    ) -> CloseReason {
        let mut connection = self.manager.register_connection(self.user_id);

        let reason = match transport.send(&Event::Connected).await {
            Ok(()) => {
                self.transition(ConnectionState::Active);
                self.drain(&mut connection, &mut transport, &client_gone)
                    .await
            }
            Err(e) => {
                warn!("Failed to open SSE session for user {}: {e}", self.user_id);
                CloseReason::TransportFailed
            }
        };

        self.transition(ConnectionState::Closing);
        self.manager.unregister_connection(&connection);
        self.transition(ConnectionState::Closed);

        info!(
            "SSE session {} for user {} closed: {reason:?}",
            connection.id(),
            self.user_id
        );
        reason
    }

    async fn drain<T: Transport>(
        &self,
        connection: &mut Connection,
        transport: &mut T,
        client_gone: &CancellationToken,
    ) -> CloseReason {
        let mut heartbeat = interval_at(
            Instant::now() + self.heartbeat_interval,
            self.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = connection.force_close.cancelled() => {
                    return CloseReason::ForceClosed;
                }
                _ = client_gone.cancelled() => {
                    return CloseReason::ClientDisconnected;
                }
                _ = heartbeat.tick() => {
                    match interruptible(&connection.force_close, client_gone, transport.heartbeat()).await {
                        Ok(Ok(())) => trace!("SSE heartbeat sent to connection {}", connection.id()),
                        Ok(Err(e)) => {
                            warn!("SSE heartbeat failed for user {}: {e}", self.user_id);
                            return CloseReason::TransportFailed;
                        }
                        Err(reason) => return reason,
                    }
                }
                event = connection.receiver.recv() => match event {
                    Some(event) => {
                        match interruptible(&connection.force_close, client_gone, transport.send(&event)).await {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => {
                                warn!(
                                    "Failed to write {} event for user {}: {e}",
                                    event.event_type(),
                                    self.user_id
                                );
                                return CloseReason::TransportFailed;
                            }
                            Err(reason) => return reason,
                        }
                    }
                    // The registry no longer holds our handle
                    None => return CloseReason::ForceClosed,
                },
            }
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        debug!(
            "SSE session for user {}: {:?} -> {next:?}",
            self.user_id, self.state
        );
        self.state = next;
    }
}

/// Runs a transport write, abandoning it if the session is closed while the
/// write is still pending.
async fn interruptible<F>(
    force_close: &CancellationToken,
    client_gone: &CancellationToken,
    write: F,
) -> Result<Result<(), TransportError>, CloseReason>
where
    F: std::future::Future<Output = Result<(), TransportError>>,
{
    tokio::select! {
        biased;

        _ = force_close.cancelled() => Err(CloseReason::ForceClosed),
        _ = client_gone.cancelled() => Err(CloseReason::ClientDisconnected),
        result = write => Ok(result),
    }
}
