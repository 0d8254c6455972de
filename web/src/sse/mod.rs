//! SSE HTTP handler for the web layer.
//!
//! The hub, sessions and payload types live in the `sse` crate; this module
//! only adapts a session to an axum response stream.

pub(crate) mod handler;
