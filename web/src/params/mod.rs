//! This module holds typed parameters for various endpoint inputs.
//!
//! Request bodies are deserialized into the structs here and then converted into
//! the plain input types the `domain` crate operates on, so that `domain` never
//! needs to know about serde field names or OpenAPI schemas.

pub(crate) mod checklist;
pub(crate) mod todo;
pub(crate) mod user;
