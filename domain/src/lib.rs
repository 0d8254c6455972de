//! Business operations for users, to-dos and checklists.
//!
//! Every operation that changes state publishes a `DomainEvent` on the event bus
//! once the write has completed, so subscribers never observe an event for a
//! write that failed.
//!
//! This crate also re-exports the items from `entity_api` that callers need, so
//! that consumers of the `domain` crate do not need to depend on `entity_api` directly.
pub use entity_api::query::{
    FilterType, Paginated, PaginationMeta, PaginationOptions, SortOrder,
};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{checklist_items, todo_type, todos, users, Database, Id};

pub mod checklist;
pub mod error;
pub mod jwt;
pub mod todo;
pub mod user;
