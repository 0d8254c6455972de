pub mod checklist_items;
pub mod jwt;
pub mod todo_type;
pub mod todos;
pub mod token_blacklist;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = u64;
