//! In-process record store.
//!
//! Each table is an ordered map keyed by `Id`, and every table sits behind one
//! `tokio::sync::RwLock` so that a multi-record write (a to-do together with
//! its checklist) is observed atomically by readers.

use crate::{todos, users, Id};
use entity::token_blacklist;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) users: BTreeMap<Id, users::Model>,
    // Checklist items are stored inline with the to-do that owns them
    pub(crate) todos: BTreeMap<Id, todos::Model>,
    pub(crate) token_blacklist: HashMap<String, token_blacklist::Model>,
    user_seq: Id,
    todo_seq: Id,
    checklist_item_seq: Id,
}

impl Tables {
    pub(crate) fn next_user_id(&mut self) -> Id {
        self.user_seq += 1;
        self.user_seq
    }

    pub(crate) fn next_todo_id(&mut self) -> Id {
        self.todo_seq += 1;
        self.todo_seq
    }

    pub(crate) fn next_checklist_item_id(&mut self) -> Id {
        self.checklist_item_seq += 1;
        self.checklist_item_seq
    }
}

#[derive(Debug, Default)]
pub struct Database {
    tables: RwLock<Tables>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}
