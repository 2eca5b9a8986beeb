//! Last-fetched moderation lists, keyed by (resource, filter, page).
//!
//! Entries live until a successful action on the same resource type
//! invalidates them. Optimistic updates snapshot what they touch so a failed
//! request can put it back.

use std::collections::HashMap;
use std::sync::Mutex;

use mosques_core::workflow::Moderated;
use mosques_core::{ModerationItem, ModerationStatus, ResourceType, StatusFilter};

/// `limit`/`offset` pagination. `limit` is clamped to `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    limit: u32,
    offset: u32,
}

impl Page {
    pub const MAX_LIMIT: u32 = 100;
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn next(&self) -> Self {
        Self::new(self.limit, self.offset.saturating_add(self.limit))
    }

    pub fn query(&self) -> [(&'static str, String); 2] {
        [("limit", self.limit.to_string()), ("offset", self.offset.to_string())]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub resource: ResourceType,
    pub status: StatusFilter,
    pub page: Page,
}

/// Lists as they were before an optimistic update.
#[derive(Debug, Default)]
pub struct Snapshot {
    lists: Vec<(ListKey, Vec<ModerationItem>)>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[derive(Default)]
pub struct ListCache {
    lists: Mutex<HashMap<ListKey, Vec<ModerationItem>>>,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ListKey) -> Option<Vec<ModerationItem>> {
        self.lock().get(key).cloned()
    }

    pub fn store(&self, key: ListKey, items: Vec<ModerationItem>) {
        self.lock().insert(key, items);
    }

    /// Drop every list of this resource type. Returns how many were dropped.
    pub fn invalidate(&self, resource: ResourceType) -> usize {
        let mut lists = self.lock();
        let before = lists.len();
        lists.retain(|key, _| key.resource != resource);
        before - lists.len()
    }

    /// Last known copy of an entity, from any cached list.
    pub fn find(&self, resource: ResourceType, id: i64) -> Option<ModerationItem> {
        self.lock()
            .iter()
            .filter(|(key, _)| key.resource == resource)
            .flat_map(|(_, items)| items.iter())
            .find(|item| item.raw_id() == id)
            .cloned()
    }

    /// Move an entity to `to` in every cached list: lists whose filter no
    /// longer matches lose the row, the others see the new status.
    pub fn apply_status(&self, resource: ResourceType, id: i64, to: ModerationStatus) -> Snapshot {
        let mut lists = self.lock();
        let mut snapshot = Snapshot::default();

        for (key, items) in lists.iter_mut() {
            if key.resource != resource || !items.iter().any(|item| item.raw_id() == id) {
                continue;
            }
            snapshot.lists.push((*key, items.clone()));

            if key.status.matches(to) {
                for item in items.iter_mut().filter(|item| item.raw_id() == id) {
                    item.set_status(to);
                }
            } else {
                items.retain(|item| item.raw_id() != id);
            }
        }
        snapshot
    }

    /// Undo [`apply_status`](Self::apply_status). Lists invalidated in the
    /// meantime stay invalidated.
    pub fn rollback(&self, snapshot: Snapshot) {
        let mut lists = self.lock();
        for (key, items) in snapshot.lists {
            if let Some(current) = lists.get_mut(&key) {
                *current = items;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ListKey, Vec<ModerationItem>>> {
        self.lists.lock().unwrap_or_else(|e| e.into_inner())
    }
}
