//! In-memory [`Repository`] implementation for tests and snapshot-backed runs.
//!
//! Committed items live in a `BTreeMap` keyed by path, so the natural
//! search order is path order. Deletes and patches are staged in a pending
//! list and only applied by [`Repository::commit`]. A commit cascades every
//! delete to path descendants and to items whose `social:parentid` chain
//! reaches a deleted item.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{is_descendant_path, FieldMap, Item, Page};

use super::{DeleteStatus, IdentityLookup, Repository, ResourceProvider, SearchRequest};

enum PendingOp {
    Delete(String),
    Patch(String, FieldMap),
}

#[derive(Default)]
struct State {
    committed: BTreeMap<String, Item>,
    pending: Vec<PendingOp>,
    commits: u64,
}

impl State {
    /// A path is live if it is committed and no staged delete covers it.
    fn is_live(&self, path: &str) -> bool {
        self.committed.contains_key(path)
            && !self.pending.iter().any(|op| match op {
                PendingOp::Delete(deleted) => {
                    deleted == path || is_descendant_path(path, deleted)
                }
                PendingOp::Patch(..) => false,
            })
    }

    fn apply_delete(&mut self, path: &str) {
        let mut removed: HashSet<String> = self
            .committed
            .keys()
            .filter(|p| p.as_str() == path || is_descendant_path(p, path))
            .cloned()
            .collect();
        for p in &removed {
            self.committed.remove(p);
        }

        // Follow parent-id links until nothing else is orphaned.
        loop {
            let orphans: Vec<String> = self
                .committed
                .values()
                .filter(|item| item.parent_id().is_some_and(|pid| removed.contains(pid)))
                .map(|item| item.path.clone())
                .collect();
            if orphans.is_empty() {
                break;
            }
            for orphan in orphans {
                let below: Vec<String> = self
                    .committed
                    .keys()
                    .filter(|p| is_descendant_path(p, &orphan))
                    .cloned()
                    .collect();
                for p in below {
                    self.committed.remove(&p);
                    removed.insert(p);
                }
                self.committed.remove(&orphan);
                removed.insert(orphan);
            }
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory repository with staged mutations.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository whose committed state is `items`.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let repo = Self::new();
        for item in items {
            repo.insert(item);
        }
        repo
    }

    /// Insert or replace a committed item directly, bypassing staging.
    pub fn insert(&self, item: Item) {
        lock(&self.state).committed.insert(item.path.clone(), item);
    }

    /// Committed state of the item at `path`.
    pub fn get(&self, path: &str) -> Option<Item> {
        lock(&self.state).committed.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Committed paths in natural order.
    pub fn paths(&self) -> Vec<String> {
        lock(&self.state).committed.keys().cloned().collect()
    }

    /// All committed items in natural order.
    pub fn snapshot(&self) -> Vec<Item> {
        lock(&self.state).committed.values().cloned().collect()
    }

    /// Number of successful commits so far.
    pub fn commits(&self) -> u64 {
        lock(&self.state).commits
    }

    /// Number of staged, uncommitted operations.
    pub fn pending(&self) -> usize {
        lock(&self.state).pending.len()
    }
}

struct MemoryProvider {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl ResourceProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn delete(&self, path: &str) -> Result<DeleteStatus> {
        let mut state = lock(&self.state);
        if !state.is_live(path) {
            return Ok(DeleteStatus::AlreadyGone);
        }
        state.pending.push(PendingOp::Delete(path.to_string()));
        Ok(DeleteStatus::Deleted)
    }

    async fn update_fields(&self, path: &str, patch: &FieldMap) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.is_live(path) {
            anyhow::bail!("no item at {}", path);
        }
        state
            .pending
            .push(PendingOp::Patch(path.to_string(), patch.clone()));
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find(&self, request: &SearchRequest) -> Result<Page> {
        let state = lock(&self.state);
        let matches = state
            .committed
            .values()
            .filter(|item| item.is_descendant_of(&request.path));
        let total = if request.want_total {
            Some(matches.clone().count() as u64)
        } else {
            None
        };
        let items = matches
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect();
        Ok(Page::new(items, total))
    }

    fn provider_for(&self, _item: &Item) -> Result<Arc<dyn ResourceProvider>> {
        Ok(Arc::new(MemoryProvider {
            state: self.state.clone(),
        }))
    }

    async fn commit(&self) -> Result<()> {
        self.apply_staged();
        Ok(())
    }
}

impl InMemoryRepository {
    /// Apply every staged operation as one unit and count a commit.
    /// Returns how many operations were applied.
    pub fn apply_staged(&self) -> usize {
        let mut state = lock(&self.state);
        let ops = std::mem::take(&mut state.pending);
        let applied = ops.len();
        for op in ops {
            match op {
                PendingOp::Delete(path) => state.apply_delete(&path),
                PendingOp::Patch(path, patch) => {
                    if let Some(item) = state.committed.get_mut(&path) {
                        for (key, value) in patch {
                            item.fields.insert(key, value);
                        }
                    }
                }
            }
        }
        state.commits += 1;
        applied
    }
}

/// In-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, String>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: &str, display_name: &str) -> Self {
        self.insert(user_id, display_name);
        self
    }

    pub fn insert(&mut self, user_id: &str, display_name: &str) {
        self.users
            .insert(user_id.to_string(), display_name.to_string());
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl From<HashMap<String, String>> for InMemoryDirectory {
    fn from(users: HashMap<String, String>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityLookup for InMemoryDirectory {
    async fn display_name(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.users.get(user_id).cloned())
    }
}
