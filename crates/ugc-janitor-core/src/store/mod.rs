//! Repository abstraction for UGC Janitor.
//!
//! The batch jobs never talk to a concrete backend. They go through three
//! collaborator traits:
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Repository`] | Descendant-of-path search, provider lookup, batch commit |
//! | [`ResourceProvider`] | Staged delete and field patch for the items it owns |
//! | [`IdentityLookup`] | User id → display name |
//!
//! A `Repository` value stands for one authenticated session: searches only
//! return items the acting principal may read, and `commit` flushes the
//! mutations staged through that session's providers.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FieldMap, Item, Page};

/// A paginated descendant-of-path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Only strict descendants of this path match.
    pub path: String,
    pub offset: usize,
    pub limit: usize,
    /// Ask the backend to report the total match count.
    pub want_total: bool,
}

impl SearchRequest {
    pub fn descendants_of(path: impl Into<String>, offset: usize, limit: usize) -> Self {
        Self {
            path: path.into(),
            offset,
            limit,
            want_total: true,
        }
    }
}

/// Result of a delete-by-path request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    /// Nothing was there to delete. Not an error at this layer.
    AlreadyGone,
}

/// Owner of a subtree of items; performs mutations on them.
///
/// Mutations are staged and only become durable when the owning
/// [`Repository`] is committed.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Stage deletion of the item at `path` and everything beneath it.
    async fn delete(&self, path: &str) -> Result<DeleteStatus>;

    /// Stage a merge of `patch` into the fields of the item at `path`.
    async fn update_fields(&self, path: &str, patch: &FieldMap) -> Result<()>;
}

/// Search + commit surface of a backing store session.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find`](Repository::find) | Paginated search for descendants of a path |
/// | [`provider_for`](Repository::provider_for) | Resolve the provider that owns an item |
/// | [`commit`](Repository::commit) | Flush staged mutations as one unit |
///
/// Errors from `find` and `commit` are treated as fatal by the batch loop;
/// implementations should not retry internally.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find(&self, request: &SearchRequest) -> Result<Page>;

    fn provider_for(&self, item: &Item) -> Result<Arc<dyn ResourceProvider>>;

    async fn commit(&self) -> Result<()>;
}

/// Resolves a user id to the user's display name.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// `Ok(None)` when the user is unknown.
    async fn display_name(&self, user_id: &str) -> Result<Option<String>>;
}
