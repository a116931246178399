//! Core data models shared by both batch jobs.
//!
//! An [`Item`] is one addressable record in the UGC repository; a [`Page`]
//! is one slice of a descendant-of-path search.

use serde::{Deserialize, Serialize};

/// Mutable field map of a repository item.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Field naming the identity of an item's parent (not necessarily its path parent).
pub const PN_PARENT_ID: &str = "social:parentid";
/// Field referencing the comment system an item belongs to.
pub const PN_ROOT_COMMENT_SYSTEM: &str = "social:rootCommentSystem";
/// Field carrying the component type of an item.
pub const PN_BASE_TYPE: &str = "social:baseType";
/// Canonical user identifier field.
pub const PN_USER_IDENTIFIER: &str = "userIdentifier";
/// Legacy user identifier field.
pub const PN_AUTHORIZABLE_ID: &str = "authorizableId";
/// Denormalized author display name.
pub const PN_AUTHOR_DISPLAY_NAME: &str = "author_display_name";

/// `social:baseType` value marking forum/comment records.
pub const COMMENT_BASE_TYPE: &str = "social/commons/components/comments/comment";

/// A record in the repository.
///
/// `path` is unique within the repository. Once an item has been deleted
/// its snapshot must not be used to address the repository again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub path: String,
    #[serde(default)]
    pub fields: FieldMap,
}

impl Item {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: FieldMap::new(),
        }
    }

    /// Builder-style field setter, mostly for fixtures.
    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns a field as a string slice, or `None` if absent or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.str_field(PN_PARENT_ID)
    }

    pub fn base_type(&self) -> Option<&str> {
        self.str_field(PN_BASE_TYPE)
    }

    /// True if `self.path` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &str) -> bool {
        is_descendant_path(&self.path, ancestor)
    }
}

/// True if `path` lies strictly below `ancestor` in the path hierarchy.
pub fn is_descendant_path(path: &str, ancestor: &str) -> bool {
    let ancestor = ancestor.trim_end_matches('/');
    path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// One page of search results.
///
/// `total` is the match count reported by the backing store at fetch time,
/// if it was requested. It may exceed the page size and may be stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    pub total: Option<u64>,
}

impl Page {
    pub fn new(items: Vec<Item>, total: Option<u64>) -> Self {
        Self { items, total }
    }

    pub fn total_or_zero(&self) -> u64 {
        self.total.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendant_paths() {
        assert!(is_descendant_path("/a/b", "/a"));
        assert!(is_descendant_path("/a/b/c", "/a/"));
        assert!(!is_descendant_path("/a", "/a"));
        assert!(!is_descendant_path("/ab", "/a"));
        assert!(!is_descendant_path("/b/a", "/a"));
    }

    #[test]
    fn test_str_field_ignores_non_strings() {
        let item = Item::new("/x")
            .with_field(PN_PARENT_ID, "/p")
            .with_field("count", 3);
        assert_eq!(item.parent_id(), Some("/p"));
        assert_eq!(item.str_field("count"), None);
        assert!(item.has_field("count"));
    }

    #[test]
    fn test_item_deserializes_without_fields() {
        let item: Item = serde_json::from_str(r#"{"path":"/a"}"#).unwrap();
        assert_eq!(item.path, "/a");
        assert!(item.fields.is_empty());
    }
}
