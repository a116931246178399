//! Same-page redundancy filter for the cleanup job.
//!
//! Deleting a parent removes its descendants in the backing store, so a
//! child whose parent is in the same page does not need its own delete.
//! Only the current page is consulted; redundant deletes across page
//! boundaries still happen and surface as `AlreadyGone`.

use std::collections::HashSet;

use crate::models::Item;

/// Drops every item whose `social:parentid` equals the path of another item
/// in `items`. Order of the surviving items is preserved.
pub fn remove_redundant(items: Vec<Item>) -> Vec<Item> {
    let paths: HashSet<String> = items.iter().map(|i| i.path.clone()).collect();
    items
        .into_iter()
        .filter(|item| match item.parent_id() {
            Some(parent) => parent == item.path || !paths.contains(parent),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PN_PARENT_ID;

    fn paths(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn test_child_of_parent_in_page_is_dropped() {
        let page = vec![
            Item::new("/a"),
            Item::new("/a/b").with_field(PN_PARENT_ID, "/a"),
            Item::new("/c"),
        ];
        assert_eq!(paths(&remove_redundant(page)), vec!["/a", "/c"]);
    }

    #[test]
    fn test_parent_outside_page_keeps_child() {
        let page = vec![
            Item::new("/x/reply").with_field(PN_PARENT_ID, "/x"),
            Item::new("/y"),
        ];
        assert_eq!(paths(&remove_redundant(page)), vec!["/x/reply", "/y"]);
    }

    #[test]
    fn test_parent_id_is_not_path_hierarchy() {
        // The reply lives elsewhere in the tree but names /topic as its parent.
        let page = vec![
            Item::new("/replies/r1").with_field(PN_PARENT_ID, "/topic"),
            Item::new("/topic"),
            Item::new("/topic/unlinked"),
        ];
        assert_eq!(
            paths(&remove_redundant(page)),
            vec!["/topic", "/topic/unlinked"]
        );
    }

    #[test]
    fn test_chain_drops_every_linked_child() {
        let page = vec![
            Item::new("/a"),
            Item::new("/b").with_field(PN_PARENT_ID, "/a"),
            Item::new("/c").with_field(PN_PARENT_ID, "/b"),
        ];
        assert_eq!(paths(&remove_redundant(page)), vec!["/a"]);
    }

    #[test]
    fn test_empty_page() {
        assert!(remove_redundant(Vec::new()).is_empty());
    }
}
