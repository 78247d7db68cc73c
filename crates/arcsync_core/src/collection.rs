use std::collections::HashMap;

use bytes::Bytes;

use crate::item::{ArchiveItem, Thumbnail};

/// The merged, deduplicated set of archive items for one load session.
///
/// Keys are the server-assigned archive ids. Merging is strictly
/// insert-if-absent: once an id is present, later arrivals for the same id
/// never replace it, so a resolved thumbnail is never clobbered by a re-fetch
/// of the item's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveCollection {
    items: HashMap<String, ArchiveItem>,
}

impl ArchiveCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item` unless its id is already present. Returns whether the
    /// collection changed.
    pub fn insert_if_absent(&mut self, item: ArchiveItem) -> bool {
        if self.items.contains_key(&item.id) {
            return false;
        }
        self.items.insert(item.id.clone(), item);
        true
    }

    /// Marks the item's thumbnail resolved. Returns whether the collection
    /// changed; a missing id or an already resolved thumbnail is left alone.
    pub fn set_thumbnail(&mut self, id: &str, bytes: Bytes) -> bool {
        match self.items.get_mut(id) {
            Some(item) if !item.thumbnail.is_resolved() => {
                item.thumbnail = Thumbnail::Resolved(bytes);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ArchiveItem> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates items in no particular order; presentation reorders as it
    /// sees fit.
    pub fn iter(&self) -> impl Iterator<Item = &ArchiveItem> {
        self.items.values()
    }
}
