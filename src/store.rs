//! Selection Store
//!
//! Ordered set of selected item ids. Selection is view state only; it is
//! never written to the tree or the document.

use indexmap::IndexSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionStore {
    ids: IndexSet<String>,
}

impl SelectionStore {
    /// Add `id`; without `multi` the previous selection is replaced.
    /// Returns ids that were deselected as a result.
    pub fn select(&mut self, id: &str, multi: bool) -> Vec<String> {
        let mut dropped = Vec::new();
        if !multi {
            dropped = self.ids.drain(..).filter(|existing| existing != id).collect();
        }
        self.ids.insert(id.to_string());
        dropped
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        self.ids.shift_remove(id)
    }

    /// Empty the selection, returning what was selected
    pub fn clear(&mut self) -> Vec<String> {
        self.ids.drain(..).collect()
    }

    /// Drop every id `keep` rejects, returning the dropped ids in order
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> Vec<String> {
        let dropped: Vec<String> = self.ids.iter().filter(|id| !keep(id)).cloned().collect();
        for id in &dropped {
            self.ids.shift_remove(id.as_str());
        }
        dropped
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_select_replaces() {
        let mut store = SelectionStore::default();
        store.select("a", false);
        let dropped = store.select("b", false);
        assert_eq!(dropped, vec!["a"]);
        assert_eq!(store.ids(), vec!["b"]);
    }

    #[test]
    fn test_multi_select_keeps_order() {
        let mut store = SelectionStore::default();
        store.select("b", false);
        store.select("a", true);
        store.select("b", true);
        assert_eq!(store.ids(), vec!["b", "a"]);
    }

    #[test]
    fn test_reselect_same_id_alone() {
        let mut store = SelectionStore::default();
        store.select("a", false);
        assert!(store.select("a", false).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retain_and_deselect() {
        let mut store = SelectionStore::default();
        for id in ["a", "b", "c"] {
            store.select(id, true);
        }
        assert_eq!(store.retain(|id| id != "b"), vec!["b"]);
        assert!(store.deselect("a"));
        assert!(!store.deselect("a"));
        assert_eq!(store.ids(), vec!["c"]);
        assert_eq!(store.clear(), vec!["c"]);
        assert!(store.is_empty());
    }
}
