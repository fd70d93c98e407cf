//! Tree Traversal
//!
//! Breadth-first iteration in sibling order, plus ancestor/descendant walks.

use std::collections::VecDeque;

use super::macro_tree::{ChildrenMap, MacroTree};
use crate::domain::{Item, TreeError, TreeResult};

/// Breadth-first iterator over a tree or subtree
pub struct Bfs<'a> {
    children: ChildrenMap<'a>,
    queue: VecDeque<&'a Item>,
}

impl<'a> Iterator for Bfs<'a> {
    type Item = &'a crate::domain::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.queue.pop_front()?;
        if let Some(kids) = self.children.get(&Some(item.id())) {
            self.queue.extend(kids.iter().copied());
        }
        Some(item)
    }
}

impl MacroTree {
    /// BFS from `start` (inclusive), or over every root when `start` is None
    pub fn bfs(&self, start: Option<&str>) -> TreeResult<Bfs<'_>> {
        let children = self.children_map();
        let queue: VecDeque<&Item> = match start {
            Some(id) => {
                let item = self
                    .items
                    .get(id)
                    .ok_or_else(|| TreeError::UnknownId { id: id.to_string() })?;
                VecDeque::from([item])
            }
            None => children.get(&None).cloned().unwrap_or_default().into(),
        };
        Ok(Bfs { children, queue })
    }

    /// Call `visitor` for each item in BFS order
    pub fn traverse<F>(&self, mut visitor: F, start: Option<&str>) -> TreeResult<()>
    where
        F: FnMut(&Item),
    {
        for item in self.bfs(start)? {
            visitor(item);
        }
        Ok(())
    }

    /// Items in BFS order for which `predicate` holds
    pub fn traverse_filtered<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a Item> + 'a
    where
        P: FnMut(&Item) -> bool + 'a,
    {
        self.bfs(None)
            .into_iter()
            .flatten()
            .filter(move |item| predicate(*item))
    }

    /// Every item below `id`, excluding `id` itself, in BFS order
    pub fn descendants(&self, id: &str) -> TreeResult<Vec<&Item>> {
        Ok(self.bfs(Some(id))?.skip(1).collect())
    }

    /// Parent chain of `id`, nearest first
    pub fn ancestors(&self, id: &str) -> TreeResult<Vec<&Item>> {
        let item = self
            .items
            .get(id)
            .ok_or_else(|| TreeError::UnknownId { id: id.to_string() })?;
        let mut chain = Vec::new();
        let mut cursor = item.parent_id();
        while let Some(parent_id) = cursor {
            let Some(parent) = self.items.get(parent_id) else {
                break;
            };
            if chain.len() > self.items.len() {
                break;
            }
            chain.push(parent);
            cursor = parent.parent_id();
        }
        Ok(chain)
    }

    /// True if `node` lies strictly below `ancestor`
    pub fn is_descendant(&self, ancestor: &str, node: &str) -> bool {
        let mut steps = 0;
        let mut cursor = self.items.get(node).and_then(Item::parent_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.items.len() {
                return false;
            }
            cursor = self.items.get(current).and_then(Item::parent_id);
        }
        false
    }

    /// Depth of `id`; roots are at depth 0
    pub fn depth(&self, id: &str) -> TreeResult<usize> {
        Ok(self.ancestors(id)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::keys;
    use pretty_assertions::assert_eq;

    fn group(id: &str) -> Item {
        Item::new(id).with(keys::NODE_TYPE, "group")
    }

    fn instruction(id: &str) -> Item {
        Item::new(id).with(keys::NODE_TYPE, "instruction")
    }

    /// a
    /// ├── b
    /// │   └── d
    /// └── c
    /// e
    fn sample() -> MacroTree {
        let mut tree = MacroTree::new("t");
        tree.add_item(group("a"), None).unwrap();
        tree.add_item(group("b"), Some("a")).unwrap();
        tree.add_item(instruction("c"), Some("a")).unwrap();
        tree.add_item(instruction("d"), Some("b")).unwrap();
        tree.add_item(instruction("e"), None).unwrap();
        tree
    }

    fn ids<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<&'a str> {
        items.into_iter().map(Item::id).collect()
    }

    #[test]
    fn test_bfs_whole_forest() {
        let tree = sample();
        assert_eq!(ids(tree.bfs(None).unwrap()), vec!["a", "e", "b", "c", "d"]);
    }

    #[test]
    fn test_bfs_subtree() {
        let tree = sample();
        assert_eq!(ids(tree.bfs(Some("b")).unwrap()), vec!["b", "d"]);
        assert!(tree.bfs(Some("ghost")).is_err());
    }

    #[test]
    fn test_traverse_visits_each_once() {
        let tree = sample();
        let mut seen = Vec::new();
        tree.traverse(|item| seen.push(item.id().to_string()), Some("a"))
            .unwrap();
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_traverse_filtered() {
        let tree = sample();
        let leaves = ids(tree.traverse_filtered(|item| item.is_instruction()));
        assert_eq!(leaves, vec!["e", "c", "d"]);
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let tree = sample();
        assert_eq!(ids(tree.descendants("a").unwrap()), vec!["b", "c", "d"]);
        assert!(tree.descendants("d").unwrap().is_empty());
        assert_eq!(ids(tree.ancestors("d").unwrap()), vec!["b", "a"]);
        assert_eq!(tree.depth("d").unwrap(), 2);
        assert_eq!(tree.depth("e").unwrap(), 0);
    }

    #[test]
    fn test_is_descendant() {
        let tree = sample();
        assert!(tree.is_descendant("a", "d"));
        assert!(!tree.is_descendant("d", "a"));
        assert!(!tree.is_descendant("a", "a"));
        assert!(!tree.is_descendant("b", "c"));
    }
}
