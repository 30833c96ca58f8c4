//! Reconstructed input trees.
//!
//! An [`InputTree`] maps keys to [`InputNode`]s. Scalars become
//! [`InputNode::Item`], uploads [`InputNode::File`], numerically indexed upload
//! fields [`InputNode::Files`], and everything bracket-nested a sub-tree.

use crate::raw::parse_index;
use crate::{InputFile, InputItem};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputNode {
    Item(InputItem),
    File(InputFile),
    Files(Vec<InputFile>),
    Tree(InputTree),
}

impl InputNode {
    pub fn as_item(&self) -> Option<&InputItem> {
        match self {
            InputNode::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&InputFile> {
        match self {
            InputNode::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[InputFile]> {
        match self {
            InputNode::Files(files) => Some(files),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&InputTree> {
        match self {
            InputNode::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// True for scalars and single files.
    pub fn is_leaf(&self) -> bool {
        matches!(self, InputNode::Item(_) | InputNode::File(_))
    }

    /// Descends one level into a sub-tree.
    pub fn get(&self, key: &str) -> Option<&InputNode> {
        self.as_tree()?.get(key)
    }
}

impl From<InputItem> for InputNode {
    fn from(item: InputItem) -> Self {
        InputNode::Item(item)
    }
}

impl From<InputFile> for InputNode {
    fn from(file: InputFile) -> Self {
        InputNode::File(file)
    }
}

impl From<InputTree> for InputNode {
    fn from(tree: InputTree) -> Self {
        InputNode::Tree(tree)
    }
}

/// A mapping level of an input tree.
///
/// Keys are unique. Iteration follows build order, equality ignores it.
#[derive(Debug, Clone, Default, Eq)]
pub struct InputTree {
    entries: IndexMap<String, InputNode>,
    next_index: u64,
}

impl InputTree {
    pub fn new() -> Self {
        Self { entries: IndexMap::new(), next_index: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&InputNode> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &InputNode)> + ExactSizeIterator {
        self.entries.iter().map(|(k, node)| (k.as_str(), node))
    }

    /// Inserts a node, replacing an existing one under the same key.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<InputNode>) -> Option<InputNode> {
        let key = key.into();
        self.track_index(&key);
        self.entries.insert(key, node.into())
    }

    /// Merges a node with recursive-append semantics.
    ///
    /// Two files under one key become a list, lists absorb files, sub-trees are
    /// merged key by key. A sub-tree always wins over files: the files are kept
    /// inside it under the next free integer keys.
    pub fn merge(&mut self, key: impl Into<String>, node: impl Into<InputNode>) {
        let key = key.into();
        let node = node.into();
        match self.entries.get_mut(&key) {
            Some(slot) => {
                let existing = std::mem::replace(slot, InputNode::Files(Vec::new()));
                *slot = merge_nodes(existing, node);
            }
            None => {
                self.insert(key, node);
            }
        }
    }

    fn track_index(&mut self, key: &str) {
        if let Some(index) = parse_index(key) {
            self.next_index = self.next_index.max(index.saturating_add(1));
        }
    }

    fn absorb(&mut self, node: InputNode) {
        match node {
            InputNode::Files(files) => {
                for file in files {
                    self.absorb(InputNode::File(file));
                }
            }
            node => {
                self.insert(self.next_index.to_string(), node);
            }
        }
    }

}

fn merge_nodes(existing: InputNode, incoming: InputNode) -> InputNode {
    match (existing, incoming) {
        (InputNode::Tree(mut tree), InputNode::Tree(other)) => {
            for (key, node) in other.entries {
                tree.merge(key, node);
            }
            InputNode::Tree(tree)
        }
        (InputNode::Tree(mut tree), files @ (InputNode::File(_) | InputNode::Files(_)))
        | (files @ (InputNode::File(_) | InputNode::Files(_)), InputNode::Tree(mut tree)) => {
            tree.absorb(files);
            InputNode::Tree(tree)
        }
        (InputNode::File(first), InputNode::File(second)) => InputNode::Files(vec![first, second]),
        (InputNode::File(first), InputNode::Files(mut files)) => {
            files.insert(0, first);
            InputNode::Files(files)
        }
        (InputNode::Files(mut files), InputNode::File(file)) => {
            files.push(file);
            InputNode::Files(files)
        }
        (InputNode::Files(mut files), InputNode::Files(more)) => {
            files.extend(more);
            InputNode::Files(files)
        }
        (_, incoming) => incoming,
    }
}

impl PartialEq for InputTree {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, N> FromIterator<(K, N)> for InputTree
where
    K: Into<String>,
    N: Into<InputNode>,
{
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        let mut tree = InputTree::new();
        for (key, node) in iter {
            tree.insert(key, node);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(index: &str, name: &str) -> InputFile {
        InputFile::new(index, 0).with_filename(name)
    }

    #[test]
    fn equality_ignores_order() {
        let a: InputTree = [("x", InputItem::new("x", "1")), ("y", InputItem::new("y", "2"))].into_iter().collect();
        let b: InputTree = [("y", InputItem::new("y", "2")), ("x", InputItem::new("x", "1"))].into_iter().collect();

        assert_eq!(a, b);
        assert_ne!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
    }

    #[test]
    fn merge_files_into_list() {
        let mut tree = InputTree::new();
        tree.merge("photo", file("photo", "a.png"));
        tree.merge("photo", file("photo", "b.png"));
        tree.merge("photo", file("photo", "c.png"));

        let files = tree.get("photo").and_then(InputNode::as_files).unwrap();
        let names = files.iter().filter_map(InputFile::filename).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn merge_sub_trees() {
        let mut tree = InputTree::new();
        tree.merge("docs", InputTree::from_iter([("passport", file("passport", "p.pdf"))]));
        tree.merge("docs", InputTree::from_iter([("visa", file("visa", "v.pdf"))]));

        let docs = tree.get("docs").and_then(InputNode::as_tree).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.contains_key("passport"));
        assert!(docs.contains_key("visa"));
    }

    #[test]
    fn sub_tree_absorbs_files() {
        let mut tree = InputTree::new();
        tree.merge("docs", InputTree::from_iter([("passport", file("passport", "p.pdf"))]));
        tree.merge("docs", file("docs", "loose.pdf"));

        let docs = tree.get("docs").and_then(InputNode::as_tree).unwrap();
        assert_eq!(docs.get("0").and_then(InputNode::as_file).and_then(InputFile::filename), Some("loose.pdf"));

        let mut tree = InputTree::new();
        tree.merge("docs", file("docs", "loose.pdf"));
        tree.merge("docs", InputTree::from_iter([("passport", file("passport", "p.pdf"))]));

        let docs = tree.get("docs").and_then(InputNode::as_tree).unwrap();
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["passport", "0"]);
    }

    #[test]
    fn sub_tree_absorbs_many_files() {
        let mut tree = InputTree::new();
        tree.merge("docs", InputTree::from_iter([("3", file("3", "p.pdf"))]));
        for i in 0..10_000 {
            tree.merge("docs", file("docs", &format!("{i}.pdf")));
        }

        let docs = tree.get("docs").and_then(InputNode::as_tree).unwrap();
        assert_eq!(docs.len(), 10_001);
        assert_eq!(docs.keys().nth(1), Some("4"));
        assert_eq!(docs.get("10003").and_then(InputNode::as_file).and_then(InputFile::filename), Some("9999.pdf"));
    }

    #[test]
    fn node_accessors() {
        let node = InputNode::from(InputTree::from_iter([("name", InputItem::new("name", "Zava"))]));

        assert!(!node.is_leaf());
        assert_eq!(node.get("name").and_then(InputNode::as_item).map(InputItem::value), Some("Zava"));
        assert!(node.get("missing").is_none());
        assert!(InputNode::from(InputItem::new("a", "b")).get("a").is_none());
        assert!(InputNode::from(file("a", "a.txt")).is_leaf());
    }
}
