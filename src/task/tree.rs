//! AVL-balanced ordered store of tasks keyed by [`TaskId`].
//!
//! Every node owns its children exclusively (`Option<Box<Node>>`), so the
//! structure cannot share or cycle. After each public mutation the tree
//! satisfies both the BST ordering on `task.id` and the AVL balance
//! invariant (`|height(left) - height(right)| <= 1` at every node).

use crate::task::types::{Task, TaskId};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use tracing::debug;

type Link = Option<Box<Node>>;

/// Structural errors raised by the store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("chave duplicada {0} rejeitada pela árvore")]
    DuplicateKey(TaskId),

    #[error("ordem violada: chave {key} aparece depois de {previous}")]
    OrderViolation { key: TaskId, previous: TaskId },

    #[error("altura incorreta no nó {key}: registrada {stored}, calculada {computed}")]
    HeightMismatch {
        key: TaskId,
        stored: usize,
        computed: usize,
    },

    #[error("nó {key} desbalanceado (fator {balance})")]
    Unbalanced { key: TaskId, balance: isize },
}

#[derive(Clone, Debug)]
struct Node {
    task: Task,
    left: Link,
    right: Link,
    height: usize,
}

/// Self-balancing binary search tree holding the canonical task records
#[derive(Clone, Debug, Default)]
pub struct OrderedStore {
    root: Link,
}

impl Node {
    fn new(task: Task) -> Box<Self> {
        Box::new(Self {
            task,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn key(&self) -> TaskId {
        self.task.id
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance(link: &Link) -> isize {
    link.as_ref().map_or(0, |node| node.balance())
}

fn key_of(link: &Link) -> Option<TaskId> {
    link.as_ref().map(|node| node.key())
}

/// Left rotation around `p`; its right child becomes the subtree root
fn rotate_left(mut p: Box<Node>) -> Box<Node> {
    let Some(mut u) = p.right.take() else {
        return p;
    };
    p.right = u.left.take();
    p.update_height();
    u.left = Some(p);
    u.update_height();
    u
}

/// Right rotation around `p`; its left child becomes the subtree root
fn rotate_right(mut p: Box<Node>) -> Box<Node> {
    let Some(mut u) = p.left.take() else {
        return p;
    };
    p.left = u.right.take();
    p.update_height();
    u.right = Some(p);
    u.update_height();
    u
}

fn insert_node(link: Link, task: Task) -> Box<Node> {
    let Some(mut node) = link else {
        return Node::new(task);
    };

    let key = task.id;
    if key < node.key() {
        node.left = Some(insert_node(node.left.take(), task));
    } else {
        node.right = Some(insert_node(node.right.take(), task));
    }

    node.update_height();
    let balance = node.balance();

    // The inserted key decides single vs. double rotation.
    if balance > 1 {
        if key_of(&node.left).is_some_and(|left| key > left) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if balance < -1 {
        if key_of(&node.right).is_some_and(|right| key < right) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

/// Restore balance at `node` after a removal below it.
///
/// The child's own balance factor decides single vs. double rotation.
fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update_height();
    let factor = node.balance();

    if factor > 1 {
        if balance(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if factor < -1 {
        if balance(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

/// Detach the minimum node of a subtree, returning the rebalanced rest and its task
fn remove_min(mut node: Box<Node>) -> (Link, Task) {
    match node.left.take() {
        None => {
            let Node { task, right, .. } = *node;
            (right, task)
        }
        Some(left) => {
            let (rest, task) = remove_min(left);
            node.left = rest;
            (Some(rebalance(node)), task)
        }
    }
}

fn delete_node(link: Link, key: TaskId) -> (Link, Option<Task>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let removed = match key.cmp(&node.key()) {
        Ordering::Less => {
            let (left, removed) = delete_node(node.left.take(), key);
            node.left = left;
            removed
        }
        Ordering::Greater => {
            let (right, removed) = delete_node(node.right.take(), key);
            node.right = right;
            removed
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, child) | (child, None) => return (child, Some(node.task)),
            (Some(left), Some(right)) => {
                // Two children: the in-order successor takes this node's place.
                let (rest, successor) = remove_min(right);
                node.left = Some(left);
                node.right = rest;
                Some(std::mem::replace(&mut node.task, successor))
            }
        },
    };

    if removed.is_none() {
        return (Some(node), None);
    }
    (Some(rebalance(node)), removed)
}

fn count_nodes(link: &Link) -> usize {
    match link {
        None => 0,
        Some(node) => 1 + count_nodes(&node.left) + count_nodes(&node.right),
    }
}

fn validate_node(link: &Link) -> Result<usize, StoreError> {
    let Some(node) = link else {
        return Ok(0);
    };

    let computed = 1 + validate_node(&node.left)?.max(validate_node(&node.right)?);
    if computed != node.height {
        return Err(StoreError::HeightMismatch {
            key: node.key(),
            stored: node.height,
            computed,
        });
    }

    let balance = node.balance();
    if balance.abs() > 1 {
        return Err(StoreError::Unbalanced {
            key: node.key(),
            balance,
        });
    }

    Ok(computed)
}

impl OrderedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert a task under its id.
    ///
    /// Keys must be unique; a duplicate is rejected and the tree is left untouched.
    pub fn insert(&mut self, task: Task) -> Result<(), StoreError> {
        let key = task.id;
        if self.contains(key) {
            return Err(StoreError::DuplicateKey(key));
        }

        self.root = Some(insert_node(self.root.take(), task));
        debug!("Inserted key {} into ordered store", key);
        Ok(())
    }

    /// Look up a task by id
    pub fn search(&self, key: TaskId) -> Option<&Task> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.task),
            };
        }
        None
    }

    /// Look up a task by id for in-place mutation
    pub fn search_mut(&mut self, key: TaskId) -> Option<&mut Task> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match key.cmp(&node.task.id) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.task),
            };
        }
        None
    }

    pub fn contains(&self, key: TaskId) -> bool {
        self.search(key).is_some()
    }

    /// Remove the task stored under `key`, rebalancing every ancestor.
    ///
    /// Returns the removed task, or `None` when the key is absent.
    pub fn delete(&mut self, key: TaskId) -> Option<Task> {
        let (root, removed) = delete_node(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            debug!("Deleted key {} from ordered store", key);
        }
        removed
    }

    /// Lazy in-order walk in ascending key order
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.root)
    }

    /// Total node count, computed by walking the tree
    pub fn count(&self) -> usize {
        count_nodes(&self.root)
    }

    /// Height of the whole tree (0 when empty)
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Task stored at the root node
    pub fn root(&self) -> Option<&Task> {
        self.root.as_deref().map(|node| &node.task)
    }

    /// Task with the smallest id
    pub fn first(&self) -> Option<&Task> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.task)
    }

    /// Task with the largest id
    pub fn last(&self) -> Option<&Task> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.task)
    }

    /// Check ordering, stored heights, and balance at every node
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut previous: Option<TaskId> = None;
        for task in self.iter() {
            if let Some(previous) = previous {
                if task.id <= previous {
                    return Err(StoreError::OrderViolation {
                        key: task.id,
                        previous,
                    });
                }
            }
            previous = Some(task.id);
        }

        validate_node(&self.root).map(|_| ())
    }
}

/// In-order iterator over an [`OrderedStore`].
///
/// Holds an explicit stack of pending ancestors, so the walk is lazy and
/// does not recurse.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn new(root: &'a Link) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left(root.as_deref());
        iter
    }

    fn push_left(&mut self, mut node: Option<&'a Node>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.task)
    }
}

impl<'a> IntoIterator for &'a OrderedStore {
    type Item = &'a Task;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order rendering, one `|id:h=height|` token per node
impl fmt::Display for OrderedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_preorder(link: &Link, out: &mut Vec<String>) {
            if let Some(node) = link {
                out.push(format!("|{}:h={}|", node.key(), node.height));
                write_preorder(&node.left, out);
                write_preorder(&node.right, out);
            }
        }

        let mut tokens = Vec::new();
        write_preorder(&self.root, &mut tokens);
        f.write_str(&tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::types::TaskSpec;
    use proptest::prelude::*;

    fn task(id: TaskId) -> Task {
        Task::new(
            id,
            TaskSpec {
                description: format!("task {}", id),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn store_with(keys: &[TaskId]) -> OrderedStore {
        let mut store = OrderedStore::new();
        for &key in keys {
            store.insert(task(key)).unwrap();
        }
        store
    }

    fn keys(store: &OrderedStore) -> Vec<TaskId> {
        store.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_empty_store() {
        let mut store = OrderedStore::new();

        assert!(store.is_empty());
        assert_eq!(store.count(), 0);
        assert_eq!(store.height(), 0);
        assert!(store.search(1).is_none());
        assert!(store.delete(1).is_none());
        assert!(store.first().is_none());
        assert_eq!(store.iter().count(), 0);
        assert_eq!(store.to_string(), "");
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let store = store_with(&(1..=7).collect::<Vec<_>>());

        // A perfect tree of 7 nodes rooted at 4.
        assert_eq!(store.root().map(|t| t.id), Some(4));
        assert_eq!(store.height(), 3);
        assert_eq!(keys(&store), vec![1, 2, 3, 4, 5, 6, 7]);
        store.validate().unwrap();
    }

    #[test]
    fn test_single_right_rotation() {
        let store = store_with(&[3, 2, 1]);
        assert_eq!(store.to_string(), "|2:h=2| |1:h=1| |3:h=1|");
    }

    #[test]
    fn test_single_left_rotation() {
        let store = store_with(&[1, 2, 3]);
        assert_eq!(store.to_string(), "|2:h=2| |1:h=1| |3:h=1|");
    }

    #[test]
    fn test_left_right_rotation() {
        let store = store_with(&[3, 1, 2]);
        assert_eq!(store.to_string(), "|2:h=2| |1:h=1| |3:h=1|");
    }

    #[test]
    fn test_right_left_rotation() {
        let store = store_with(&[1, 3, 2]);
        assert_eq!(store.to_string(), "|2:h=2| |1:h=1| |3:h=1|");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut store = store_with(&[1, 2, 3]);
        let before = store.to_string();

        assert_eq!(store.insert(task(2)), Err(StoreError::DuplicateKey(2)));
        assert_eq!(store.to_string(), before);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_search_mut_is_visible() {
        let mut store = store_with(&[1, 2, 3]);

        store.search_mut(3).unwrap().complete();

        assert!(store.search(3).unwrap().completed);
        assert!(!store.search(2).unwrap().completed);
    }

    #[test]
    fn test_delete_single_child_and_leaf() {
        let mut store = store_with(&[2, 1, 3, 4]);

        // 3 has only a right child.
        assert_eq!(store.delete(3).map(|t| t.id), Some(3));
        store.validate().unwrap();
        assert_eq!(keys(&store), vec![1, 2, 4]);

        assert_eq!(store.delete(1).map(|t| t.id), Some(1));
        store.validate().unwrap();
        assert_eq!(keys(&store), vec![2, 4]);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_delete_two_children_uses_successor() {
        let mut store = store_with(&[4, 2, 6, 1, 3, 5, 7]);

        let removed = store.delete(4).unwrap();

        assert_eq!(removed.id, 4);
        assert_eq!(removed.description, "task 4");
        assert_eq!(store.root().map(|t| t.id), Some(5));
        assert_eq!(keys(&store), vec![1, 2, 3, 5, 6, 7]);
        store.validate().unwrap();
    }

    #[test]
    fn test_delete_triggers_rotation() {
        let mut store = store_with(&[2, 1, 3, 4]);

        store.delete(1);

        // Removing 1 leaves 2 right-heavy; a left rotation lifts 3.
        assert_eq!(store.to_string(), "|3:h=2| |2:h=1| |4:h=1|");
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let mut store = store_with(&[1, 2, 3]);
        let before = store.to_string();

        assert!(store.delete(9).is_none());
        assert_eq!(store.to_string(), before);
    }

    #[test]
    fn test_first_and_last() {
        let store = store_with(&[5, 3, 8, 1, 9]);
        assert_eq!(store.first().map(|t| t.id), Some(1));
        assert_eq!(store.last().map(|t| t.id), Some(9));
    }

    proptest! {
        #[test]
        fn prop_inserts_and_deletes_keep_invariants(
            inserts in proptest::collection::vec(0u64..500, 0..200),
            deletes in proptest::collection::vec(0u64..500, 0..200),
        ) {
            let mut store = OrderedStore::new();
            let mut expected = std::collections::BTreeSet::new();

            for key in inserts {
                let fresh = expected.insert(key);
                prop_assert_eq!(store.insert(task(key)).is_ok(), fresh);
                prop_assert!(store.validate().is_ok());
            }

            for key in deletes {
                let count = store.count();
                let removed = store.delete(key);
                prop_assert_eq!(removed.is_some(), expected.remove(&key));
                if removed.is_some() {
                    prop_assert_eq!(store.count(), count - 1);
                }
                prop_assert!(store.validate().is_ok());
                prop_assert!(store.search(key).is_none());
            }

            prop_assert_eq!(keys(&store), expected.into_iter().collect::<Vec<_>>());
        }
    }
}
