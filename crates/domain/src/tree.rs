//! Parent-pointer trees
//!
//! Questions and narratives are stored flat, each carrying an optional parent id. These helpers
//! answer tree questions over such flat lists without ever holding child pointers in the
//! aggregates themselves.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use serde::Serialize;

use crate::error::DomainError;

/// A node that points at its parent by id.
pub trait ParentLinked {
    type Id: Copy + Eq + Hash + Display;

    fn node_id(&self) -> Self::Id;
    fn parent_id(&self) -> Option<Self::Id>;
}

/// A node together with its reconstructed children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<T> {
    pub node: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Convert every node, keeping the shape.
    pub fn map<U>(self, f: &impl Fn(T) -> U) -> TreeNode<U> {
        TreeNode {
            node: f(self.node),
            children: self.children.into_iter().map(|c| c.map(f)).collect(),
        }
    }
}

/// Verify that every parent chain in `nodes` terminates.
///
/// A chain ends at a node with no parent or at a parent id outside the slice.
///
/// # Errors
///
/// Returns `DomainError::Constraint` naming a node that sits on a cycle.
pub fn check_acyclic<T: ParentLinked>(nodes: &[T]) -> Result<(), DomainError> {
    let parents: HashMap<T::Id, Option<T::Id>> =
        nodes.iter().map(|n| (n.node_id(), n.parent_id())).collect();
    let mut terminated: HashSet<T::Id> = HashSet::new();

    for node in nodes {
        let mut chain: Vec<T::Id> = Vec::new();
        let mut seen: HashSet<T::Id> = HashSet::new();
        let mut cursor = Some(node.node_id());

        while let Some(id) = cursor {
            if terminated.contains(&id) {
                break;
            }
            if !seen.insert(id) {
                return Err(DomainError::constraint(format!(
                    "Parent chain of {} forms a cycle",
                    id
                )));
            }
            chain.push(id);
            cursor = parents.get(&id).copied().flatten();
        }

        terminated.extend(chain);
    }

    Ok(())
}

/// Nodes with no parent, or whose parent is not part of `nodes`.
pub fn roots<T: ParentLinked>(nodes: &[T]) -> Vec<&T> {
    let ids: HashSet<T::Id> = nodes.iter().map(ParentLinked::node_id).collect();
    nodes
        .iter()
        .filter(|n| n.parent_id().map_or(true, |p| !ids.contains(&p)))
        .collect()
}

/// Direct children of `parent`, in slice order.
pub fn children_of<T: ParentLinked>(nodes: &[T], parent: T::Id) -> Vec<&T> {
    nodes
        .iter()
        .filter(|n| n.parent_id() == Some(parent))
        .collect()
}

/// The path from `id` up to its root, starting with the node itself.
///
/// Empty when `id` is not in `nodes`. Stops early rather than looping if it meets a cycle.
pub fn ancestry<T: ParentLinked>(nodes: &[T], id: T::Id) -> Vec<&T> {
    let by_id: HashMap<T::Id, &T> = nodes.iter().map(|n| (n.node_id(), n)).collect();
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = Some(id);

    while let Some(current) = cursor {
        if !seen.insert(current) {
            break;
        }
        match by_id.get(&current) {
            Some(node) => {
                path.push(*node);
                cursor = node.parent_id();
            }
            None => break,
        }
    }

    path
}

/// Rebuild nested trees from a flat list.
///
/// Roots follow [`roots`]; siblings keep their input order. Nodes that only sit on a cycle have
/// no root to hang from and are left out, so callers that care should run [`check_acyclic`]
/// first.
pub fn build_forest<T: ParentLinked>(nodes: Vec<T>) -> Vec<TreeNode<T>> {
    let index: HashMap<T::Id, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.node_id(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut root_indices = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        match node.parent_id().and_then(|p| index.get(&p)) {
            Some(&parent) => children[parent].push(i),
            None => root_indices.push(i),
        }
    }

    // Post-order over an explicit stack: children are finished before their parent takes them,
    // and depth never grows the call stack.
    let mut built: Vec<Option<TreeNode<T>>> = nodes
        .into_iter()
        .map(|node| {
            Some(TreeNode {
                node,
                children: Vec::new(),
            })
        })
        .collect();
    let mut forest = Vec::with_capacity(root_indices.len());

    for root in root_indices {
        let mut stack = vec![(root, false)];
        while let Some((i, expanded)) = stack.pop() {
            if expanded {
                let kids: Vec<TreeNode<T>> = children[i]
                    .iter()
                    .filter_map(|&c| built[c].take())
                    .collect();
                if let Some(parent) = built[i].as_mut() {
                    parent.children = kids;
                }
            } else {
                stack.push((i, true));
                stack.extend(children[i].iter().map(|&c| (c, false)));
            }
        }
        if let Some(tree) = built[root].take() {
            forest.push(tree);
        }
    }

    forest
}
