//! Flat-array layout of a complete binary tree.
//!
//! Positions are heap-ordered: root=0, left child=2i+1, right child=2i+2.
//! With `n` leaves the array holds `2n - 1` hashes; leaf `k` of the leaf
//! sequence sits at `2n - 2 - k`. Internal nodes are the prefix
//! `[0, n - 1)`. When `n` is not a power of two the surplus leaves simply
//! land one level deeper, so no padding node is ever needed.

use crate::hash::{Hash, hash_pair};

pub(crate) fn left_child_index(i: usize) -> usize {
    2 * i + 1
}

pub(crate) fn right_child_index(i: usize) -> usize {
    2 * i + 2
}

/// Caller guarantees `i > 0`.
pub(crate) fn parent_index(i: usize) -> usize {
    (i - 1) / 2
}

/// Caller guarantees `i > 0`.
pub(crate) fn sibling_index(i: usize) -> usize {
    if i % 2 == 0 { i - 1 } else { i + 1 }
}

pub(crate) fn is_tree_node(len: usize, i: usize) -> bool {
    i < len
}

pub(crate) fn is_internal_node(len: usize, i: usize) -> bool {
    is_tree_node(len, left_child_index(i))
}

pub(crate) fn is_leaf_node(len: usize, i: usize) -> bool {
    is_tree_node(len, i) && !is_internal_node(len, i)
}

/// Array position of leaf `k` (in layout order) for a tree of `len` nodes.
pub(crate) fn leaf_position(len: usize, k: usize) -> usize {
    len - 1 - k
}

/// Build the node array over `leaves`, which must be non-empty.
pub(crate) fn make_tree(leaves: &[Hash]) -> Vec<Hash> {
    debug_assert!(!leaves.is_empty());
    let len = 2 * leaves.len() - 1;
    let mut tree = vec![[0u8; 32]; len];
    for (k, leaf) in leaves.iter().enumerate() {
        tree[leaf_position(len, k)] = *leaf;
    }
    for i in (0..len - leaves.len()).rev() {
        tree[i] = hash_pair(&tree[left_child_index(i)], &tree[right_child_index(i)]);
    }
    tree
}

/// Sibling path from array position `i` up to, not including, the root.
///
/// Caller guarantees `i` is a leaf position of `tree`.
pub(crate) fn path_for(tree: &[Hash], mut i: usize) -> Vec<Hash> {
    debug_assert!(is_leaf_node(tree.len(), i));
    let mut path = Vec::new();
    while i > 0 {
        path.push(tree[sibling_index(i)]);
        i = parent_index(i);
    }
    path
}

/// Fold sorted-pair hashing over `path` starting from `leaf`.
pub(crate) fn process_path(leaf: &Hash, path: &[Hash]) -> Hash {
    path.iter().fold(*leaf, |acc, sibling| hash_pair(&acc, sibling))
}

/// Check that every internal node is the sorted-pair hash of its children.
///
/// An empty array, or a node with a left child but no right child, is not a
/// valid tree.
pub(crate) fn check_tree(tree: &[Hash]) -> Result<(), String> {
    if tree.is_empty() {
        return Err("tree has no nodes".to_string());
    }
    if tree.len() % 2 == 0 {
        return Err(format!("tree has an even node count {}", tree.len()));
    }
    for i in 0..tree.len() {
        let (l, r) = (left_child_index(i), right_child_index(i));
        if r >= tree.len() {
            if l < tree.len() {
                return Err(format!("node {} has a left child but no right child", i));
            }
        } else if tree[i] != hash_pair(&tree[l], &tree[r]) {
            return Err(format!("node {} does not match the hash of its children", i));
        }
    }
    Ok(())
}

/// Depth of array position `i` (root is depth 0), equal to its proof length.
pub(crate) fn depth_of(i: usize) -> usize {
    (usize::BITS - 1 - (i + 1).leading_zeros()) as usize
}
