//! Merkle commitment over the memory contents.
//!
//! The tree lets the prover demonstrate that specific memory elements were
//! computed correctly without revealing the whole array. Unlike standard
//! Merkle trees, the node width is dynamic: it is derived from the difficulty
//! and the search length to balance proof size against time-memory trade-off
//! attacks.

use std::{collections::BTreeMap, ops::Range};

use blake3::Hasher;
use bytes::Bytes;

use crate::{
    challenge_id::ChallengeId,
    config::Config,
    memory::{Element, Memory},
};

/// Computational cost multiplier for a memory element hash.
const MEMORY_COST_CX: f64 = 1.0;

/// A complete binary tree over all memory elements, stored as a flat byte
/// vector of `2T - 1` nodes.
///
/// Node 0 is the root; the children of node `k` are `2k + 1` and `2k + 2`;
/// the leaf of the element at global index `g` is node `T - 1 + g`.
pub struct MerkleTree {
    config: Config,
    /// The size of each node in bytes (dynamic based on config).
    node_size: usize,
    /// Flat storage for all tree nodes (leaves and intermediate nodes).
    nodes: Vec<u8>,
}

impl MerkleTree {
    /// Calculates the required node width in bytes.
    ///
    /// `M = ceil((d + log2(1 + L + ceil(L / 2)) + 6) / 8)`.
    pub fn calculate_node_size(config: &Config) -> usize {
        let search_length = config.search_length as f64;
        let difficulty = config.difficulty_bits as f64;

        let log_operand = MEMORY_COST_CX * search_length + (search_length * 0.5).ceil();
        let log_value = (1.0 + log_operand).log2();
        ((difficulty + log_value + 6.0) * 0.125).ceil() as usize
    }

    /// Allocates a new, empty Merkle tree for the given configuration.
    pub fn new(config: Config) -> Self {
        let node_size = Self::calculate_node_size(&config);

        let nodes_count = 2 * config.element_count() - 1;
        let nodes = vec![0u8; nodes_count * node_size];

        Self {
            config,
            node_size,
            nodes,
        }
    }

    /// The width of a single node in bytes.
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Converts a node index into a byte range of the flat storage.
    #[inline]
    fn translate_index(&self, index: usize) -> Range<usize> {
        let start = index * self.node_size;
        start..start + self.node_size
    }

    /// Retrieves the node data at the specified index.
    #[inline]
    pub fn get_node(&self, index: usize) -> Option<&[u8]> {
        self.nodes.get(self.translate_index(index))
    }

    /// Retrieves the node data at the specified index, mutably.
    #[inline]
    pub fn get_node_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let range = self.translate_index(index);
        self.nodes.get_mut(range)
    }

    /// Computes the hash of a leaf node into `output`.
    ///
    /// `node = H(element_le_bytes || challenge_id)` truncated to the node
    /// width.
    pub fn compute_leaf_hash(challenge_id: &ChallengeId, element: &Element, output: &mut [u8]) {
        let mut hasher = Hasher::new();
        hasher.update(&element.to_le_bytes());
        hasher.update(&challenge_id.bytes);
        hasher.finalize_xof().fill(output);
    }

    /// Populates all leaf nodes by hashing the memory elements.
    ///
    /// In the flat representation leaves occupy indices
    /// `T - 1 ..= 2T - 2`.
    pub fn compute_leaf_hashes(&mut self, challenge_id: &ChallengeId, memory: &Memory) {
        let element_count = self.config.element_count();
        let first_leaf = element_count - 1;

        for i in 0..element_count {
            let element = *memory.get(i).expect("memory covers every leaf");
            let node = self
                .get_node_mut(first_leaf + i)
                .expect("tree covers every leaf");
            Self::compute_leaf_hash(challenge_id, &element, node);
        }
    }

    /// Prepares the hash of an intermediate node.
    ///
    /// `node = H(left || right || challenge_id)` truncated to the node width.
    /// The absorbed state is returned as a closure so the caller can write
    /// the digest into storage it could not borrow alongside the children.
    pub fn compute_intermediate_hash(
        challenge_id: &ChallengeId,
        left: &[u8],
        right: &[u8],
    ) -> impl FnOnce(&mut [u8]) {
        let mut hasher = Hasher::new();
        hasher.update(left);
        hasher.update(right);
        hasher.update(&challenge_id.bytes);

        move |output: &mut [u8]| hasher.finalize_xof().fill(output)
    }

    /// Returns the indices of the left and right children of a parent node.
    #[inline]
    pub fn children_of(index: usize) -> (usize, usize) {
        (2 * index + 1, 2 * index + 2)
    }

    /// Computes all intermediate nodes up to and including the root.
    ///
    /// Iterates from the last parent down to index 0, hashing each pair of
    /// children; every internal node, the root included, is hashed exactly
    /// once. [`Self::compute_leaf_hashes`] must run first.
    pub fn compute_intermediate_nodes(&mut self, challenge_id: &ChallengeId) {
        let total_elements = self.config.element_count();

        for parent_index in (0..total_elements - 1).rev() {
            let (left_index, right_index) = Self::children_of(parent_index);

            let left_node = self.get_node(left_index).expect("child in range");
            let right_node = self.get_node(right_index).expect("child in range");

            let compute_hash =
                Self::compute_intermediate_hash(challenge_id, left_node, right_node);

            let parent_node = self.get_node_mut(parent_index).expect("parent in range");
            compute_hash(parent_node);
        }
    }

    /// Collects the authentication path of a node into the supplied mapping.
    ///
    /// Inserts the node itself, its sibling, and recursively the siblings of
    /// all ancestors, terminating once the root has been inserted. The root
    /// has no sibling.
    pub fn trace_node(&self, index: usize, nodes: &mut BTreeMap<usize, Bytes>) {
        if let Some(node) = self.get_node(index) {
            nodes.insert(index, Bytes::copy_from_slice(node));
        }
        if index == 0 {
            return;
        }

        let sibling_index = if index % 2 == 0 { index - 1 } else { index + 1 };
        if let Some(node) = self.get_node(sibling_index) {
            nodes.insert(sibling_index, Bytes::copy_from_slice(node));
        }

        Self::trace_node(self, (index - 1) / 2, nodes);
    }
}

pub mod verifier_merkle_tree;

#[cfg(test)]
mod tests;
