//! Proof validation ([`Proof::verify`]).
//!
//! The verifier reconstructs only the memory elements the proof touches,
//! cross-checks them against the Merkle opening, recomputes every opened
//! authentication path bottom-up, and replays the Omega chain over the
//! reconstructed view.

use blake3::Hasher;
use bytes::Bytes;

use crate::{
    memory::{verifier_memory::VerifierMemory, Memory},
    merkle_tree::{verifier_merkle_tree::VerifierMerkleTree, MerkleTree},
    proof::{pad_root, Proof, VerificationError, VerifierSearchParams},
};

impl Proof {
    /// Validates the proof against its challenge and configuration.
    ///
    /// Returns `Ok(())` if the nonce, the reconstructed memory elements, and
    /// the Merkle opening are consistent and the recomputed Omega meets the
    /// difficulty target.
    pub fn verify(&self) -> Result<(), VerificationError> {
        let config = &self.config;
        config.validate()?;

        let challenge_id = &self.challenge_id;
        let node_size = MerkleTree::calculate_node_size(config);
        let memory_size = config.element_count();

        // Step 1: reconstruct the memory elements touched by the proof.
        // A seed position carries its element verbatim; a compressed position
        // carries its antecedents and is recomputed through the compression
        // function.
        let mut partial_memory = VerifierMemory::default();
        for (&index, antecedents) in self.leaf_antecedents.iter() {
            let position = index % config.chunk_size;
            let expected_count = if position < config.antecedent_count {
                1
            } else {
                config.antecedent_count
            };

            let element = match antecedents.len() {
                1 if expected_count == 1 => antecedents[0],
                n if n == expected_count => {
                    Memory::compress(antecedents, index as u64, challenge_id)
                }
                n => return Err(VerificationError::InvalidAntecedentCount(n)),
            };
            partial_memory.insert(index, element);
        }

        // Step 2a: verify the hash of every reconstructed leaf against the
        // opening.
        let mut merkle_nodes = VerifierMerkleTree::default();
        let mut leaf_hash = vec![0u8; node_size];
        for (&leaf_index, element) in partial_memory.iter() {
            let node_index = memory_size - 1 + leaf_index;
            MerkleTree::compute_leaf_hash(challenge_id, element, &mut leaf_hash);

            let Some(opened_hash) = self.tree_opening.get(&node_index) else {
                return Err(VerificationError::MissingOpeningForLeaf(leaf_index));
            };
            if opened_hash.as_ref() != leaf_hash.as_slice() {
                return Err(VerificationError::LeafHashMismatch(leaf_index));
            }
            merkle_nodes.insert(node_index, Bytes::copy_from_slice(&leaf_hash));
        }

        // Step 2b: rebuild the opened paths bottom-up. Walking the opening in
        // descending node order guarantees children are settled before their
        // parent. A parent with at least one known child must recompute
        // cleanly from both children; an opened node with no known children
        // is a path sibling and is taken as provided.
        let mut computed_hash = vec![0u8; node_size];
        for (&node_index, opened_hash) in self.tree_opening.iter().rev() {
            if merkle_nodes.contains_key(node_index) {
                continue;
            }

            let (left_index, right_index) = MerkleTree::children_of(node_index);

            let left_child = merkle_nodes
                .get_node(left_index)
                .or_else(|| self.tree_opening.get(&left_index).map(|bytes| bytes.as_ref()));
            let right_child = merkle_nodes
                .get_node(right_index)
                .or_else(|| self.tree_opening.get(&right_index).map(|bytes| bytes.as_ref()));

            if left_child.is_none() && right_child.is_none() {
                merkle_nodes.insert(node_index, opened_hash.clone());
                continue;
            }

            let Some(left_child) = left_child else {
                return Err(VerificationError::MissingChildNode(left_index));
            };
            let Some(right_child) = right_child else {
                return Err(VerificationError::MissingChildNode(right_index));
            };

            let compute_hash =
                MerkleTree::compute_intermediate_hash(challenge_id, left_child, right_child);
            compute_hash(&mut computed_hash);

            if computed_hash.as_slice() != opened_hash.as_ref() {
                return Err(VerificationError::IntermediateHashMismatch(node_index));
            }
            merkle_nodes.insert(node_index, opened_hash.clone());
        }

        // Step 3: the root must be present; pad it to the Omega input width.
        let Some(root_hash) = merkle_nodes.get_node(0) else {
            return Err(VerificationError::MissingMerkleRoot);
        };
        let root_hash = pad_root(root_hash);

        // Step 4: replay the Omega chain over the reconstructed memory. A
        // lookup miss means the proof does not cover the selected path.
        let mut hasher = Hasher::new();
        let mut selected_leaves = Vec::with_capacity(config.search_length);
        let mut path = Vec::with_capacity(config.search_length + 1);

        let params = VerifierSearchParams {
            config,
            challenge_id,
            memory: &partial_memory,
        };
        let omega = Self::calculate_omega(
            &params,
            &root_hash,
            &mut hasher,
            &mut selected_leaves,
            &mut path,
            memory_size,
            self.nonce,
        )
        .map_err(VerificationError::RequiredElementMissing)?;

        // Step 5: every selected leaf must have been proven.
        if selected_leaves
            .iter()
            .any(|leaf| !self.leaf_antecedents.contains_key(leaf))
        {
            return Err(VerificationError::UnprovenLeafInPath);
        }

        // Step 6: difficulty.
        if Self::leading_zeros(&omega) < config.difficulty_bits {
            return Err(VerificationError::DifficultyNotMet);
        }

        Ok(())
    }
}
