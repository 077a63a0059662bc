//! The nonce search ([`Proof::search`]).
//!
//! Workers sweep disjoint nonce ranges over the shared immutable memory and
//! Merkle commitment until one of them produces an Omega hash with enough
//! leading zeros. The first valid proof wins; the others stop at their next
//! loop boundary.

use std::{collections::BTreeMap, sync::OnceLock};

use blake3::Hasher;
use bytes::Bytes;
use tracing::debug;

use crate::proof::{pad_root, Proof, SolverSearchParams};

impl Proof {
    /// Searches for a nonce that satisfies the difficulty requirement.
    ///
    /// The sweep starts at nonce 1 (0 is excluded by prover convention) and
    /// is split across `params.jobs` scoped threads; `jobs == 1` runs the
    /// sweep on the calling thread. Returns `None` if the nonce space is
    /// exhausted without a solution.
    pub fn search(params: SolverSearchParams<'_>) -> Option<Self> {
        let root_hash = pad_root(params.merkle_tree.get_node(0)?);
        let proof_slot = OnceLock::new();

        let threads = params.jobs.max(1);
        debug!(threads, difficulty_bits = params.config.difficulty_bits, "starting nonce sweep");

        if threads == 1 {
            Self::search_worker(&params, &root_hash, 1, u64::MAX, &proof_slot);
            return proof_slot.into_inner();
        }

        let span = u64::MAX / threads as u64;
        std::thread::scope(|scope| {
            for thread in 0..threads {
                let start = (thread as u64 * span).max(1);
                let end = if thread == threads - 1 {
                    u64::MAX
                } else {
                    (thread as u64 + 1) * span - 1
                };

                let root_hash = &root_hash;
                let proof_slot = &proof_slot;
                scope.spawn(move || {
                    Self::search_worker(&params, root_hash, start, end, proof_slot)
                });
            }
        });

        proof_slot.into_inner()
    }

    /// Sweeps one nonce range, publishing the first valid proof found.
    ///
    /// The scratch buffers for the Omega chain are allocated once per worker
    /// and reused across nonces. Workers poll the shared slot every
    /// iteration and stop as soon as another worker has published.
    fn search_worker(
        params: &SolverSearchParams<'_>,
        root_hash: &[u8; 64],
        start: u64,
        end: u64,
        proof_slot: &OnceLock<Proof>,
    ) {
        let mut hasher = Hasher::new();
        let mut selected_leaves = Vec::with_capacity(params.config.search_length);
        let mut path = Vec::with_capacity(params.config.search_length + 1);
        let memory_size = params.config.element_count();

        for nonce in start..=end {
            if proof_slot.get().is_some() {
                return;
            }

            let omega = Self::calculate_omega(
                params,
                root_hash,
                &mut hasher,
                &mut selected_leaves,
                &mut path,
                memory_size,
                nonce,
            )
            .expect("full memory lookup cannot fail");

            if Self::leading_zeros(&omega) < params.config.difficulty_bits {
                continue;
            }

            debug!(nonce, "difficulty met, assembling proof");

            let mut tree_opening = BTreeMap::new();
            let mut leaf_antecedents = BTreeMap::new();
            for &leaf_index in &selected_leaves {
                let node_index = memory_size - 1 + leaf_index;
                leaf_antecedents.insert(leaf_index, params.memory.trace_element(leaf_index));
                params.merkle_tree.trace_node(node_index, &mut tree_opening);
            }

            // A zero search length selects no leaves; the opening must still
            // carry the root.
            if tree_opening.is_empty() {
                if let Some(root) = params.merkle_tree.get_node(0) {
                    tree_opening.insert(0, Bytes::copy_from_slice(root));
                }
            }

            let proof = Proof {
                config: *params.config,
                challenge_id: params.challenge_id.clone(),
                nonce,
                leaf_antecedents,
                tree_opening,
            };

            proof_slot.set(proof).ok();
            return;
        }
    }
}
