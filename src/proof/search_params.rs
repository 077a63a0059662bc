//! Parameter bundles for the nonce search and for proof verification.
//!
//! The Omega chain is the same computation on both sides of the protocol;
//! only the memory access differs. [`SearchParams`] abstracts over the full
//! dataset used while solving and the sparse dataset reconstructed while
//! verifying.

use crate::{
    challenge_id::ChallengeId,
    config::Config,
    memory::{verifier_memory::VerifierMemory, Memory, PartialMemory},
    merkle_tree::MerkleTree,
};

/// Access to the inputs of an Omega computation.
pub trait SearchParams {
    /// The memory view (full or sparse) elements are read from.
    type MemoryType: PartialMemory;

    /// Returns the protocol configuration.
    fn config(&self) -> &Config;
    /// Returns the challenge identifier for the current task.
    fn challenge_id(&self) -> &ChallengeId;
    /// Returns the memory view.
    fn memory(&self) -> &Self::MemoryType;
}

/// Immutable search inputs shared by all solver workers.
#[derive(Clone, Copy)]
pub struct SolverSearchParams<'a> {
    /// The protocol configuration.
    pub config: &'a Config,
    /// The challenge being solved.
    pub challenge_id: &'a ChallengeId,
    /// The full memory dataset.
    pub memory: &'a Memory,
    /// The Merkle tree commitment over the memory.
    pub merkle_tree: &'a MerkleTree,
    /// Worker threads for the nonce sweep; `1` keeps the sweep sequential.
    pub jobs: usize,
}

impl SearchParams for SolverSearchParams<'_> {
    type MemoryType = Memory;

    fn config(&self) -> &Config {
        self.config
    }
    fn challenge_id(&self) -> &ChallengeId {
        self.challenge_id
    }
    fn memory(&self) -> &Self::MemoryType {
        self.memory
    }
}

/// Verification inputs: the sparse memory reconstructed from a proof.
#[derive(Clone, Copy)]
pub struct VerifierSearchParams<'a> {
    /// The configuration carried by the proof under validation.
    pub config: &'a Config,
    /// The challenge the proof claims to answer.
    pub challenge_id: &'a ChallengeId,
    /// Only the elements revealed by the proof.
    pub memory: &'a VerifierMemory,
}

impl SearchParams for VerifierSearchParams<'_> {
    type MemoryType = VerifierMemory;

    fn config(&self) -> &Config {
        self.config
    }
    fn challenge_id(&self) -> &ChallengeId {
        self.challenge_id
    }
    fn memory(&self) -> &Self::MemoryType {
        self.memory
    }
}
