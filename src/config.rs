//! Core configuration parameters for the Itsuku Proof-of-Work scheme.
//!
//! The `Config` struct holds all constants that define the memory
//! requirements, the structure of the memory dependency graph, and the
//! required cryptographic difficulty. These parameters must be identical on
//! the prover (searcher) and the verifier for a proof to validate.

use clap::Args;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters of the memory-hard function and the PoW difficulty.
///
/// Together these determine the total memory size
/// (`chunk_count * chunk_size` elements of 64 bytes), the cost of
/// reconstructing individual elements, and the expected search effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Args)]
pub struct Config {
    /// The size of a single memory chunk, in 64-byte elements
    ///
    /// See [`crate::memory::Element`]
    #[arg(long, default_value_t = 1 << 15)]
    pub chunk_size: usize,
    /// The total number of memory chunks
    #[arg(long, default_value_t = 1 << 10)]
    pub chunk_count: usize,
    /// The number of antecedent elements compressed into a single new element
    #[arg(long, default_value_t = 4)]
    pub antecedent_count: usize,
    /// The required number of leading zero bits in the Omega hash
    #[arg(long, default_value_t = 24)]
    pub difficulty_bits: usize,
    /// The number of memory elements consulted per nonce attempt
    #[arg(long, default_value_t = 9)]
    pub search_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: 1 << 15,
            chunk_count: 1 << 10,
            antecedent_count: 4,
            difficulty_bits: 24,
            search_length: 9,
        }
    }
}

impl Config {
    /// Total number of memory elements (`T`), which is also the Merkle leaf
    /// count.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.chunk_count * self.chunk_size
    }

    /// Checks the structural invariants of the parameter set.
    ///
    /// The compression function splits its antecedents into even- and
    /// odd-indexed sums, so fewer than two antecedents cannot be expressed;
    /// the Merkle tree needs at least two leaves to have an internal node.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.antecedent_count < 2 {
            return Err(ConfigError::AntecedentCountTooSmall(self.antecedent_count));
        }
        if self.antecedent_count > self.chunk_size {
            return Err(ConfigError::AntecedentCountExceedsChunkSize {
                antecedent_count: self.antecedent_count,
                chunk_size: self.chunk_size,
            });
        }
        if self.element_count() < 2 {
            return Err(ConfigError::MemoryTooSmall(self.element_count()));
        }
        Ok(())
    }
}

/// Rejected parameter sets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Antecedent compression needs at least two inputs.
    #[error("antecedent count must be at least 2, got {0}")]
    AntecedentCountTooSmall(usize),

    /// Every antecedent index must fall inside its chunk.
    #[error("antecedent count {antecedent_count} exceeds chunk size {chunk_size}")]
    AntecedentCountExceedsChunkSize {
        antecedent_count: usize,
        chunk_size: usize,
    },

    /// The Merkle tree requires at least two leaves.
    #[error("total element count must be at least 2, got {0}")]
    MemoryTooSmall(usize),
}
