//! Errors that can occur during proof verification.

use thiserror::Error;

use crate::config::ConfigError;

/// Structural, cryptographic, and consistency failures that can arise when
/// validating an Itsuku proof.
///
/// Every failure short-circuits verification; no partially verified state is
/// retained.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// The number of antecedents supplied for a memory element does not match
    /// its position: a seed element must have exactly 1, a compressed element
    /// exactly `antecedent_count`.
    #[error("invalid antecedent count: {0}")]
    InvalidAntecedentCount(usize),

    /// The Merkle opening lacks the node of a leaf whose antecedents were
    /// supplied.
    #[error("missing Merkle opening for required leaf index {0}")]
    MissingOpeningForLeaf(usize),

    /// The leaf hash recomputed from a reconstructed memory element differs
    /// from the hash in the opening.
    #[error("computed leaf hash mismatch for leaf index {0}")]
    LeafHashMismatch(usize),

    /// An intermediate node recomputed from its children differs from the
    /// hash in the opening.
    #[error("computed intermediate hash mismatch for node {0}")]
    IntermediateHashMismatch(usize),

    /// The opening does not contain the root node. The opening is incomplete
    /// or malformed.
    #[error("missing Merkle root hash")]
    MissingMerkleRoot,

    /// The opening does not describe a valid path from the required leaves to
    /// the root.
    #[error("malformed Merkle path structure in the proof opening")]
    MalformedProofPath,

    /// Omega replay selected a memory element whose antecedents are not in
    /// the proof.
    #[error("recalculated path includes leaves not provided in the proof")]
    UnprovenLeafInPath,

    /// The recomputed Omega hash has fewer leading zero bits than the
    /// difficulty requires.
    #[error("proof difficulty not met (insufficient leading zeros)")]
    DifficultyNotMet,

    /// A memory element needed during Omega replay could not be
    /// reconstructed from the proof.
    #[error("required memory element missing at index {0}")]
    RequiredElementMissing(usize),

    /// A child node needed to recompute a parent hash is absent from the
    /// opening.
    #[error("missing child node {0} required to verify a parent hash")]
    MissingChildNode(usize),

    /// The configuration carried by the proof violates the scheme's
    /// structural invariants.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
