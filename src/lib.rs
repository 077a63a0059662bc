//! Itsuku memory-hard Proof-of-Work.
//!
//! A prover builds a large deterministic memory array keyed by a challenge
//! identifier, commits to it with a Merkle tree, and sweeps nonces until the
//! derived Omega hash carries enough leading zero bits. The resulting
//! [`proof::Proof`] is compact: the nonce, the antecedents of the selected
//! memory elements, and the Merkle opening of the selected leaves. A verifier
//! reconstructs only those elements and replays the Omega chain.

#[cfg(not(target_endian = "little"))]
compile_error!("This library only supports little-endian targets");

pub mod challenge_id;
pub mod config;
mod indexing;
pub mod memory;
pub mod merkle_tree;
pub mod proof;

pub(crate) use indexing::{calculate_argon2_index, calculate_phi_variant_index};
