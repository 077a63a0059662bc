//! Compact Proof-of-Work solutions: the nonce search and the verifier.
//!
//! A [`Proof`] carries everything a verifier needs: the parameters, the
//! challenge, the winning nonce, the antecedents of the selected memory
//! elements, and the Merkle opening of the selected leaves. The proof is
//! small (around 11 KiB for the preferred parameters) compared to the
//! gigabytes of memory the prover had to hold.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use blake3::Hasher;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, Same};

use crate::{
    challenge_id::ChallengeId,
    config::Config,
    memory::{Element, PartialMemory, ELEMENT_SIZE},
};

pub mod error;
pub mod search_params;

mod solve;
mod verify;

pub use error::VerificationError;
pub use search_params::{SearchParams, SolverSearchParams, VerifierSearchParams};

/// A solution to an Itsuku Proof-of-Work challenge.
#[derive(Debug, Serialize, Deserialize)]
pub struct Proof {
    /// Configuration of the algorithm's parameters
    config: Config,
    /// Challenge identifier (I)
    challenge_id: ChallengeId,
    /// The nonce (N) that satisfied the difficulty (d) requirement.
    nonce: u64,
    /// A map from leaf index to the list of [`Element`]s required to compute
    /// the leaf's memory value (its antecedents).
    leaf_antecedents: BTreeMap<usize, Vec<Element>>,
    /// A map from Merkle node index to its hash, providing the collective
    /// opening of the selected leaves.
    #[serde(with = "::serde_with::As::<BTreeMap<Same, Base64>>")]
    tree_opening: BTreeMap<usize, Bytes>,
}

impl Proof {
    /// The parameters this proof was produced under.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The winning nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The antecedents of every selected leaf, keyed by leaf index.
    pub fn leaf_antecedents(&self) -> &BTreeMap<usize, Vec<Element>> {
        &self.leaf_antecedents
    }

    /// The Merkle opening, keyed by node index.
    pub fn tree_opening(&self) -> &BTreeMap<usize, Bytes> {
        &self.tree_opening
    }

    /// Calculates the Omega hash for a given nonce.
    ///
    /// This is the hash chain at the heart of the scheme: the nonce and the
    /// (padded) Merkle root seed `Y[0]`, each of the `search_length` rounds
    /// selects a memory element from the low bits of the previous hash and
    /// folds it in XOR-masked with the challenge, and a reverse sweep over
    /// the chain produces the final 64-byte Omega.
    ///
    /// Selected element indices and intermediate hashes are written into the
    /// caller-owned `selected_leaves` and `path` buffers so workers can reuse
    /// them across nonces. Fails with the offending index when the memory
    /// view cannot produce a selected element.
    fn calculate_omega<P: SearchParams>(
        params: &P,
        root_hash: &[u8; ELEMENT_SIZE],
        hasher: &mut Hasher,
        selected_leaves: &mut Vec<usize>,
        path: &mut Vec<[u8; ELEMENT_SIZE]>,
        memory_size: usize,
        nonce: u64,
    ) -> Result<[u8; ELEMENT_SIZE], usize> {
        selected_leaves.clear();
        path.clear();

        // Y0 = H(N || root || I)
        hasher.update(&nonce.to_le_bytes());
        hasher.update(root_hash);
        hasher.update(&params.challenge_id().bytes);
        let mut current = [0u8; ELEMENT_SIZE];
        hasher.finalize_xof().fill(&mut current);
        hasher.reset();

        let first = current;
        path.push(current);

        // Yj = H(Y_{j-1} || X[i_{j-1}] XOR I)
        for _ in 0..params.config().search_length {
            let mut index_bytes = [0u8; 8];
            index_bytes.copy_from_slice(&current[..8]);
            let index = (u64::from_le_bytes(index_bytes) % memory_size as u64) as usize;
            selected_leaves.push(index);

            let Some(mut element) = params.memory().get_element(index) else {
                return Err(index);
            };
            element.xor_assign_bytes(&params.challenge_id().bytes);

            hasher.update(&current);
            hasher.update(&element.to_le_bytes());
            let mut next = [0u8; ELEMENT_SIZE];
            hasher.finalize_xof().fill(&mut next);
            hasher.reset();

            path.push(next);
            current = next;
        }

        // Omega = H(Y_L || ... || Y_1 || (Y_0 XOR I))
        for hash in path.iter().skip(1).rev() {
            hasher.update(hash);
        }

        let mut masked_first = Element::from(first);
        masked_first.xor_assign_bytes(&params.challenge_id().bytes);
        hasher.update(&masked_first.to_le_bytes());

        let mut omega = [0u8; ELEMENT_SIZE];
        hasher.finalize_xof().fill(&mut omega);
        hasher.reset();
        Ok(omega)
    }

    /// Counts the number of leading zero bits in a byte sequence, from the
    /// most significant bit of byte 0 up to the first set bit.
    fn leading_zeros(array: &[u8]) -> usize {
        let mut counter = 0;
        for &byte in array {
            if byte == 0 {
                counter += 8;
            } else {
                counter += byte.leading_zeros() as usize;
                break;
            }
        }
        counter
    }
}

/// Right-pads a node hash with zeros to the 64-byte width used by the Omega
/// chain. The padding is part of the protocol: prover and verifier must pad
/// identically.
fn pad_root(node: &[u8]) -> [u8; ELEMENT_SIZE] {
    let mut out = [0u8; ELEMENT_SIZE];
    let len = node.len().min(ELEMENT_SIZE);
    out[..len].copy_from_slice(&node[..len]);
    out
}

impl Display for Proof {
    /// Formats the proof as an S-expression for human inspection or simple
    /// machine consumption.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "(proof")?;

        writeln!(f, "  (nonce {})", self.nonce)?;

        writeln!(f, "  (leaf_antecedents")?;
        for (leaf_idx, elems) in &self.leaf_antecedents {
            write!(f, "    ({leaf_idx} (")?;
            for elem in elems {
                write!(f, "\"{}\" ", elem.to_base64())?;
            }
            writeln!(f, "))")?;
        }
        writeln!(f, "  )")?;

        writeln!(f, "  (tree_opening")?;
        for (node_idx, bytes) in &self.tree_opening {
            let b64 = BASE64_URL_SAFE_NO_PAD.encode(bytes);
            writeln!(f, "    ({node_idx} \"{b64}\")")?;
        }
        writeln!(f, "  )")?;

        write!(f, ")")
    }
}
