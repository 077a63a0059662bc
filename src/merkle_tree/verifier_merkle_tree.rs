//! Sparse Merkle node store used during verification.

use std::{collections::HashMap, ops::Range};

use bytes::Bytes;

/// Holds only the Merkle nodes revealed by a proof opening, plus the hashes
/// the verifier recomputes while walking each authentication path.
///
/// Node hashes are appended to one flat byte vector; a mapping points each
/// node index at its byte range.
#[derive(Default)]
pub struct VerifierMerkleTree {
    /// Flat storage for all revealed node hashes.
    bytes: Vec<u8>,
    /// Maps a Merkle node index to its byte range in `bytes`.
    mapping: HashMap<usize, Range<usize>>,
}

impl VerifierMerkleTree {
    /// Inserts a node hash into the partial tree.
    pub fn insert(&mut self, node_index: usize, hash: Bytes) {
        let start = self.bytes.len();
        self.bytes.extend_from_slice(&hash);
        self.mapping.insert(node_index, start..start + hash.len());
    }

    /// Checks whether a node index is present.
    pub fn contains_key(&self, node_index: usize) -> bool {
        self.mapping.contains_key(&node_index)
    }

    /// Retrieves the hash of a node, if available.
    pub fn get_node(&self, index: usize) -> Option<&[u8]> {
        let range = self.mapping.get(&index)?.clone();
        self.bytes.get(range)
    }
}
