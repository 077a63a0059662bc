//! The cryptographic challenge identifier (`I`) for a Proof-of-Work task.

use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;

/// Opaque byte sequence that personalises every hash and XOR step of the
/// scheme.
///
/// Keying the memory content, the Merkle tree, and the Omega chain on `I`
/// prevents precomputation: an expensive memory array built for one challenge
/// is useless for any other. The length is arbitrary (64 bytes in practice);
/// all hash inputs absorb the bytes verbatim.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChallengeId {
    #[serde(with = "::serde_with::As::<Base64>")]
    pub bytes: Vec<u8>,
}

impl From<Vec<u8>> for ChallengeId {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}
