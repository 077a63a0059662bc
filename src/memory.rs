//! Memory structure and operations for the Itsuku Proof-of-Work.
//!
//! This module handles the allocation of the large memory array, the
//! definition of individual 64-byte [`Element`]s, and the compression
//! function used to populate the memory and to reconstruct elements during
//! verification.

use std::{
    fmt::Display,
    ops::{AddAssign, BitXorAssign},
    str::FromStr,
};

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use blake3::Hasher;
use bytemuck::{Pod, Zeroable};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use tracing::debug;

use crate::{
    calculate_argon2_index, calculate_phi_variant_index, challenge_id::ChallengeId, config::Config,
};

/// The size of a single memory element in bytes (64 bytes / 512 bits).
pub const ELEMENT_SIZE: usize = 64;
/// The number of 64-bit lanes in an element.
const LANES: usize = ELEMENT_SIZE / 8;

/// A single unit of data within the Proof-of-Work memory.
///
/// Each `Element` consists of 64 bytes, represented as eight `u64` lanes.
/// The canonical byte form is little-endian per lane; the mixing function
/// operates lane-wise (wrapping ADD, XOR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, SerializeDisplay, DeserializeFromStr)]
#[repr(transparent)]
pub struct Element {
    /// The underlying lanes.
    pub lanes: [u64; LANES],
}

impl Display for Element {
    /// Formats the element as a lowercase hex string of its little-endian
    /// byte sequence.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.to_le_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for Element {
    type Err = String;

    /// Parses an Element from a 128-character hex string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ELEMENT_SIZE * 2 {
            return Err(format!(
                "Invalid length: expected {} hex characters, got {}",
                ELEMENT_SIZE * 2,
                s.len()
            ));
        }

        let mut bytes = [0u8; ELEMENT_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let byte_str = &s[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(byte_str, 16).map_err(|e| format!("Invalid hex: {}", e))?;
        }

        Ok(Self::from(bytes))
    }
}

impl From<[u8; ELEMENT_SIZE]> for Element {
    #[inline]
    fn from(value: [u8; ELEMENT_SIZE]) -> Self {
        let mut lanes = [0u64; LANES];
        for (lane, chunk) in lanes.iter_mut().zip(value.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *lane = u64::from_le_bytes(buf);
        }
        Self { lanes }
    }
}

impl Element {
    /// Returns a new Element with all bits set to zero.
    #[inline]
    pub const fn zero() -> Self {
        Self { lanes: [0; LANES] }
    }

    /// Serializes the element to exactly 64 bytes, little-endian per lane.
    #[inline]
    pub fn to_le_bytes(&self) -> [u8; ELEMENT_SIZE] {
        let mut out = [0u8; ELEMENT_SIZE];
        for (chunk, lane) in out.chunks_exact_mut(8).zip(self.lanes) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
        out
    }

    /// XORs a byte slice into the lanes, interpreting it as little-endian
    /// u64 values.
    ///
    /// Only whole lanes are folded: of the first `min(len, 64)` bytes,
    /// any trailing partial lane is ignored and lanes beyond the slice are
    /// left unchanged.
    pub fn xor_assign_bytes(&mut self, rhs: &[u8]) {
        let limit = rhs.len().min(ELEMENT_SIZE);
        for (lane, chunk) in self.lanes.iter_mut().zip(rhs[..limit].chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *lane ^= u64::from_le_bytes(buf);
        }
    }

    /// Convert the element to a URL-safe Base64 string of its 64-byte
    /// little-endian encoding. Used for compact proof rendering.
    pub fn to_base64(&self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(self.to_le_bytes())
    }
}

impl BitXorAssign<&Self> for Element {
    /// Performs a lane-wise XOR assignment (`^=`) between two elements.
    #[inline]
    fn bitxor_assign(&mut self, rhs: &Self) {
        for (lane, other) in self.lanes.iter_mut().zip(&rhs.lanes) {
            *lane ^= *other;
        }
    }
}

impl AddAssign<&Self> for Element {
    /// Performs a lane-wise wrapping addition assignment (`+=`).
    #[inline]
    fn add_assign(&mut self, rhs: &Self) {
        for (lane, other) in self.lanes.iter_mut().zip(&rhs.lanes) {
            *lane = lane.wrapping_add(*other);
        }
    }
}

/// The main memory structure for the PoW scheme.
///
/// It holds the directed acyclic graph of data the prover must compute and
/// keep resident. The memory is divided into chunks so construction can be
/// parallelised without synchronisation.
pub struct Memory {
    config: Config,
    chunks: Vec<Vec<Element>>,
}

impl Memory {
    /// Allocates the memory structure based on the provided configuration.
    ///
    /// Memory is zero-initialised and organised into `config.chunk_count`
    /// chunks of `config.chunk_size` elements each.
    pub fn new(config: Config) -> Self {
        let mut chunks = Vec::with_capacity(config.chunk_count);
        for _ in 0..config.chunk_count {
            chunks.push(vec![Element::zero(); config.chunk_size]);
        }
        Self { config, chunks }
    }

    /// Retrieves a reference to the element at the specified global index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Element> {
        let chunk = index / self.config.chunk_size;
        let element = index % self.config.chunk_size;
        self.chunks.get(chunk)?.get(element)
    }

    /// Calculates the indices of the antecedent elements required to compute
    /// the element at `element_index`.
    ///
    /// The indices are derived from the content of the *previous* element,
    /// making the dependency graph data-dependent. Results are written into
    /// the provided `index_buffer` to avoid allocation.
    pub fn get_antecedent_indices(
        config: &Config,
        chunk: &[Element],
        element_index: usize,
        index_buffer: &mut [usize],
    ) {
        let antecedent_count = config.antecedent_count;
        assert!(element_index >= antecedent_count);
        assert_eq!(index_buffer.len(), antecedent_count);

        let prev_bytes = chunk[element_index - 1].to_le_bytes();
        let mut seed_4 = [0u8; 4];
        seed_4.copy_from_slice(&prev_bytes[0..4]);

        let argon2_index = calculate_argon2_index(seed_4, element_index);
        let element_count = config.chunk_size;

        for (variant, index_slot) in index_buffer.iter_mut().enumerate() {
            let idx = calculate_phi_variant_index(element_index, argon2_index, variant);
            *index_slot = idx % element_count;
        }
    }

    /// The core compression function (Φ).
    ///
    /// Folds a set of antecedents into a single new element:
    /// 1. wrapping sum of the even-indexed antecedents, with the global
    ///    element index XORed into lane 0;
    /// 2. wrapping sum of the odd-indexed antecedents, XOR-masked with the
    ///    challenge bytes;
    /// 3. a 64-byte hash of both sums.
    ///
    /// For odd antecedent counts the even sum has one more term than the odd
    /// sum.
    pub fn compress(
        antecedents: &[Element],
        global_element_index: u64,
        challenge_id: &ChallengeId,
    ) -> Element {
        let mut sum_even = Element::zero();
        let even_count = antecedents.len().div_ceil(2);
        for k in 0..even_count {
            sum_even += &antecedents[2 * k];
        }
        sum_even.lanes[0] ^= global_element_index;

        let mut sum_odd = Element::zero();
        let odd_count = antecedents.len() / 2;
        for k in 0..odd_count {
            sum_odd += &antecedents[2 * k + 1];
        }
        sum_odd.xor_assign_bytes(&challenge_id.bytes);

        let mut hasher = Hasher::new();
        hasher.update(&sum_even.to_le_bytes());
        hasher.update(&sum_odd.to_le_bytes());

        let mut output = Element::zero();
        hasher.finalize_xof().fill(bytemuck::bytes_of_mut(&mut output));
        output
    }

    /// Populates a single memory chunk.
    ///
    /// The first `antecedent_count` elements are seeded directly from the
    /// element index, the chunk index and the challenge. The remaining
    /// elements are produced by compressing the antecedents selected by
    /// [`Self::get_antecedent_indices`].
    pub fn build_chunk(
        config: &Config,
        chunk_index: usize,
        chunk: &mut [Element],
        challenge_id: &ChallengeId,
    ) {
        let antecedent_count = config.antecedent_count;
        let element_count = config.chunk_size;

        for (element_index, element) in chunk.iter_mut().take(antecedent_count).enumerate() {
            let mut hasher = Hasher::new();
            hasher.update(&(element_index as u64).to_le_bytes());
            hasher.update(&(chunk_index as u64).to_le_bytes());
            hasher.update(&challenge_id.bytes);
            hasher.finalize_xof().fill(bytemuck::bytes_of_mut(element));
        }

        // One index buffer and one antecedent buffer for the whole chunk
        let mut index_buffer = vec![0; antecedent_count];
        let mut antecedents = Vec::with_capacity(antecedent_count);

        for element_index in antecedent_count..element_count {
            Self::get_antecedent_indices(config, chunk, element_index, &mut index_buffer);
            antecedents.extend(index_buffer.iter().map(|&idx| chunk[idx]));

            let global_element_index = (chunk_index as u64)
                .wrapping_mul(element_count as u64)
                .wrapping_add(element_index as u64);
            chunk[element_index] =
                Self::compress(&antecedents, global_element_index, challenge_id);
            antecedents.clear();
        }
    }

    /// Builds the entire memory structure.
    ///
    /// Chunks are independent; with `jobs > 1` contiguous chunk ranges are
    /// distributed over scoped threads. The produced bytes are identical for
    /// any worker count.
    pub fn build_all_chunks(&mut self, challenge_id: &ChallengeId, jobs: usize) {
        let config = self.config;
        let threads = jobs.clamp(1, config.chunk_count.max(1));
        debug!(chunk_count = config.chunk_count, threads, "building memory");

        if threads == 1 {
            for (chunk_index, chunk) in self.chunks.iter_mut().enumerate() {
                Self::build_chunk(&config, chunk_index, chunk, challenge_id);
            }
            return;
        }

        let chunks_per_thread = config.chunk_count.div_ceil(threads);
        std::thread::scope(|scope| {
            for (thread, chunks_to_build) in self.chunks.chunks_mut(chunks_per_thread).enumerate() {
                scope.spawn(move || {
                    for (offset, chunk) in chunks_to_build.iter_mut().enumerate() {
                        let chunk_index = thread * chunks_per_thread + offset;
                        Self::build_chunk(&config, chunk_index, chunk, challenge_id);
                    }
                });
            }
        });
    }

    /// Traces the antecedent elements for a given leaf index.
    ///
    /// Used during proof assembly to gather the data the verifier needs to
    /// reconstruct the element:
    /// * a seed element traces to just itself (length 1);
    /// * a compressed element traces to its full antecedent list.
    pub fn trace_element(&self, leaf_index: usize) -> Vec<Element> {
        let antecedent_count = self.config.antecedent_count;

        let chunk_index = leaf_index / self.config.chunk_size;
        let chunk = &self.chunks[chunk_index];
        let element_index = leaf_index % self.config.chunk_size;

        if element_index < antecedent_count {
            return vec![chunk[element_index]];
        }

        let mut indices = vec![0; antecedent_count];
        Self::get_antecedent_indices(&self.config, chunk, element_index, &mut indices);
        indices.into_iter().map(|idx| chunk[idx]).collect()
    }
}

/// Element access required for Omega computation.
///
/// Abstracts between the full [`Memory`] used while searching and the sparse
/// [`verifier_memory::VerifierMemory`] reconstructed from a proof.
pub trait PartialMemory: Send + Sync {
    /// Gets the element at the given global index.
    fn get_element(&self, index: usize) -> Option<Element>;
}

impl PartialMemory for Memory {
    /// Accesses the full memory array.
    fn get_element(&self, index: usize) -> Option<Element> {
        self.get(index).copied()
    }
}

pub mod verifier_memory;

#[cfg(test)]
mod tests;
