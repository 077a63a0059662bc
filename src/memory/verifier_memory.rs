//! Sparse memory view used during verification.
//!
//! The verifier never sees the full memory array; it only holds the elements
//! reconstructed from the proof's antecedents, indexed by their original
//! positions.

use std::collections::HashMap;

use crate::memory::{Element, PartialMemory};

/// A sparse representation of memory used by the verifier.
#[derive(Default)]
pub struct VerifierMemory {
    /// Maps original memory indices to their reconstructed [`Element`] data.
    data: HashMap<usize, Element>,
}

impl VerifierMemory {
    /// Inserts a reconstructed element at the specified index.
    ///
    /// Returns the previous element at that index, if any.
    pub fn insert(&mut self, index: usize, element: Element) -> Option<Element> {
        self.data.insert(index, element)
    }

    /// Returns an iterator over the reconstructed elements.
    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, usize, Element> {
        self.data.iter()
    }
}

impl PartialMemory for VerifierMemory {
    /// Retrieves an element if its index was revealed in the proof.
    fn get_element(&self, index: usize) -> Option<Element> {
        self.data.get(&index).copied()
    }
}
