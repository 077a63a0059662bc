//! Dependency-index selection for the memory builder.
//!
//! Every compressed element depends on `antecedent_count` earlier elements of
//! its chunk. The positions are derived from the previous element's leading
//! bytes through an Argon2-style mapping (RFC 9106, Section 3.4.2) and a set
//! of twelve phi selection rules.

/// Computes the Argon2-style dependency index from the first four bytes of
/// the previous element.
///
/// The seed is interpreted as a little-endian u32, squared, and folded back
/// onto the `[0, original_index)` range so that earlier positions are favored.
pub(crate) fn calculate_argon2_index(seed_bytes: [u8; 4], original_index: usize) -> usize {
    let seed_integer_value = u32::from_le_bytes(seed_bytes) as u64;

    let x = seed_integer_value.wrapping_mul(seed_integer_value) >> 32;
    let y = (original_index as u64).wrapping_mul(x) >> 32;
    let z = (original_index as u64).wrapping_sub(1).wrapping_sub(y);

    z as usize
}

/// Computes the phi variant index for dependency selection.
///
/// `variant_identifier` is taken modulo 12; each variant maps
/// `(original_index, argon2_index)` onto an antecedent position. The result
/// is reduced modulo `original_index` so it always lies in
/// `[0, original_index)`.
pub(crate) fn calculate_phi_variant_index(
    original_index: usize,
    argon2_index: usize,
    variant_identifier: usize,
) -> usize {
    if original_index == 0 {
        return 0;
    }

    let index = match variant_identifier % 12 {
        0 => original_index - 1,
        1 => argon2_index,
        2 => (argon2_index + original_index) / 2,
        3 => original_index * 7 / 8,
        4 => (argon2_index + original_index * 3) / 4,
        5 => (argon2_index + original_index * 5) / 8,
        6 => original_index * 3 / 4,
        7 => original_index / 2,
        8 => original_index / 4,
        9 => 0,
        10 => argon2_index * 7 / 8,
        11 => original_index * 7 / 8,
        _ => unreachable!(),
    };

    index % original_index
}
