//! Deterministic fallback vectors.
//!
//! The vector is a pure function of the text: a 31-multiplier polynomial
//! hash over UTF-16 code units seeds a 32-bit linear congruential
//! generator, and each step is mapped into `[-1, 1]`. UTF-16 units and
//! wrapping `u32` arithmetic keep the output identical to vectors already
//! stored by earlier JavaScript deployments.

/// Default fallback vector length
pub const DEFAULT_DIMENSION: usize = 64;

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

/// Compute the fallback vector for `text` with `dim` components.
pub fn fallback_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut seed = text
        .encode_utf16()
        .fold(0u32, |acc, unit| acc.wrapping_mul(31).wrapping_add(u32::from(unit)));

    (0..dim)
        .map(|_| {
            seed = seed.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
            ((seed % 10_000) as f32 / 5_000.0) - 1.0
        })
        .collect()
}
