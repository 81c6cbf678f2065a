//! Slot-packed reductions on encrypted data.
//!
//! Two shapes are used by the matching protocol: a binary-tree inner sum over
//! the raw feature dimension, and a short additive-chain sum over the handful
//! of projected coordinates. Both leave partial sums in the non-target slots;
//! the inner sum masks them away itself, the small sum leaves masking to the
//! caller so the mask multiplication can be shared with the final result.

use crate::access::errors::{AccessError, AccessResult};
use crate::bgv::{BgvEngine, Ciphertext, GaloisKeys, Plaintext};
use std::collections::BTreeSet;

/// Sum the `count` leading slots of `ciphertext` into slot 0 and zero every
/// other slot.
///
/// Runs through a binary tree: for p from ceil(log2(count))-1 down to 0,
/// rotate left by 2^p and add. Slots `[count, 2^ceil(log2(count)))` must be
/// zero on entry; the caller guarantees this padding. The final multiplication
/// by `mask0` (the slot-0 indicator) removes the partial sums the tree leaves
/// behind in every other slot, so nothing beyond the total can be learned
/// from the result.
pub fn inner_sum<const DEGREE: usize>(
    engine: &BgvEngine<DEGREE>,
    galois_keys: &GaloisKeys<DEGREE>,
    mask0: &Plaintext<DEGREE>,
    ciphertext: &Ciphertext<DEGREE>,
    count: usize,
) -> AccessResult<Ciphertext<DEGREE>> {
    if count == 0 {
        return Err(AccessError::EmptyReduction);
    }
    if count > engine.slot_count() {
        return Err(AccessError::DimensionMismatch {
            expected: engine.slot_count(),
            got: count,
        });
    }

    let rounds = count.next_power_of_two().trailing_zeros();
    let mut result = ciphertext.clone();
    for p in (0..rounds).rev() {
        let rotated = engine.rotate_left(&result, 1 << p, galois_keys)?;
        result = engine.add(&result, &rotated);
    }

    Ok(engine.mul_plain(&result, mask0))
}

/// Sum the `k` leading slots into slot 0 without masking, for small k.
///
/// Builds the sum through an additive chain instead of the full binary tree:
/// a running ciphertext summing `w` consecutive slots is doubled by
/// rotate-by-w-and-add, and extended by one slot (rotate-by-1, add the
/// original) for each set bit of k. For k = 6 this is rotate 1, rotate 1,
/// rotate 3 — cheaper than padding 6 up to 8. Slots other than 0 hold partial
/// sums afterwards; the caller must mask before disclosing the ciphertext.
pub fn sum_leading_slots<const DEGREE: usize>(
    engine: &BgvEngine<DEGREE>,
    galois_keys: &GaloisKeys<DEGREE>,
    ciphertext: &Ciphertext<DEGREE>,
    k: usize,
) -> AccessResult<Ciphertext<DEGREE>> {
    if k == 0 {
        return Err(AccessError::EmptyReduction);
    }
    if k > engine.slot_count() {
        return Err(AccessError::DimensionMismatch {
            expected: engine.slot_count(),
            got: k,
        });
    }
    if k == 1 {
        return Ok(ciphertext.clone());
    }

    let bits = usize::BITS - k.leading_zeros();
    let original = ciphertext.clone();
    let mut result = ciphertext.clone();
    let mut width = 1usize;
    for pos in (0..bits - 1).rev() {
        let rotated = engine.rotate_left(&result, width, galois_keys)?;
        result = engine.add(&result, &rotated);
        width *= 2;
        if (k >> pos) & 1 == 1 {
            let rotated = engine.rotate_left(&result, 1, galois_keys)?;
            result = engine.add(&rotated, &original);
            width += 1;
        }
    }
    debug_assert_eq!(width, k);
    Ok(result)
}

/// The rotation amounts `sum_leading_slots` will request for a given k.
pub fn chain_rotations(k: usize) -> Vec<usize> {
    let mut amounts = Vec::new();
    if k <= 1 {
        return amounts;
    }
    let bits = usize::BITS - k.leading_zeros();
    let mut width = 1usize;
    for pos in (0..bits - 1).rev() {
        amounts.push(width);
        width *= 2;
        if (k >> pos) & 1 == 1 {
            amounts.push(1);
            width += 1;
        }
    }
    amounts
}

/// Every rotation step a query will perform, for Galois key generation:
/// power-of-two left rotations for the inner sum over `raw_dim`, right
/// rotations repacking the `num_components` partial sums, and the additive
/// chain over the projected coordinates.
pub fn rotation_steps(raw_dim: usize, num_components: usize) -> Vec<i32> {
    let mut steps = BTreeSet::new();
    let rounds = raw_dim.next_power_of_two().trailing_zeros();
    for p in 0..rounds {
        steps.insert(1i32 << p);
    }
    for i in 1..num_components {
        steps.insert(-(i as i32));
    }
    for amount in chain_rotations(num_components) {
        steps.insert(amount as i32);
    }
    steps.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_matches_hand_tuned_sequence_for_six() {
        // the deployment's K=6 sequence: rotate 1, extend by 1, rotate 3
        assert_eq!(chain_rotations(6), vec![1, 1, 3]);
    }

    #[test]
    fn chain_for_powers_of_two_is_pure_doubling() {
        assert_eq!(chain_rotations(8), vec![1, 2, 4]);
    }

    #[test]
    fn chain_for_small_odd_counts() {
        assert_eq!(chain_rotations(2), vec![1]);
        assert_eq!(chain_rotations(3), vec![1, 1]);
        assert_eq!(chain_rotations(5), vec![1, 2, 1]);
        assert_eq!(chain_rotations(7), vec![1, 1, 3, 1]);
    }

    #[test]
    fn rotation_steps_cover_query_needs() {
        let steps = rotation_steps(100, 6);
        for p in [1, 2, 4, 8, 16, 32, 64] {
            assert!(steps.contains(&p));
        }
        for r in [-1, -2, -3, -4, -5] {
            assert!(steps.contains(&r));
        }
        assert!(steps.contains(&3));
    }
}
