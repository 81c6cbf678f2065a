//! Properties of the slot-packed reductions: the binary-tree inner sum puts
//! the prefix total in slot 0 and provably zeros everything else; the
//! additive-chain small sum agrees with it after masking.

use chromagate::{
    BgvEngine, BgvParams, EvaluationKeys, SecretKey, inner_sum, sum_leading_slots,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const DEGREE: usize = 32;
const SLOTS: usize = DEGREE / 2;

fn setup(seed: u64, steps: &[i32]) -> (BgvEngine<DEGREE>, SecretKey<DEGREE>, EvaluationKeys<DEGREE>) {
    let params = BgvParams {
        log2_q: 200,
        plain_modulus: 786433,
        error_std: 3.2,
        hamming_weight: 8,
        decomp_bits: 32,
    };
    let engine = BgvEngine::new(params).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let keys = engine.generate_evaluation_keys(&sk, steps, &mut rng).unwrap();
    (engine, sk, keys)
}

fn power_of_two_steps() -> Vec<i32> {
    (0..SLOTS.trailing_zeros()).map(|p| 1i32 << p).collect()
}

#[test]
fn inner_sum_collapses_prefix_and_masks_the_rest() {
    let (engine, sk, keys) = setup(7, &power_of_two_steps());
    let mut rng = ChaCha20Rng::seed_from_u64(8);
    let mask0 = engine.encode(&[1]).unwrap();

    for count in [1usize, 2, 3, 5, 8, 11, 16] {
        let values: Vec<i64> = (0..count as i64).map(|i| 3 * i - 10).collect();
        let ct = engine.encrypt(&engine.encode(&values).unwrap(), &keys.public, &mut rng);

        let summed = inner_sum(&engine, &keys.galois, &mask0, &ct, count).unwrap();
        let decoded = engine.decode(&engine.decrypt(&summed, &sk));

        assert_eq!(decoded[0], values.iter().sum::<i64>(), "count {count}");
        assert!(
            decoded[1..].iter().all(|&v| v == 0),
            "slots beyond 0 must decrypt to zero for count {count}"
        );
    }
}

#[test]
fn inner_sum_rejects_empty_and_oversized_counts() {
    let (engine, _sk, keys) = setup(9, &power_of_two_steps());
    let mut rng = ChaCha20Rng::seed_from_u64(10);
    let mask0 = engine.encode(&[1]).unwrap();
    let ct = engine.encrypt(&engine.encode(&[1, 2, 3]).unwrap(), &keys.public, &mut rng);

    assert!(inner_sum(&engine, &keys.galois, &mask0, &ct, 0).is_err());
    assert!(inner_sum(&engine, &keys.galois, &mask0, &ct, SLOTS + 1).is_err());
}

#[test]
fn small_sum_chain_agrees_with_prefix_total() {
    // keys for the doubling amounts the chain can request up to k = 7,
    // plus the masking-free check below
    let (engine, sk, keys) = setup(11, &[1, 2, 3]);
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let mask0 = engine.encode(&[1]).unwrap();

    for k in [2usize, 3, 4, 5, 6, 7] {
        let values: Vec<i64> = (0..k as i64).map(|i| 7 * i + 1).collect();
        let ct = engine.encrypt(&engine.encode(&values).unwrap(), &keys.public, &mut rng);

        let summed = sum_leading_slots(&engine, &keys.galois, &ct, k).unwrap();
        let masked = engine.mul_plain(&summed, &mask0);
        let decoded = engine.decode(&engine.decrypt(&masked, &sk));

        assert_eq!(decoded[0], values.iter().sum::<i64>(), "k = {k}");
        assert!(decoded[1..].iter().all(|&v| v == 0));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn inner_sum_matches_plain_prefix_sum(
        values in prop::collection::vec(-200i64..200, 1..=SLOTS),
    ) {
        let (engine, sk, keys) = setup(13, &power_of_two_steps());
        let mut rng = ChaCha20Rng::seed_from_u64(14);
        let mask0 = engine.encode(&[1]).unwrap();
        let count = values.len();

        let ct = engine.encrypt(&engine.encode(&values).unwrap(), &keys.public, &mut rng);
        let summed = inner_sum(&engine, &keys.galois, &mask0, &ct, count).unwrap();
        let decoded = engine.decode(&engine.decrypt(&summed, &sk));

        prop_assert_eq!(decoded[0], values.iter().sum::<i64>());
        prop_assert!(decoded[1..].iter().all(|&v| v == 0));
    }
}
