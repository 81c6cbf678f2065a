//! Backend capability checks: round-trips, slotwise arithmetic, rotation
//! semantics. Small ring degrees keep these fast; the protocol-level tests
//! run at the access-control dimensions.

use chromagate::{BgvEngine, BgvError, BgvParams};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const T: u64 = 786433;

fn test_params() -> BgvParams {
    BgvParams {
        log2_q: 200,
        plain_modulus: T,
        error_std: 3.2,
        hamming_weight: 4,
        decomp_bits: 32,
    }
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();

    let values = vec![1i64, -2, 300, -40000, 0, 7, 123, -1];
    let pt = engine.encode(&values).unwrap();
    let ct = engine.encrypt(&pt, &pk, &mut rng);
    let decoded = engine.decode(&engine.decrypt(&ct, &sk));

    assert_eq!(&decoded[..values.len()], &values[..]);
}

#[test]
fn addition_is_slotwise() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(43);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();

    let a = vec![1i64, 2, 3, 4, 5, 6, 7, 8];
    let b = vec![10i64, -20, 30, -40, 50, -60, 70, -80];
    let ct_a = engine.encrypt(&engine.encode(&a).unwrap(), &pk, &mut rng);
    let ct_b = engine.encrypt(&engine.encode(&b).unwrap(), &pk, &mut rng);

    let sum = engine.add(&ct_a, &ct_b);
    let difference = engine.sub(&ct_a, &ct_b);

    let decoded_sum = engine.decode(&engine.decrypt(&sum, &sk));
    let decoded_diff = engine.decode(&engine.decrypt(&difference, &sk));
    for i in 0..8 {
        assert_eq!(decoded_sum[i], a[i] + b[i]);
        assert_eq!(decoded_diff[i], a[i] - b[i]);
    }
}

#[test]
fn plaintext_ops_are_slotwise() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(44);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();

    let a = vec![5i64, -6, 7, 8, 0, 1, -2, 9];
    let b = vec![3i64, 3, -3, 0, 11, 1, 2, -4];
    let ct = engine.encrypt(&engine.encode(&a).unwrap(), &pk, &mut rng);
    let pt = engine.encode(&b).unwrap();

    let decoded_sub = engine.decode(&engine.decrypt(&engine.sub_plain(&ct, &pt), &sk));
    let decoded_mul = engine.decode(&engine.decrypt(&engine.mul_plain(&ct, &pt), &sk));
    for i in 0..8 {
        assert_eq!(decoded_sub[i], a[i] - b[i]);
        assert_eq!(decoded_mul[i], a[i] * b[i]);
    }
}

#[test]
fn multiply_relinearize_roundtrip() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(45);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();
    let rk = engine.generate_relinearization_key(&sk, &mut rng).unwrap();

    let a = vec![2i64, -3, 4, 5, -6, 7, 0, 1];
    let b = vec![9i64, 8, -7, 6, 5, -4, 3, 2];
    let ct_a = engine.encrypt(&engine.encode(&a).unwrap(), &pk, &mut rng);
    let ct_b = engine.encrypt(&engine.encode(&b).unwrap(), &pk, &mut rng);

    let product = engine.mul(&ct_a, &ct_b).unwrap();
    assert!(!product.is_linear());
    // a secret-key holder can already read the degree-2 result
    let decoded_raw = engine.decode(&engine.decrypt(&product, &sk));

    let relinearized = engine.relinearize(&product, &rk);
    assert!(relinearized.is_linear());
    let decoded = engine.decode(&engine.decrypt(&relinearized, &sk));

    for i in 0..8 {
        assert_eq!(decoded_raw[i], a[i] * b[i]);
        assert_eq!(decoded[i], a[i] * b[i]);
    }
}

#[test]
fn squaring_matches_self_product() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(46);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();
    let rk = engine.generate_relinearization_key(&sk, &mut rng).unwrap();

    let a = vec![12i64, -11, 10, 0, -9, 8, 7, -6];
    let ct = engine.encrypt(&engine.encode(&a).unwrap(), &pk, &mut rng);

    let squared = engine.relinearize(&engine.square(&ct).unwrap(), &rk);
    let decoded = engine.decode(&engine.decrypt(&squared, &sk));
    for i in 0..8 {
        assert_eq!(decoded[i], a[i] * a[i]);
    }
}

#[test]
fn rotation_shifts_slots_cyclically() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(47);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();
    let gk = engine.generate_galois_keys(&sk, &[1, 2, -2], &mut rng).unwrap();

    let values = vec![10i64, 20, 30, 40, 50, 60, 70, 80];
    let ct = engine.encrypt(&engine.encode(&values).unwrap(), &pk, &mut rng);

    let left = engine.rotate_left(&ct, 1, &gk).unwrap();
    let decoded_left = engine.decode(&engine.decrypt(&left, &sk));
    assert_eq!(decoded_left, vec![20, 30, 40, 50, 60, 70, 80, 10]);

    let right = engine.rotate_right(&ct, 2, &gk).unwrap();
    let decoded_right = engine.decode(&engine.decrypt(&right, &sk));
    assert_eq!(decoded_right, vec![70, 80, 10, 20, 30, 40, 50, 60]);

    // step 0 is the identity and needs no key
    let same = engine.rotate_left(&ct, 0, &gk).unwrap();
    assert_eq!(engine.decode(&engine.decrypt(&same, &sk)), values);
}

#[test]
fn missing_rotation_key_is_an_error() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(48);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();
    let gk = engine.generate_galois_keys(&sk, &[1], &mut rng).unwrap();

    let ct = engine.encrypt(&engine.encode(&[1, 2, 3]).unwrap(), &pk, &mut rng);
    assert!(matches!(
        engine.rotate_left(&ct, 3, &gk),
        Err(BgvError::MissingRotationKey { step: 3, .. })
    ));
}

#[test]
fn rotation_rejects_unrelinearized_operand() {
    let engine = BgvEngine::<16>::new(test_params()).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(49);
    let sk = engine.generate_secret_key(&mut rng).unwrap();
    let pk = engine.generate_public_key(&sk, &mut rng).unwrap();
    let gk = engine.generate_galois_keys(&sk, &[1], &mut rng).unwrap();

    let ct = engine.encrypt(&engine.encode(&[1, 2]).unwrap(), &pk, &mut rng);
    let squared = engine.square(&ct).unwrap();
    assert!(matches!(
        engine.rotate_left(&squared, 1, &gk),
        Err(BgvError::NonLinearOperand { .. })
    ));
}

#[test]
fn parameter_validation() {
    let mut params = test_params();
    params.plain_modulus = 786432; // even
    assert!(BgvEngine::<16>::new(params).is_err());

    let mut params = test_params();
    params.hamming_weight = 0;
    assert!(BgvEngine::<16>::new(params).is_err());

    let mut params = test_params();
    params.log2_q = 64;
    assert!(BgvEngine::<16>::new(params).is_err());

    // plain modulus without batching support for this degree
    let mut params = test_params();
    params.plain_modulus = 41;
    assert!(BgvEngine::<16>::new(params).is_err());
}
