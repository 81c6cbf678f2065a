use chromagate::{
    AccessManager, BgvEngine, BgvParams, ProjectionModel, TemplateEncoder, rotation_steps,
};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const DEGREE: usize = 256;
const RAW_DIM: usize = 100;
const COMPONENTS: usize = 6;

fn bench_access_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("access_query");
    group.sample_size(10);

    let params = BgvParams {
        log2_q: 254,
        plain_modulus: 786433,
        error_std: 3.2,
        hamming_weight: 64,
        decomp_bits: 32,
    };
    let engine = BgvEngine::<DEGREE>::new(params).expect("engine setup");
    let mut rng = ChaCha20Rng::seed_from_u64(321);

    let secret_key = engine.generate_secret_key(&mut rng).expect("secret key");
    let eval_keys = engine
        .generate_evaluation_keys(&secret_key, &rotation_steps(RAW_DIM, COMPONENTS), &mut rng)
        .expect("evaluation keys");

    let mean = vec![1i64; RAW_DIM];
    let components: Vec<Vec<i64>> = (0..COMPONENTS as i64)
        .map(|c| {
            (0..RAW_DIM as i64)
                .map(|j| if (j + c) % 11 == 0 { (j % 5) - 2 } else { 0 })
                .collect()
        })
        .collect();
    let model = ProjectionModel::from_integer_parts(mean, components, 20).expect("model");

    let encoder = TemplateEncoder::new(&engine, &eval_keys.public, model.clone()).expect("encoder");
    let raw: Vec<i64> = (0..RAW_DIM as i64).map(|i| 20 * (i % 7)).collect();
    let probe_pk = eval_keys.public.clone();
    let (encoded_model, store) = encoder
        .enroll_all(&[raw.clone()], &[7u32], &mut rng)
        .expect("enrollment");
    let manager = AccessManager::new(&engine, eval_keys, encoded_model, store).expect("manager");

    let probe_pt = engine.encode(&model.preprocess(&raw)).expect("encode probe");
    let probe = engine.encrypt(&probe_pt, &probe_pk, &mut rng);

    group.bench_function("single_template_query", |b| {
        b.iter(|| {
            let response = manager.query(black_box(&probe), 7).expect("query");
            black_box(response)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_access_query);
criterion_main!(benches);
