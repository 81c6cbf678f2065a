//! Walkthrough of the full access-control flow: context setup, key
//! distribution, enrollment, and a handful of positive/negative queries.
//!
//! Runs at a reduced ring degree so the demo finishes quickly; a deployment
//! would use `BgvParams::deployment()` with a larger degree.

use chromagate::{
    BgvEngine, BgvParams, LatencyBudget, ProjectionModel, QuantizerConfig, SensorFrontend,
    TemplateEncoder, rotation_steps,
};
use chromagate::{AccessManager, ProjectionFit};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const DEGREE: usize = 256;
const RAW_DIM: usize = 100;
const COMPONENTS: usize = 6;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("setting up encryption context");
    let params = BgvParams {
        log2_q: 254,
        plain_modulus: 786433,
        error_std: 3.2,
        hamming_weight: 64,
        decomp_bits: 32,
    };
    let engine = BgvEngine::<DEGREE>::new(params)?;
    let mut rng = ChaCha20Rng::seed_from_u64(2024);

    info!("generating keys (secret stays with the door)");
    let secret_key = engine.generate_secret_key(&mut rng)?;
    let steps = rotation_steps(RAW_DIM, COMPONENTS);
    let eval_keys = engine.generate_evaluation_keys(&secret_key, &steps, &mut rng)?;
    let sensor_pk = eval_keys.public.clone();

    info!("quantizing a projection fit");
    // a stand-in for an externally trained PCA: smooth synthetic components
    let fit = ProjectionFit {
        mean: (0..RAW_DIM).map(|i| 30.0 + (i % 7) as f64).collect(),
        components: (0..COMPONENTS)
            .map(|c| {
                (0..RAW_DIM)
                    .map(|j| 0.05 * (((c + 2) * j) as f64 * 0.17).sin())
                    .collect()
            })
            .collect(),
    };
    let model = ProjectionModel::from_fit(&fit, &QuantizerConfig::default())?;

    info!("enrolling users");
    let samples: Vec<Vec<i64>> = (0..6)
        .map(|u| {
            (0..RAW_DIM as i64)
                .map(|i| 20 * ((i + u) % 9) + 600)
                .collect()
        })
        .collect();
    let user_ids = vec![0u32, 0, 1, 1, 2, 2];
    let encoder = TemplateEncoder::new(&engine, &eval_keys.public, model.clone())?;
    let (encoded_model, store) = encoder.enroll_all(&samples, &user_ids, &mut rng)?;
    info!(users = store.user_count(), "template store built");

    let manager = AccessManager::new(&engine, eval_keys, encoded_model, store)?;
    let sensor = SensorFrontend::new(
        &engine,
        sensor_pk,
        secret_key,
        model.downscale(),
        RAW_DIM,
        LatencyBudget::default(),
    );

    info!("running queries");
    let genuine = sensor.authenticate(&samples[0], 0, &manager, &mut rng)?;
    info!(
        score = genuine.score,
        secs = genuine.compute_time.as_secs_f64(),
        over_budget = genuine.budget_exceeded,
        "genuine probe against user 0"
    );

    let mut forged = samples[0].clone();
    for feature in [0, 11, 29, 47, 83] {
        forged[feature] += 40;
    }
    let impostor = sensor.authenticate(&forged, 0, &manager, &mut rng)?;
    info!(
        score = impostor.score,
        secs = impostor.compute_time.as_secs_f64(),
        over_budget = impostor.budget_exceeded,
        "forged probe against user 0"
    );

    match sensor.authenticate(&samples[0], 999, &manager, &mut rng) {
        Err(err) => info!(%err, "query for an unknown identity rejected"),
        Ok(_) => unreachable!("identity 999 is not enrolled"),
    }

    Ok(())
}
