//! Calibration run: how the Bayes factor responds to a known effect size.
//!
//! For each slope a fresh synthetic dataset is drawn per seed, and the
//! evidence for `numeric_0` against every other column is computed. With no
//! effect the binary and ordinal rows should sit below 1; as the slope grows
//! the `binary_0` evidence should climb.
//!
//! Run with `cargo run --example calibration`. Set `RUST_LOG=bayes_evidence=debug`
//! to see the per-test backend summaries.

use bayes_evidence::logging::{init_logging, LoggingConfig};
use bayes_evidence::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const ROWS: usize = 200;
const SEEDS: u64 = 20;
const SLOPES: [f64; 5] = [0.0, 0.1, 0.25, 0.5, 1.0];

fn draw(slope: f64, seed: u64) -> Result<(arrow::record_batch::RecordBatch, DtypeTable)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (data, dtypes) = SyntheticData::new()
        .sample_binary(
            &mut rng,
            0.5,
            ROWS,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .sample_nominal(
            &mut rng,
            &[0.3, 0.3, 0.4],
            ROWS,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .sample_ordinal(
            &mut rng,
            &[0.25, 0.25, 0.25, 0.25],
            ROWS,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .sample_numeric(
            &mut rng,
            0.0,
            1.0,
            Some(&Regressor::new("binary_0", slope)),
            ROWS,
            Columns::Count(1),
            SampleOptions::default(),
        )?
        .into_parts();
    let data = data.ok_or_else(|| EvidenceError::invalid_request("no dataset was sampled"))?;
    Ok((data, dtypes))
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default().with_crate_level(tracing::Level::WARN))?;

    let predictors = ["binary_0", "nominal_0", "ordinal_0"];
    println!("median BF10 over {SEEDS} datasets of {ROWS} rows");
    println!("{:>6} {:>14} {:>14} {:>14}", "slope", predictors[0], predictors[1], predictors[2]);

    for slope in SLOPES {
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); predictors.len()];
        for seed in 0..SEEDS {
            let (data, dtypes) = draw(slope, seed)?;
            let engine = BayesFactorEngine::new(dtypes);
            for (column, x) in columns.iter_mut().zip(predictors) {
                let outcome = engine.bayes_factor(
                    &data,
                    "numeric_0",
                    &EvidenceRequest::predictor(x),
                    false,
                )?;
                if let Some(bf) = outcome.value() {
                    column.push(bf);
                }
            }
        }
        let medians: Vec<f64> = columns.into_iter().map(median).collect();
        println!(
            "{slope:>6.2} {:>14.4e} {:>14.4e} {:>14.4e}",
            medians[0], medians[1], medians[2]
        );
    }

    Ok(())
}
