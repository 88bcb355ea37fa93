//! Monte Carlo micro-benchmark
//!
//! Simulates 10,000 paths over a 40-year horizon with the glidepath on, then
//! repeats the run single-threaded to confirm both give the same answer.

use retirement_calc::montecarlo::{MonteCarloConfig, MonteCarloEngine, PercentileBasis};
use retirement_calc::MonteCarloInput;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let input = MonteCarloInput {
        employer_match_rate: 0.5,
        inflation: 0.02,
        salary_growth: 0.03,
        n_paths: 10_000,
        seed: Some(42),
        fees_annual: 0.005,
        glidepath: true,
        ..MonteCarloInput::new(30, 70, 100_000.0, 15_000.0, 0.07, 0.15)
    };

    let parallel = MonteCarloEngine::new(MonteCarloConfig {
        percentile_basis: PercentileBasis::Real,
        parallel: true,
    });
    let sequential = MonteCarloEngine::new(MonteCarloConfig {
        parallel: false,
        ..*parallel.config()
    });

    let start = Instant::now();
    let result = parallel.run(&input)?;
    let parallel_elapsed = start.elapsed();

    let start = Instant::now();
    let check = sequential.run(&input)?;
    let sequential_elapsed = start.elapsed();

    println!(
        "Simulated {} paths x {} years in {:.3} seconds ({:.3} single-threaded).",
        input.n_paths,
        input.years(),
        parallel_elapsed.as_secs_f64(),
        sequential_elapsed.as_secs_f64(),
    );
    match result.median_final() {
        Some(median) => println!("Median final real: {:.0}", median),
        None => println!("Median final real: (no percentile series available)"),
    }
    println!(
        "Final nominal: mean {:.0}, std {:.0}",
        result.final_balances_nominal.mean, result.final_balances_nominal.std
    );

    if result != check {
        anyhow::bail!("parallel and single-threaded runs disagree");
    }
    Ok(())
}
