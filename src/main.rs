//! Retirement calculator CLI
//!
//! Runs the projection, Social Security and Monte Carlo engines and prints JSON.
//! Series can also be written to CSV with `--csv`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use retirement_calc::montecarlo::{
    probability_message, transform_to_chart, MonteCarloConfig, PercentileBasis, TargetGoal,
};
use retirement_calc::ssa::parse_earnings_csv;
use retirement_calc::{
    simulate_deterministic, ClaimAge, MonteCarloInput, ProjectionInput, ScenarioRunner, SsaRequest, SsaTables,
};

#[derive(Parser)]
#[command(name = "retire", version, about = "Retirement projections, Social Security estimates and Monte Carlo simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding bend_points.csv, wage_index_factors.csv and wage_base.csv
    #[arg(long, global = true)]
    tables: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Deterministic compound-growth projection
    Project(ProjectArgs),
    /// Social Security benefit at one claim age
    Ssa(SsaArgs),
    /// Social Security benefit at every claim age from 62 to 70
    Sweep(SweepArgs),
    /// Monte Carlo simulation of the accumulation phase
    MonteCarlo(MonteCarloArgs),
}

#[derive(Args)]
struct ProjectArgs {
    #[arg(long, default_value_t = 0.0)]
    initial_balance: f64,
    #[arg(long, default_value_t = 0.0)]
    annual_contribution: f64,
    #[arg(long)]
    years: u32,
    #[arg(long, default_value_t = 0.07)]
    annual_return: f64,
    #[arg(long, default_value_t = 0.02)]
    inflation: f64,
    /// Write the yearly series to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct EarnerArgs {
    #[arg(long)]
    birth_year: i32,
    /// Known AIME; skips the earnings history
    #[arg(long, conflicts_with_all = ["earnings", "income"])]
    aime: Option<f64>,
    /// CSV file of `year,amount` lines
    #[arg(long, conflicts_with = "income")]
    earnings: Option<PathBuf>,
    /// Current annual income, used to synthesize an earnings history
    #[arg(long)]
    income: Option<f64>,
    /// Years of work assumed with --income
    #[arg(long, default_value_t = retirement_calc::ssa::DEFAULT_YEARS_WORKED)]
    years_worked: u32,
}

#[derive(Args)]
struct SsaArgs {
    #[command(flatten)]
    earner: EarnerArgs,
    #[arg(long, default_value_t = 67)]
    claim_age: u8,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    earner: EarnerArgs,
    /// Write the sweep to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct MonteCarloArgs {
    /// JSON file with the full simulation input; other input flags are ignored
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, default_value_t = 35)]
    current_age: u32,
    #[arg(long, default_value_t = 65)]
    retire_age: u32,
    #[arg(long, default_value_t = 0.0)]
    current_balance: f64,
    #[arg(long, default_value_t = 0.0)]
    annual_contrib: f64,
    #[arg(long, default_value_t = 0.0)]
    employer_match: f64,
    #[arg(long, default_value_t = 0.07)]
    expected_return: f64,
    #[arg(long, default_value_t = 0.15)]
    volatility: f64,
    #[arg(long, default_value_t = 10_000)]
    paths: usize,
    /// Seed for reproducible runs (ignored with --unseeded)
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long)]
    unseeded: bool,
    #[arg(long, default_value_t = 0.0)]
    fees: f64,
    #[arg(long)]
    glidepath: bool,
    /// Annual spending goal in today's dollars
    #[arg(long, requires = "horizon")]
    spend: Option<f64>,
    /// Years the spending goal must last
    #[arg(long, requires = "spend")]
    horizon: Option<u32>,
    /// Report percentile bands in real (inflation-adjusted) dollars
    #[arg(long)]
    real_bands: bool,
    /// Simulate on a single thread
    #[arg(long)]
    sequential: bool,
    /// Write the percentile bands by age to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Serialize)]
struct SeriesRow {
    year: usize,
    nominal: f64,
    real: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let tables = match &cli.tables {
        Some(dir) => SsaTables::from_csv_path(dir)
            .with_context(|| format!("loading SSA tables from {}", dir.display()))?,
        None => SsaTables::builtin(),
    };
    let runner = ScenarioRunner::with_tables(tables);

    match cli.command {
        Command::Project(args) => project(args),
        Command::Ssa(args) => ssa(&runner, args),
        Command::Sweep(args) => sweep(&runner, args),
        Command::MonteCarlo(args) => monte_carlo(runner, args),
    }
}

fn project(args: ProjectArgs) -> Result<()> {
    let input = ProjectionInput {
        initial_balance: args.initial_balance,
        annual_contribution: args.annual_contribution,
        years: args.years,
        annual_return: args.annual_return,
        inflation: args.inflation,
    };
    let result = simulate_deterministic(&input);

    if let Some(path) = &args.csv {
        let rows = result
            .nominal_balances
            .iter()
            .zip(&result.real_balances)
            .enumerate()
            .map(|(year, (&nominal, &real))| SeriesRow { year, nominal, real });
        write_csv(path, rows)?;
    }
    print_json(&result.summary())
}

/// Build a request from whichever AIME source the flags name
fn ssa_request(runner: &ScenarioRunner, earner: &EarnerArgs, claim_age: ClaimAge) -> Result<SsaRequest> {
    let birth_year = earner.birth_year;
    if let Some(aime) = earner.aime {
        return Ok(SsaRequest::from_aime(aime, birth_year, claim_age));
    }
    if let Some(income) = earner.income {
        let aime = runner
            .calculator()
            .estimate_aime_from_income(income, birth_year, earner.years_worked);
        return Ok(SsaRequest::from_aime(aime, birth_year, claim_age));
    }
    let Some(path) = &earner.earnings else {
        bail!("one of --aime, --earnings or --income is required");
    };

    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let earnings = parse_earnings_csv(&text);
    log::info!("Parsed {} earnings records from {}", earnings.len(), path.display());
    Ok(SsaRequest::from_earnings(earnings, birth_year, claim_age))
}

fn ssa(runner: &ScenarioRunner, args: SsaArgs) -> Result<()> {
    let claim_age = ClaimAge::new(args.claim_age)?;
    let request = ssa_request(runner, &args.earner, claim_age)?;
    print_json(&runner.run_ssa(&request))
}

fn sweep(runner: &ScenarioRunner, args: SweepArgs) -> Result<()> {
    let request = ssa_request(runner, &args.earner, ClaimAge::LATEST)?;
    let benefits = runner.run_claim_age_sweep(&request);

    if let Some(path) = &args.csv {
        write_csv(path, benefits.iter())?;
    }
    print_json(&benefits)
}

fn monte_carlo(runner: ScenarioRunner, args: MonteCarloArgs) -> Result<()> {
    let input: MonteCarloInput = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => MonteCarloInput {
            employer_match_rate: args.employer_match,
            n_paths: args.paths,
            seed: (!args.unseeded).then_some(args.seed),
            fees_annual: args.fees,
            glidepath: args.glidepath,
            target_goal: args.spend.map(|spend| TargetGoal {
                retirement_spend: Some(spend),
                horizon_years: args.horizon,
            }),
            ..MonteCarloInput::new(
                args.current_age,
                args.retire_age,
                args.current_balance,
                args.annual_contrib,
                args.expected_return,
                args.volatility,
            )
        },
    };

    let runner = runner.with_engine_config(MonteCarloConfig {
        percentile_basis: if args.real_bands {
            PercentileBasis::Real
        } else {
            PercentileBasis::Nominal
        },
        parallel: !args.sequential,
    });
    let response = runner.run_monte_carlo(&input)?;

    if input.target_goal.is_some() {
        log::info!("{}", probability_message(response.success_probability));
    }
    if let Some(path) = &args.csv {
        write_csv(path, transform_to_chart(&response, input.current_age))?;
    }
    print_json(&response)
}

fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
