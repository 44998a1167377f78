//! Sampler - MCTS-guided statistical path sampling
//!
//! A one-shot process that:
//! 1. Builds a deterministic synthetic program from the configuration
//! 2. Samples its paths with MCTS (or plain Monte Carlo) until the sample
//!    budget is spent
//! 3. Writes a JSON run report and a per-sample reward CSV to the data dir

use anyhow::{Context, Result};
use clap::Parser;
use mcts::{AnalysisStrategy, MctsConfig, MctsStrategy, RandomStrategy, SamplingAnalysis};
use programs::{run_sampling, ModelCount, PathCost, RunSummary, SyntheticProgram};
use sampler_config::StrategyKind;
use sampling_core::{SampleSizeTermination, SampleStatistics, SamplingResult};
use tracing::{error, info};

mod config;
mod reward_log;
mod stats;

use crate::config::Config;
use crate::reward_log::RewardLog;
use crate::stats::{write_report, RunReport, TreeReport};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Everything a finished run hands back to `main`.
struct RunOutput<S> {
    strategy: S,
    summary: RunSummary,
    result: SamplingResult,
    statistics: SampleStatistics,
    logged_rewards: usize,
}

fn execute<S: AnalysisStrategy>(
    config: &Config,
    program: &SyntheticProgram,
    strategy: S,
) -> Result<RunOutput<S>> {
    let mut statistics = SampleStatistics::new();
    let mut reward_log = RewardLog::new(config.rewards_path());

    let (summary, strategy, result) = {
        let mut analysis = SamplingAnalysis::new(
            strategy,
            Box::new(PathCost::new(program.clone())),
            Box::new(ModelCount::new(program.clone())),
            Box::new(SampleSizeTermination::new(config.max_samples)),
        )
        .with_prefix_cache(config.use_prefix_cache);
        analysis.add_observer(Box::new(&mut statistics));
        analysis.add_observer(Box::new(&mut reward_log));

        let summary = run_sampling(program, &mut analysis).context("Sampling run failed")?;
        let (strategy, result) = analysis.into_parts();
        (summary, strategy, result)
    };

    Ok(RunOutput {
        strategy,
        summary,
        result,
        statistics,
        logged_rewards: reward_log.len(),
    })
}

fn main() -> Result<()> {
    eprintln!("Sampler starting...");

    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {}", config.data_dir))?;

    let program = SyntheticProgram::new(config.depth, config.branching, config.program_seed)
        .with_error_rate(config.error_rate)
        .with_boundary_rate(config.boundary_rate);

    info!(
        strategy = %config.strategy,
        max_samples = config.max_samples,
        use_prefix_cache = config.use_prefix_cache,
        "Starting sampling run"
    );

    let run = match config.strategy {
        StrategyKind::Mcts => {
            let mcts_config = MctsConfig::default()
                .with_exploration(config.exploration_constant)
                .with_seed(config.seed)
                .with_snapshots(config.capture_snapshots);
            execute(&config, &program, MctsStrategy::from_config(&mcts_config)).map(|run| {
                let tree = TreeReport::from(&run.strategy.tree().stats());
                (run.summary, run.result, run.statistics, run.logged_rewards, Some(tree))
            })
        }
        StrategyKind::Random => execute(&config, &program, RandomStrategy::new(config.seed))
            .map(|run| (run.summary, run.result, run.statistics, run.logged_rewards, None)),
    };

    let (summary, result, statistics, logged_rewards, tree) = match run {
        Ok(run) => run,
        Err(e) => {
            error!("Sampler failed: {:#}", e);
            return Err(e);
        }
    };

    let report = RunReport {
        strategy: config.strategy.to_string(),
        program_depth: program.depth(),
        program_branching: program.branching(),
        program_seed: program.seed(),
        best: RunReport::best_entries(&result),
        statistics: statistics.snapshot(),
        summary,
        tree,
        timestamp: RunReport::timestamp_now(),
    };
    write_report(&config.stats_path(), &report);

    match result.overall_best() {
        Some((outcome, best)) => info!(
            %outcome,
            reward = best.reward,
            sample = best.sample_number,
            path = %best.path,
            "Best path found"
        ),
        None => info!("No path was sampled"),
    }
    info!(
        rewards = logged_rewards,
        stats = %config.stats_path(),
        "Sampler completed successfully"
    );

    Ok(())
}
