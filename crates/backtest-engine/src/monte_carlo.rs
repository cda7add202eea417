use market_core::GameError;
use price_generator::{generate_profile_series, InstrumentProfile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use tracing::info;

use crate::engine::{calculate_buy_and_hold, BacktestEngine};
use crate::models::{MonteCarloConfig, MonteCarloResult, Strategy};

/// Replay `strategy` over `config.simulations` synthetic paths of `profile`.
///
/// Path `i` is generated from seed `config.seed + i`, so a run is
/// reproducible regardless of how rayon schedules the work.
pub fn run_strategy_monte_carlo(
    strategy: &Strategy,
    profile: &InstrumentProfile,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult, GameError> {
    if config.simulations == 0 {
        return Err(GameError::InvalidInput(
            "at least one simulation is required".to_string(),
        ));
    }
    let engine = BacktestEngine::new(strategy.clone(), config.initial_cash)?;

    let outcomes: Vec<(f64, f64)> = (0..config.simulations)
        .into_par_iter()
        .map(|i| -> Result<(f64, f64), GameError> {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
            let path = generate_profile_series(profile, config.months, config.end_date, &mut rng)?;
            let strategy_run = engine.run(&path.points)?;
            let baseline = calculate_buy_and_hold(&path.points, config.initial_cash)?;
            Ok((strategy_run.total_return_percent, baseline.total_return_percent))
        })
        .collect::<Result<Vec<_>, GameError>>()?;

    let mut returns: Vec<f64> = outcomes.iter().map(|(s, _)| *s).collect();
    let baseline_returns: Vec<f64> = outcomes.iter().map(|(_, b)| *b).collect();
    let alphas: Vec<f64> = outcomes.iter().map(|(s, b)| s - b).collect();

    let n = outcomes.len() as f64;
    let profitable = returns.iter().filter(|r| **r > 0.0).count() as f64;
    let beats = alphas.iter().filter(|a| **a > 0.0).count() as f64;

    let mean_return = returns.as_slice().mean();
    let std_dev_return = if returns.len() > 1 {
        returns.as_slice().std_dev()
    } else {
        0.0
    };
    let mean_buy_hold_return = baseline_returns.as_slice().mean();
    let mean_alpha = alphas.as_slice().mean();

    returns.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let percentile = |sorted: &[f64], p: f64| -> f64 {
        let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    };

    let result = MonteCarloResult {
        simulations: outcomes.len(),
        mean_return,
        median_return: percentile(&returns, 50.0),
        std_dev_return,
        percentile_5: percentile(&returns, 5.0),
        percentile_95: percentile(&returns, 95.0),
        mean_buy_hold_return,
        mean_alpha,
        probability_of_profit: profitable / n * 100.0,
        probability_beats_buy_hold: beats / n * 100.0,
    };

    info!(
        "Monte Carlo ({} paths): mean return {:.2}%, beats buy-and-hold {:.1}% of the time",
        result.simulations, result.mean_return, result.probability_beats_buy_hold
    );

    Ok(result)
}
