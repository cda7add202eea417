use std::time::Duration;

use anyhow::{Context, Result};
use backtest_engine::{compare_to_buy_and_hold, run_strategy_monte_carlo, MonteCarloConfig};
use economic_events::EconomicEvent;
use game_session::{GameSession, ScoreCard};
use market_core::BENCHMARK_SYMBOL;
use price_generator::{HistoricalSupplier, InstrumentProfile, SeriesStats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time;

mod config;

use config::{PlayerPolicy, RunnerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, init tracing
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // 2. Load configuration
    let config = RunnerConfig::from_env()?;
    tracing::info!("Configuration loaded and validated");
    tracing::info!("  Mode: {}", config.mode);
    tracing::info!("  Economic events: {}", config.economic_events);
    tracing::info!("  Player policy: {:?}", config.player_policy);
    tracing::info!(
        "  Investment: ${} + ${}/year",
        config.game.initial_investment,
        config.game.annual_bonus
    );

    let mut rng = match config.seed {
        Some(seed) => {
            tracing::info!("  Seed: {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // 3. Start the session
    let mut session = match &config.historical_data_path {
        Some(path) if !config.mode.is_multi_instrument() => {
            let supplier = HistoricalSupplier::from_json_file(BENCHMARK_SYMBOL, path)
                .with_context(|| format!("failed to load history from {}", path))?;
            tracing::info!(
                "Sampling prices from {} months of history in {}",
                supplier.history_len(),
                path
            );
            GameSession::start_with_supplier(
                config.mode,
                config.economic_events,
                &config.game,
                &supplier,
                &mut rng,
            )?
        }
        Some(path) => {
            tracing::warn!(
                "Ignoring {}: {} mode needs several instruments, using synthetic prices",
                path,
                config.mode
            );
            GameSession::start(config.mode, config.economic_events, &config.game, &mut rng)?
        }
        None => GameSession::start(config.mode, config.economic_events, &config.game, &mut rng)?,
    };
    tracing::info!(
        "Session {} started: {} months, {} events scheduled",
        session.id,
        session.length_months(),
        session.events().scheduled_events().len()
    );

    // 4. Play it out
    if !play(&mut session, config.player_policy, config.fast_forward).await? {
        return Ok(());
    }

    let card = session
        .result()
        .context("session ended without a score card")??;
    report(&session, &card)?;

    // 5. Replay the configured strategy on the same benchmark path
    let benchmark = session.price_data().benchmark_series();
    let comparison =
        compare_to_buy_and_hold(benchmark, &config.strategy, config.backtest_initial_cash)?;
    tracing::info!(
        "Strategy {:?} every {} month(s): {:.2}% vs buy-and-hold {:.2}% (alpha {:+.2}%)",
        config.strategy.action,
        config.strategy.frequency,
        comparison.strategy_return_percent,
        comparison.buy_hold_return_percent,
        comparison.alpha
    );

    // 6. And across many synthetic paths
    if config.monte_carlo_runs > 0 {
        let end_date = benchmark
            .last()
            .map(|p| p.date)
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let mc_config = MonteCarloConfig {
            simulations: config.monte_carlo_runs,
            months: benchmark.len(),
            initial_cash: config.backtest_initial_cash,
            seed: config.seed.unwrap_or_else(|| rng.gen()),
            end_date,
        };
        let profile = InstrumentProfile::benchmark(config.game.start_price);
        let mc = run_strategy_monte_carlo(&config.strategy, &profile, &mc_config)?;
        tracing::info!("Monte Carlo: {}", serde_json::to_string(&mc)?);
    }

    Ok(())
}

/// Tick the session to completion, answering every event with `policy`.
///
/// Returns `false` when interrupted before the last month.
async fn play(session: &mut GameSession, policy: PlayerPolicy, fast_forward: bool) -> Result<bool> {
    let mut interval = time::interval(Duration::from_millis(session.tick_interval_ms()));

    while !session.is_complete() {
        if let Some(event) = session.pending_event().cloned() {
            respond(session, policy, &event)?;
            continue;
        }

        if !fast_forward {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!(
                        "Interrupted at month {}, abandoning session {}",
                        session.current_month(),
                        session.id
                    );
                    return Ok(false);
                }
            }
        }

        let outcome = session.tick()?;
        if outcome.bonus_applied {
            tracing::debug!("Month {}: annual bonus added", outcome.month);
        }
    }

    Ok(true)
}

fn respond(session: &mut GameSession, policy: PlayerPolicy, event: &EconomicEvent) -> Result<()> {
    tracing::info!(
        "Month {} [{}] {}: {}",
        event.trigger_month,
        event.category,
        event.sentiment.name(),
        event.text
    );

    match policy {
        PlayerPolicy::FollowNews if event.sentiment.is_negative() && session.can_sell() => {
            tracing::info!("  -> selling everything");
            session.sell_all()?;
        }
        PlayerPolicy::FollowNews if event.sentiment.is_positive() && session.can_buy() => {
            tracing::info!("  -> buying back in");
            session.buy_all()?;
        }
        _ => {
            session.dismiss()?;
        }
    }
    Ok(())
}

fn report(session: &GameSession, card: &ScoreCard) -> Result<()> {
    tracing::info!(
        "Final: player ${:.2} ({:+.2}%) vs market ${:.2} ({:+.2}%) -> grade {}",
        card.player_value,
        card.player_return_pct,
        card.baseline_value,
        card.baseline_return_pct,
        card.grade
    );
    tracing::info!("{}", card.summary);

    if let Some(stats) = SeriesStats::from_series(session.price_data().benchmark_series()) {
        tracing::info!(
            "Market path: {:.2}% annualized, {:.2}% volatility, {:.2}% max drawdown",
            stats.annualized_return * 100.0,
            stats.annualized_volatility * 100.0,
            stats.max_drawdown_pct
        );
    }

    println!("{}", serde_json::to_string_pretty(card)?);
    Ok(())
}
