use anyhow::{bail, Context, Result};
use backtest_engine::{Strategy, TradeDirection, TradeTiming};
use game_session::GameConfig;
use market_core::GameMode;
use serde::{Deserialize, Serialize};
use std::env;

/// How the headless player answers economic news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPolicy {
    /// Dismiss everything and stay invested
    Hold,
    /// Sell on bad news, buy on good news, ignore the rest
    FollowNews,
}

impl std::str::FromStr for PlayerPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hold" => Ok(PlayerPolicy::Hold),
            "follow_news" => Ok(PlayerPolicy::FollowNews),
            _ => Err(anyhow::anyhow!("Invalid player policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    // Game
    pub mode: GameMode,
    pub economic_events: bool,
    pub seed: Option<u64>,
    pub fast_forward: bool,
    pub player_policy: PlayerPolicy,
    pub game: GameConfig,
    pub historical_data_path: Option<String>,

    // Backtest
    pub strategy: Strategy,
    pub backtest_initial_cash: f64,
    pub monte_carlo_runs: usize,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        let mut game = GameConfig::default();
        game.initial_investment = var_or("INITIAL_INVESTMENT", "10000")
            .parse()
            .context("INITIAL_INVESTMENT must be a number")?;
        game.annual_bonus = var_or("ANNUAL_BONUS", "1000")
            .parse()
            .context("ANNUAL_BONUS must be a number")?;

        let action: TradeDirection = var_or("STRATEGY_ACTION", "buy")
            .parse()
            .context("STRATEGY_ACTION")?;
        let timing: TradeTiming = var_or("STRATEGY_TIMING", "monthly")
            .parse()
            .context("STRATEGY_TIMING")?;
        let amount: f64 = var_or("STRATEGY_AMOUNT", "500")
            .parse()
            .context("STRATEGY_AMOUNT must be a number")?;
        let frequency: u32 = var_or("STRATEGY_FREQUENCY", "1")
            .parse()
            .context("STRATEGY_FREQUENCY must be a positive integer")?;

        let config = Self {
            mode: var_or("GAME_MODE", "classic").parse().context("GAME_MODE")?,
            economic_events: var_or("ECONOMIC_EVENTS", "true")
                .parse()
                .context("ECONOMIC_EVENTS must be true or false")?,
            seed: env::var("GAME_SEED")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .context("GAME_SEED must be an unsigned integer")?,
            fast_forward: var_or("FAST_FORWARD", "true")
                .parse()
                .context("FAST_FORWARD must be true or false")?,
            player_policy: var_or("PLAYER_POLICY", "hold").parse()?,
            game,
            historical_data_path: env::var("HISTORICAL_DATA_PATH").ok(),
            strategy: Strategy::new(action, amount, timing, frequency).context("invalid strategy")?,
            backtest_initial_cash: var_or("BACKTEST_INITIAL_CASH", "10000")
                .parse()
                .context("BACKTEST_INITIAL_CASH must be a number")?,
            monte_carlo_runs: var_or("MONTE_CARLO_RUNS", "500")
                .parse()
                .context("MONTE_CARLO_RUNS must be an unsigned integer")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.game.validate().context("invalid game configuration")?;
        if !(self.backtest_initial_cash > 0.0) {
            bail!("BACKTEST_INITIAL_CASH must be positive");
        }
        Ok(())
    }
}
