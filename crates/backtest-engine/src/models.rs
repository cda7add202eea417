use chrono::NaiveDate;
use market_core::GameError;
use serde::{Deserialize, Serialize};

/// Largest amount a strategy may trade per trigger.
pub const MAX_AMOUNT_PER_TRIGGER: f64 = 10_000.0;

/// Side a periodic strategy trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for TradeDirection {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(TradeDirection::Buy),
            "sell" => Ok(TradeDirection::Sell),
            _ => Err(GameError::InvalidInput(format!("Invalid trade action: {}", s))),
        }
    }
}

/// When within the series a strategy fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeTiming {
    /// Day of month 1-5
    First,
    /// Day of month 13-17
    Middle,
    /// Day of month 25 or later
    Last,
    /// Every `frequency`-th point
    Monthly,
}

impl std::fmt::Display for TradeTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeTiming::First => write!(f, "first"),
            TradeTiming::Middle => write!(f, "middle"),
            TradeTiming::Last => write!(f, "last"),
            TradeTiming::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for TradeTiming {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(TradeTiming::First),
            "middle" => Ok(TradeTiming::Middle),
            "last" => Ok(TradeTiming::Last),
            "monthly" => Ok(TradeTiming::Monthly),
            _ => Err(GameError::UnknownTiming(s.to_string())),
        }
    }
}

/// Fixed periodic trading rule replayed by the backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub action: TradeDirection,
    pub amount_per_trigger: f64,
    pub timing: TradeTiming,
    pub frequency: u32,
}

impl Strategy {
    pub fn new(
        action: TradeDirection,
        amount_per_trigger: f64,
        timing: TradeTiming,
        frequency: u32,
    ) -> Result<Self, GameError> {
        let strategy = Self {
            action,
            amount_per_trigger,
            timing,
            frequency,
        };
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(self.amount_per_trigger > 0.0) || self.amount_per_trigger > MAX_AMOUNT_PER_TRIGGER {
            return Err(GameError::InvalidInput(format!(
                "amount per trigger must be in (0, {}], got {}",
                MAX_AMOUNT_PER_TRIGGER, self.amount_per_trigger
            )));
        }
        if self.frequency == 0 {
            return Err(GameError::InvalidInput(
                "frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A trade that actually executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub action: TradeDirection,
    pub price: f64,
    /// Dollar value transacted
    pub amount: f64,
    /// Shares transacted
    pub shares: f64,
    pub cash_after: f64,
    pub shares_after: f64,
    pub portfolio_value: f64,
}

/// Portfolio state after processing one price point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHistoryEntry {
    pub date: NaiveDate,
    pub price: f64,
    pub cash: f64,
    pub shares: f64,
    pub value: f64,
    /// Value minus starting value
    pub total_return: f64,
    pub return_percent: f64,
}

/// Result of replaying a strategy over a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub trades: Vec<TradeRecord>,
    pub portfolio_history: Vec<PortfolioHistoryEntry>,
    pub final_cash: f64,
    pub final_shares: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub total_return_percent: f64,
}

/// Strategy against buy-and-hold on the same series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub strategy_return_percent: f64,
    pub buy_hold_return_percent: f64,
    /// Strategy return - buy-and-hold return.
    pub alpha: f64,
    pub beat_buy_and_hold: bool,
}

// --- Monte Carlo Simulation ---

/// Configuration for replaying a strategy over many synthetic paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub simulations: usize,
    pub months: usize,
    pub initial_cash: f64,
    pub seed: u64,
    /// Last date of every generated path
    pub end_date: NaiveDate,
}

/// Distribution of outcomes across simulated paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub simulations: usize,
    pub mean_return: f64,
    pub median_return: f64,
    pub std_dev_return: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub mean_buy_hold_return: f64,
    pub mean_alpha: f64,
    pub probability_of_profit: f64,
    /// Share of paths where the strategy finished above buy-and-hold.
    pub probability_beats_buy_hold: f64,
}
