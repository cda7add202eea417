use chrono::{Datelike, NaiveDate};
use market_core::{validate_series, GameError, PricePoint};
use tracing::debug;

use crate::models::*;

/// Whether `strategy` fires at point `index` dated `date`.
pub fn should_execute_trade(date: NaiveDate, strategy: &Strategy, index: usize) -> bool {
    let day = date.day();
    match strategy.timing {
        TradeTiming::First => day <= 5,
        TradeTiming::Middle => (13..=17).contains(&day),
        TradeTiming::Last => day >= 25,
        TradeTiming::Monthly => index % strategy.frequency.max(1) as usize == 0,
    }
}

/// Single forward pass of a periodic strategy over a price series.
///
/// Buys need enough cash for the full amount; sells are capped at the
/// shares held. A trade whose precondition fails is skipped silently and
/// leaves no trade record. Every point still gets a history entry.
pub struct BacktestEngine {
    strategy: Strategy,
    initial_cash: f64,
    initial_shares: f64,
}

impl BacktestEngine {
    pub fn new(strategy: Strategy, initial_cash: f64) -> Result<Self, GameError> {
        strategy.validate()?;
        if !(initial_cash > 0.0) {
            return Err(GameError::InvalidInput(format!(
                "initial cash must be positive, got {}",
                initial_cash
            )));
        }
        Ok(Self {
            strategy,
            initial_cash,
            initial_shares: 0.0,
        })
    }

    /// Start with shares already held, so sell strategies have something to
    /// sell.
    pub fn with_initial_shares(mut self, shares: f64) -> Self {
        self.initial_shares = shares.max(0.0);
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn run(&self, prices: &[PricePoint]) -> Result<PerformanceResult, GameError> {
        validate_series(prices)?;

        let amount = self.strategy.amount_per_trigger;
        let starting_value = self.initial_cash + self.initial_shares * prices[0].value;

        let mut cash = self.initial_cash;
        let mut shares = self.initial_shares;
        let mut trades = Vec::new();
        let mut history = Vec::with_capacity(prices.len());

        for (i, point) in prices.iter().enumerate() {
            let price = point.value;

            if should_execute_trade(point.date, &self.strategy, i) {
                let executed = match self.strategy.action {
                    TradeDirection::Buy if cash >= amount => {
                        let bought = amount / price;
                        cash -= amount;
                        shares += bought;
                        Some((amount, bought))
                    }
                    TradeDirection::Sell if shares > 0.0 => {
                        let sold = (amount / price).min(shares);
                        let proceeds = sold * price;
                        shares -= sold;
                        cash += proceeds;
                        Some((proceeds, sold))
                    }
                    _ => None,
                };

                if let Some((dollars, traded)) = executed {
                    trades.push(TradeRecord {
                        date: point.date,
                        action: self.strategy.action,
                        price,
                        amount: dollars,
                        shares: traded,
                        cash_after: cash,
                        shares_after: shares,
                        portfolio_value: cash + shares * price,
                    });
                }
            }

            let value = cash + shares * price;
            let total_return = value - starting_value;
            history.push(PortfolioHistoryEntry {
                date: point.date,
                price,
                cash,
                shares,
                value,
                total_return,
                return_percent: total_return / starting_value * 100.0,
            });
        }

        debug!(
            "Backtest {} {} every {} trigger: {} trades over {} points",
            self.strategy.action,
            self.strategy.timing,
            self.strategy.frequency,
            trades.len(),
            prices.len()
        );

        Ok(summarize(trades, history))
    }
}

fn summarize(trades: Vec<TradeRecord>, portfolio_history: Vec<PortfolioHistoryEntry>) -> PerformanceResult {
    let (final_cash, final_shares, final_value, total_return, total_return_percent) = portfolio_history
        .last()
        .map(|h| (h.cash, h.shares, h.value, h.total_return, h.return_percent))
        .unwrap_or_default();

    PerformanceResult {
        trades,
        portfolio_history,
        final_cash,
        final_shares,
        final_value,
        total_return,
        total_return_percent,
    }
}

/// Replay `strategy` over `prices` starting from `initial_cash` in cash.
pub fn calculate_portfolio_performance(
    prices: &[PricePoint],
    strategy: &Strategy,
    initial_cash: f64,
) -> Result<PerformanceResult, GameError> {
    BacktestEngine::new(strategy.clone(), initial_cash)?.run(prices)
}

/// Invest everything at the first point and hold to the end.
pub fn calculate_buy_and_hold(
    prices: &[PricePoint],
    initial_cash: f64,
) -> Result<PerformanceResult, GameError> {
    validate_series(prices)?;
    if !(initial_cash > 0.0) {
        return Err(GameError::InvalidInput(format!(
            "initial cash must be positive, got {}",
            initial_cash
        )));
    }

    let first = prices[0];
    let shares = initial_cash / first.value;
    let trades = vec![TradeRecord {
        date: first.date,
        action: TradeDirection::Buy,
        price: first.value,
        amount: initial_cash,
        shares,
        cash_after: 0.0,
        shares_after: shares,
        portfolio_value: initial_cash,
    }];

    let history = prices
        .iter()
        .map(|point| {
            let value = shares * point.value;
            let total_return = value - initial_cash;
            PortfolioHistoryEntry {
                date: point.date,
                price: point.value,
                cash: 0.0,
                shares,
                value,
                total_return,
                return_percent: total_return / initial_cash * 100.0,
            }
        })
        .collect();

    Ok(summarize(trades, history))
}

/// Run the strategy and buy-and-hold on the same series.
pub fn compare_to_buy_and_hold(
    prices: &[PricePoint],
    strategy: &Strategy,
    initial_cash: f64,
) -> Result<BenchmarkComparison, GameError> {
    let strategy_result = calculate_portfolio_performance(prices, strategy, initial_cash)?;
    let baseline = calculate_buy_and_hold(prices, initial_cash)?;

    Ok(BenchmarkComparison {
        strategy_return_percent: strategy_result.total_return_percent,
        buy_hold_return_percent: baseline.total_return_percent,
        alpha: strategy_result.total_return_percent - baseline.total_return_percent,
        beat_buy_and_hold: strategy_result.final_value > baseline.final_value,
    })
}
