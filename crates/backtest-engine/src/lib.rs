//! Strategy backtests: replay a fixed periodic buy or sell rule over a
//! monthly series and compare it with buy-and-hold.

pub mod models;
pub mod engine;
pub mod monte_carlo;

pub use models::*;
pub use engine::{
    calculate_buy_and_hold, calculate_portfolio_performance, compare_to_buy_and_hold,
    should_execute_trade, BacktestEngine,
};
pub use monte_carlo::run_strategy_monte_carlo;

#[cfg(test)]
mod tests;
