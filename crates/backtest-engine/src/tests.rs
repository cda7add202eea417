use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::{Months, NaiveDate};
use market_core::{GameError, PricePoint};
use price_generator::InstrumentProfile;

use crate::engine::*;
use crate::models::*;
use crate::monte_carlo::run_strategy_monte_carlo;

/// Helper: monthly points on `day` of each month starting January 2020.
fn series(day: u32, values: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| PricePoint::new(start.checked_add_months(Months::new(i as u32)).unwrap(), *v))
        .collect()
}

/// Helper: a buy strategy.
fn buy(amount: f64, timing: TradeTiming, frequency: u32) -> Strategy {
    Strategy::new(TradeDirection::Buy, amount, timing, frequency).unwrap()
}

#[test]
fn test_flat_series_monthly_buys() {
    let prices = series(1, &[100.0; 12]);
    let result = calculate_portfolio_performance(&prices, &buy(1000.0, TradeTiming::Monthly, 1), 5500.0).unwrap();

    // Five full buys fit in 5,500; the remaining 500 never covers a trigger.
    assert_eq!(result.trades.len(), 5);
    assert_relative_eq!(result.final_shares, 50.0);
    assert_relative_eq!(result.final_cash, 500.0);
    assert_relative_eq!(result.final_value, 5500.0);
    assert_abs_diff_eq!(result.total_return_percent, 0.0, epsilon = 1e-9);
    assert_eq!(result.portfolio_history.len(), 12);

    let baseline = calculate_buy_and_hold(&prices, 5500.0).unwrap();
    assert_eq!(baseline.total_return_percent, 0.0);
}

#[test]
fn test_buy_shares_follow_price() {
    let prices = series(1, &[100.0, 50.0, 200.0, 80.0]);
    let result = calculate_portfolio_performance(&prices, &buy(100.0, TradeTiming::Monthly, 1), 1000.0).unwrap();

    let expected_shares = 100.0 / 100.0 + 100.0 / 50.0 + 100.0 / 200.0 + 100.0 / 80.0;
    assert_relative_eq!(result.final_shares, expected_shares);
    assert_relative_eq!(result.final_cash, 600.0);
    assert_relative_eq!(result.final_value, 600.0 + expected_shares * 80.0);
    assert_relative_eq!(result.trades[1].shares, 2.0);
    assert_relative_eq!(result.trades[3].cash_after, 600.0);
}

#[test]
fn test_monthly_frequency() {
    let prices = series(10, &[100.0; 10]);
    let result = calculate_portfolio_performance(&prices, &buy(100.0, TradeTiming::Monthly, 3), 10_000.0).unwrap();

    let trade_months: Vec<NaiveDate> = result.trades.iter().map(|t| t.date).collect();
    assert_eq!(trade_months, vec![prices[0].date, prices[3].date, prices[6].date, prices[9].date]);
}

#[test]
fn test_day_of_month_timing() {
    let strategy_first = buy(100.0, TradeTiming::First, 1);
    let strategy_middle = buy(100.0, TradeTiming::Middle, 1);
    let strategy_last = buy(100.0, TradeTiming::Last, 1);

    let d = |day| NaiveDate::from_ymd_opt(2023, 3, day).unwrap();
    assert!(should_execute_trade(d(5), &strategy_first, 7));
    assert!(!should_execute_trade(d(6), &strategy_first, 0));
    assert!(should_execute_trade(d(13), &strategy_middle, 0));
    assert!(should_execute_trade(d(17), &strategy_middle, 0));
    assert!(!should_execute_trade(d(18), &strategy_middle, 0));
    assert!(should_execute_trade(d(25), &strategy_last, 0));
    assert!(!should_execute_trade(d(24), &strategy_last, 0));

    // Every point falls on the 15th, so only the middle strategy trades.
    let prices = series(15, &[100.0; 6]);
    let first = calculate_portfolio_performance(&prices, &strategy_first, 10_000.0).unwrap();
    let middle = calculate_portfolio_performance(&prices, &strategy_middle, 10_000.0).unwrap();
    assert!(first.trades.is_empty());
    assert_eq!(middle.trades.len(), 6);
}

#[test]
fn test_sell_is_capped_at_shares_held() {
    let prices = series(1, &[100.0, 100.0, 100.0, 100.0]);
    let strategy = Strategy::new(TradeDirection::Sell, 1000.0, TradeTiming::Monthly, 1).unwrap();
    let result = BacktestEngine::new(strategy, 100.0)
        .unwrap()
        .with_initial_shares(15.0)
        .run(&prices)
        .unwrap();

    assert_eq!(result.trades.len(), 2);
    assert_relative_eq!(result.trades[0].shares, 10.0);
    assert_relative_eq!(result.trades[1].shares, 5.0);
    assert_relative_eq!(result.trades[1].amount, 500.0);
    assert_eq!(result.final_shares, 0.0);
    assert_relative_eq!(result.final_cash, 1600.0);
    assert_abs_diff_eq!(result.total_return_percent, 0.0, epsilon = 1e-9);
}

#[test]
fn test_sell_without_shares_never_trades() {
    let prices = series(1, &[100.0, 110.0, 120.0]);
    let strategy = Strategy::new(TradeDirection::Sell, 500.0, TradeTiming::Monthly, 1).unwrap();
    let result = calculate_portfolio_performance(&prices, &strategy, 2000.0).unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.final_cash, 2000.0);
    assert_eq!(result.portfolio_history.len(), 3);
}

#[test]
fn test_history_tracks_returns() {
    let prices = series(1, &[100.0, 120.0, 90.0]);
    let result = calculate_buy_and_hold(&prices, 1000.0).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_relative_eq!(result.portfolio_history[1].value, 1200.0);
    assert_relative_eq!(result.portfolio_history[1].return_percent, 20.0);
    assert_relative_eq!(result.total_return, -100.0);
    assert_relative_eq!(result.total_return_percent, -10.0);
}

#[test]
fn test_compare_to_buy_and_hold() {
    // Dollar-cost averaging into a falling market beats a lump sum.
    let prices = series(1, &[100.0, 80.0, 60.0, 50.0]);
    let comparison = compare_to_buy_and_hold(&prices, &buy(250.0, TradeTiming::Monthly, 1), 1000.0).unwrap();

    assert!(comparison.beat_buy_and_hold);
    assert_relative_eq!(comparison.buy_hold_return_percent, -50.0);
    assert!(comparison.alpha > 0.0);
}

#[test]
fn test_invalid_inputs() {
    let prices = series(1, &[100.0, 101.0]);
    let strategy = buy(100.0, TradeTiming::Monthly, 1);

    assert_eq!(
        calculate_portfolio_performance(&[], &strategy, 1000.0),
        Err(GameError::EmptySeries)
    );
    assert!(calculate_portfolio_performance(&prices, &strategy, 0.0).is_err());
    assert!(calculate_buy_and_hold(&prices, -1.0).is_err());
    assert!(Strategy::new(TradeDirection::Buy, 0.0, TradeTiming::Monthly, 1).is_err());
    assert!(Strategy::new(TradeDirection::Buy, 10_000.01, TradeTiming::Monthly, 1).is_err());
    assert!(Strategy::new(TradeDirection::Buy, 100.0, TradeTiming::Monthly, 0).is_err());
}

#[test]
fn test_unknown_timing_rejected() {
    assert_eq!("middle".parse::<TradeTiming>().unwrap(), TradeTiming::Middle);
    assert_eq!(
        "weekly".parse::<TradeTiming>(),
        Err(GameError::UnknownTiming("weekly".to_string()))
    );
    assert!(serde_json::from_str::<TradeTiming>("\"weekly\"").is_err());
    assert_eq!("SELL".parse::<TradeDirection>().unwrap(), TradeDirection::Sell);
}

#[test]
fn test_monte_carlo_is_reproducible() {
    let config = MonteCarloConfig {
        simulations: 64,
        months: 120,
        initial_cash: 10_000.0,
        seed: 17,
        end_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
    };
    let strategy = buy(500.0, TradeTiming::Monthly, 1);
    let profile = InstrumentProfile::benchmark(100.0);

    let a = run_strategy_monte_carlo(&strategy, &profile, &config).unwrap();
    let b = run_strategy_monte_carlo(&strategy, &profile, &config).unwrap();

    assert_eq!(a.simulations, 64);
    assert_eq!(a.mean_return, b.mean_return);
    assert_eq!(a.median_return, b.median_return);
    assert!(a.percentile_5 <= a.median_return && a.median_return <= a.percentile_95);
    assert!((0.0..=100.0).contains(&a.probability_beats_buy_hold));
}

#[test]
fn test_monte_carlo_rejects_zero_runs() {
    let config = MonteCarloConfig {
        simulations: 0,
        months: 12,
        initial_cash: 1000.0,
        seed: 1,
        end_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
    };
    let strategy = buy(100.0, TradeTiming::Monthly, 1);
    assert!(run_strategy_monte_carlo(&strategy, &InstrumentProfile::benchmark(100.0), &config).is_err());
}
