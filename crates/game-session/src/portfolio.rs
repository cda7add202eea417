//! Active and passive portfolios as pure reducers.
//!
//! Both reducers take the old state and an action and return the new state.
//! Prices are looked up per symbol; a symbol without a price is left
//! untouched by trading actions.

use std::collections::BTreeMap;

use market_core::PriceMap;
use serde::{Deserialize, Serialize};

/// Holdings in one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub shares: f64,
    pub cash: f64,
}

impl Position {
    pub fn new(shares: f64, cash: f64) -> Self {
        Self { shares, cash }
    }

    pub fn value(&self, price: f64) -> f64 {
        self.shares * price + self.cash
    }
}

/// Positions that put `amount` to work split evenly across every priced
/// symbol, fully invested.
pub fn fully_invested_positions(prices: &PriceMap, amount: f64) -> BTreeMap<String, Position> {
    let per_symbol = amount / prices.len().max(1) as f64;
    prices
        .iter()
        .map(|(symbol, price)| (symbol.clone(), Position::new(per_symbol / price, 0.0)))
        .collect()
}

/// Player-controlled portfolio: each symbol may sit in shares, cash or both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivePortfolio {
    pub positions: BTreeMap<String, Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActiveAction<'a> {
    /// Replace the state wholesale
    Init(BTreeMap<String, Position>),
    /// Convert all cash to shares
    BuyAll(&'a PriceMap),
    /// Convert all shares to cash
    SellAll(&'a PriceMap),
    /// New contribution split evenly; invested only where already invested
    AddAnnualBonus { prices: &'a PriceMap, amount: f64 },
}

impl ActivePortfolio {
    pub fn total_value(&self, prices: &PriceMap) -> f64 {
        self.positions
            .iter()
            .map(|(symbol, pos)| pos.value(prices.get(symbol).copied().unwrap_or(0.0)))
            .sum()
    }

    pub fn total_cash(&self) -> f64 {
        self.positions.values().map(|p| p.cash).sum()
    }

    pub fn can_buy(&self) -> bool {
        self.positions.values().any(|p| p.cash > 0.0)
    }

    pub fn can_sell(&self) -> bool {
        self.positions.values().any(|p| p.shares > 0.0)
    }
}

pub fn reduce_active(state: &ActivePortfolio, action: ActiveAction<'_>) -> ActivePortfolio {
    match action {
        ActiveAction::Init(positions) => ActivePortfolio { positions },
        ActiveAction::BuyAll(prices) => map_priced(state, prices, |pos, price| {
            if pos.cash > 0.0 {
                Position::new(pos.shares + pos.cash / price, 0.0)
            } else {
                pos
            }
        }),
        ActiveAction::SellAll(prices) => map_priced(state, prices, |pos, price| {
            if pos.shares > 0.0 {
                Position::new(0.0, pos.cash + pos.shares * price)
            } else {
                pos
            }
        }),
        ActiveAction::AddAnnualBonus { prices, amount } => {
            let per_symbol = amount / state.positions.len().max(1) as f64;
            let positions = state
                .positions
                .iter()
                .map(|(symbol, pos)| {
                    let next = match prices.get(symbol) {
                        Some(&price) if pos.shares > 0.0 && price > 0.0 => {
                            Position::new(pos.shares + per_symbol / price, pos.cash)
                        }
                        // no usable price: the contribution waits as cash
                        _ => Position::new(pos.shares, pos.cash + per_symbol),
                    };
                    (symbol.clone(), next)
                })
                .collect();
            ActivePortfolio { positions }
        }
    }
}

fn map_priced(
    state: &ActivePortfolio,
    prices: &PriceMap,
    f: impl Fn(Position, f64) -> Position,
) -> ActivePortfolio {
    let positions = state
        .positions
        .iter()
        .map(|(symbol, pos)| {
            let next = match prices.get(symbol) {
                Some(&price) if price > 0.0 => f(*pos, price),
                _ => *pos,
            };
            (symbol.clone(), next)
        })
        .collect();
    ActivePortfolio { positions }
}

/// Buy-and-hold baseline: shares only, never cash.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PassivePortfolio {
    pub shares: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassiveAction<'a> {
    Init(BTreeMap<String, f64>),
    /// New contribution split evenly, always bought immediately
    AddAnnualBonus { prices: &'a PriceMap, amount: f64 },
}

impl PassivePortfolio {
    pub fn total_value(&self, prices: &PriceMap) -> f64 {
        self.shares
            .iter()
            .map(|(symbol, shares)| shares * prices.get(symbol).copied().unwrap_or(0.0))
            .sum()
    }
}

pub fn reduce_passive(state: &PassivePortfolio, action: PassiveAction<'_>) -> PassivePortfolio {
    match action {
        PassiveAction::Init(shares) => PassivePortfolio { shares },
        PassiveAction::AddAnnualBonus { prices, amount } => {
            let per_symbol = amount / state.shares.len().max(1) as f64;
            let shares = state
                .shares
                .iter()
                .map(|(symbol, held)| {
                    let next = match prices.get(symbol) {
                        Some(&price) if price > 0.0 => held + per_symbol / price,
                        _ => *held,
                    };
                    (symbol.clone(), next)
                })
                .collect();
            PassivePortfolio { shares }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prices(pairs: &[(&str, f64)]) -> PriceMap {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn active(pairs: &[(&str, f64, f64)]) -> ActivePortfolio {
        ActivePortfolio {
            positions: pairs
                .iter()
                .map(|(s, shares, cash)| (s.to_string(), Position::new(*shares, *cash)))
                .collect(),
        }
    }

    #[test]
    fn test_sell_then_buy_round_trip() {
        let p = prices(&[("SPY", 100.0)]);
        let start = active(&[("SPY", 10.0, 0.0)]);

        let sold = reduce_active(&start, ActiveAction::SellAll(&p));
        assert_eq!(sold.positions["SPY"], Position::new(0.0, 1000.0));
        assert!(sold.can_buy());
        assert!(!sold.can_sell());

        let bought = reduce_active(&sold, ActiveAction::BuyAll(&p));
        assert_eq!(bought.positions["SPY"], Position::new(10.0, 0.0));
    }

    #[test]
    fn test_buy_and_sell_preserve_value() {
        let p = prices(&[("SPY", 412.37), ("QQQ", 97.13), ("TLT", 88.8)]);
        let start = active(&[("SPY", 3.3, 120.0), ("QQQ", 0.0, 500.0), ("TLT", 7.1, 0.0)]);
        let before = start.total_value(&p);

        let bought = reduce_active(&start, ActiveAction::BuyAll(&p));
        assert_relative_eq!(bought.total_value(&p), before, epsilon = 1e-9);
        assert!(!bought.can_buy());

        let sold = reduce_active(&bought, ActiveAction::SellAll(&p));
        assert_relative_eq!(sold.total_value(&p), before, epsilon = 1e-9);
        assert!(!sold.can_sell());
    }

    #[test]
    fn test_untouched_symbols() {
        let p = prices(&[("SPY", 100.0), ("QQQ", 50.0)]);
        let start = active(&[("SPY", 5.0, 0.0), ("QQQ", 0.0, 200.0)]);

        let bought = reduce_active(&start, ActiveAction::BuyAll(&p));
        assert_eq!(bought.positions["SPY"], Position::new(5.0, 0.0));
        assert_eq!(bought.positions["QQQ"], Position::new(4.0, 0.0));

        let missing_price = prices(&[("SPY", 100.0)]);
        let sold = reduce_active(&start, ActiveAction::SellAll(&missing_price));
        assert_eq!(sold.positions["QQQ"], Position::new(0.0, 200.0));
        assert_eq!(sold.positions["SPY"], Position::new(0.0, 500.0));
    }

    #[test]
    fn test_active_bonus_invests_only_where_invested() {
        let p = prices(&[("SPY", 100.0), ("QQQ", 50.0)]);
        let start = active(&[("SPY", 10.0, 0.0), ("QQQ", 0.0, 300.0)]);
        let before = start.total_value(&p);

        let next = reduce_active(&start, ActiveAction::AddAnnualBonus { prices: &p, amount: 1000.0 });

        assert_relative_eq!(next.positions["SPY"].shares, 15.0);
        assert_eq!(next.positions["SPY"].cash, 0.0);
        assert_eq!(next.positions["QQQ"], Position::new(0.0, 800.0));
        assert_relative_eq!(next.total_value(&p), before + 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_active_bonus_credited_without_price() {
        let start = active(&[("SPY", 10.0, 0.0), ("QQQ", 0.0, 300.0)]);
        let spy_only = prices(&[("SPY", 100.0)]);

        let next = reduce_active(
            &start,
            ActiveAction::AddAnnualBonus { prices: &spy_only, amount: 1000.0 },
        );

        assert_relative_eq!(next.positions["SPY"].shares, 15.0);
        assert_eq!(next.positions["QQQ"], Position::new(0.0, 800.0));
        assert_relative_eq!(next.total_cash() + 15.0 * 100.0, 2300.0);
    }

    #[test]
    fn test_passive_bonus_always_buys() {
        let p = prices(&[("SPY", 400.0), ("GLD", 180.0)]);
        let start = PassivePortfolio {
            shares: [("SPY".to_string(), 2.0), ("GLD".to_string(), 1.0)].into_iter().collect(),
        };
        let before = start.total_value(&p);

        let next = reduce_passive(&start, PassiveAction::AddAnnualBonus { prices: &p, amount: 1000.0 });

        assert_relative_eq!(next.shares["SPY"], 2.0 + 500.0 / 400.0);
        assert_relative_eq!(next.total_value(&p), before + 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_init_replaces_state() {
        let p = prices(&[("SPY", 200.0), ("QQQ", 100.0)]);
        let positions = fully_invested_positions(&p, 10_000.0);
        let state = reduce_active(&active(&[("OLD", 1.0, 1.0)]), ActiveAction::Init(positions));

        assert!(!state.positions.contains_key("OLD"));
        assert_relative_eq!(state.positions["SPY"].shares, 25.0);
        assert_relative_eq!(state.positions["QQQ"].shares, 50.0);
        assert_relative_eq!(state.total_value(&p), 10_000.0);
        assert_eq!(state.total_cash(), 0.0);
    }
}
