//! Monthly game loop state machine.
//!
//! A session owns its price data, both portfolios and its event engine. The
//! driving loop calls [`GameSession::tick`] once per interval; the player's
//! decisions arrive through [`GameSession::buy_all`],
//! [`GameSession::sell_all`] and [`GameSession::dismiss`].

use chrono::{DateTime, NaiveDate, Utc};
use economic_events::{EconomicEvent, EventEngine};
use market_core::{GameError, GameMode, MultiInstrumentPriceSet, PriceMap, PriceSupplier};
use price_generator::SyntheticSupplier;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::portfolio::{
    fully_invested_positions, reduce_active, reduce_passive, ActiveAction, ActivePortfolio,
    PassiveAction, PassivePortfolio,
};
use crate::scoring::{score_game, ScoreCard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Ticking normally
    Running,
    /// Waiting for the player to answer an event
    Paused,
    /// Reached the last month
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Paused => write!(f, "paused"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// What one month transition did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub month: u32,
    pub bonus_applied: bool,
    /// Event that fired this month; the session is now paused
    pub event: Option<EconomicEvent>,
    pub completed: bool,
}

/// State handed to the presentation layer after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: GameMode,
    pub current_month: u32,
    pub length_months: u32,
    pub date: Option<NaiveDate>,
    pub prices: PriceMap,
    pub active_value: f64,
    pub passive_value: f64,
    pub can_buy: bool,
    pub can_sell: bool,
    pub pending_event: Option<EconomicEvent>,
    pub status: SessionStatus,
}

/// One game, from month 0 to `length_months`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    mode: GameMode,
    length_months: u32,
    tick_interval_ms: u64,
    current_month: u32,
    price_data: MultiInstrumentPriceSet,
    active: ActivePortfolio,
    passive: PassivePortfolio,
    events: EventEngine,
    pending_event: Option<EconomicEvent>,
    status: SessionStatus,
    initial_investment: f64,
    annual_bonus: f64,
    total_contributions: f64,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// Start a game on freshly generated synthetic prices.
    pub fn start<R: RngCore>(
        mode: GameMode,
        has_economic_events: bool,
        config: &GameConfig,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let supplier = if mode.is_multi_instrument() {
            SyntheticSupplier::diversified()?
        } else {
            SyntheticSupplier::single(config.start_price)?
        };
        Self::start_with_supplier(mode, has_economic_events, config, &supplier, rng)
    }

    /// Start a game on prices from any supplier (synthetic or historical).
    pub fn start_with_supplier<R: RngCore>(
        mode: GameMode,
        has_economic_events: bool,
        config: &GameConfig,
        supplier: &dyn PriceSupplier,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let length = config.mode_settings(mode).length_months;
        let price_data = supplier.supply(length as usize + 1, rng)?;
        let events = EventEngine::for_session(length, has_economic_events, rng)?;
        Self::new(mode, config, price_data, events)
    }

    /// Build a session on existing price data and schedule.
    ///
    /// The game lasts one month less than the series has points. Both
    /// portfolios start fully invested at month 0, and an event due at
    /// month 0 fires right away.
    pub fn new(
        mode: GameMode,
        config: &GameConfig,
        price_data: MultiInstrumentPriceSet,
        events: EventEngine,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if price_data.len() < 2 {
            return Err(GameError::InvalidInput(format!(
                "a game needs at least two months of prices, got {}",
                price_data.len()
            )));
        }

        let length_months = (price_data.len() - 1) as u32;
        let opening = price_data.prices_at(0).ok_or(GameError::EmptySeries)?;
        let positions = fully_invested_positions(&opening, config.initial_investment);
        let shares = positions
            .iter()
            .map(|(symbol, pos)| (symbol.clone(), pos.shares))
            .collect();

        let mut session = Self {
            id: Uuid::new_v4().to_string(),
            mode,
            length_months,
            tick_interval_ms: config.mode_settings(mode).tick_interval_ms,
            current_month: 0,
            price_data,
            active: reduce_active(&ActivePortfolio::default(), ActiveAction::Init(positions)),
            passive: reduce_passive(&PassivePortfolio::default(), PassiveAction::Init(shares)),
            events,
            pending_event: None,
            status: SessionStatus::Running,
            initial_investment: config.initial_investment,
            annual_bonus: config.annual_bonus,
            total_contributions: config.initial_investment,
            created_at: Utc::now(),
        };

        info!(
            "Started {} session {} ({} months, {} symbols, events {})",
            mode,
            session.id,
            length_months,
            session.price_data.symbol_count(),
            if session.events.is_enabled() { "on" } else { "off" }
        );

        session.check_events();
        Ok(session)
    }

    /// Advance one month: prices, then the annual bonus, then events.
    pub fn tick(&mut self) -> Result<TickOutcome, GameError> {
        match self.status {
            SessionStatus::Paused => return Err(GameError::SessionPaused),
            SessionStatus::Completed => return Err(GameError::SessionCompleted),
            SessionStatus::Running => {}
        }

        self.current_month += 1;
        let month = self.current_month;
        let prices = self.current_prices();

        let bonus_applied = month > 0 && month % 12 == 0;
        if bonus_applied {
            self.active = reduce_active(
                &self.active,
                ActiveAction::AddAnnualBonus {
                    prices: &prices,
                    amount: self.annual_bonus,
                },
            );
            self.passive = reduce_passive(
                &self.passive,
                PassiveAction::AddAnnualBonus {
                    prices: &prices,
                    amount: self.annual_bonus,
                },
            );
            self.total_contributions += self.annual_bonus;
            info!("Month {}: annual bonus of {:.2} added", month, self.annual_bonus);
        }

        let event = if month < self.length_months {
            self.check_events()
        } else {
            None
        };

        let completed = month >= self.length_months;
        if completed {
            self.status = SessionStatus::Completed;
            info!(
                "Session {} completed: player {:.2}, buy-and-hold {:.2}",
                self.id,
                self.active.total_value(&prices),
                self.passive.total_value(&prices)
            );
        } else {
            debug!(
                "Month {}/{}: player {:.2}, buy-and-hold {:.2}",
                month,
                self.length_months,
                self.active.total_value(&prices),
                self.passive.total_value(&prices)
            );
        }

        Ok(TickOutcome {
            month,
            bonus_applied,
            event,
            completed,
        })
    }

    fn check_events(&mut self) -> Option<EconomicEvent> {
        let event = self.events.check_for_events(self.current_month)?;
        info!("Month {}: {} news: {}", self.current_month, event.category, event.text);
        self.pending_event = Some(event.clone());
        self.status = SessionStatus::Paused;
        Some(event)
    }

    /// Move every symbol's cash into shares. Answers a pending event.
    pub fn buy_all(&mut self) -> Result<(), GameError> {
        self.ensure_not_completed()?;
        let prices = self.current_prices();
        self.active = reduce_active(&self.active, ActiveAction::BuyAll(&prices));
        debug!("Month {}: bought in", self.current_month);
        self.resume();
        Ok(())
    }

    /// Move every symbol's shares into cash. Answers a pending event.
    pub fn sell_all(&mut self) -> Result<(), GameError> {
        self.ensure_not_completed()?;
        let prices = self.current_prices();
        self.active = reduce_active(&self.active, ActiveAction::SellAll(&prices));
        debug!("Month {}: sold out", self.current_month);
        self.resume();
        Ok(())
    }

    /// Acknowledge the pending event without trading.
    pub fn dismiss(&mut self) -> Result<EconomicEvent, GameError> {
        let event = self.pending_event.clone().ok_or(GameError::NoPendingEvent)?;
        self.resume();
        Ok(event)
    }

    fn resume(&mut self) {
        if self.status == SessionStatus::Paused {
            self.pending_event = None;
            self.status = SessionStatus::Running;
        }
    }

    fn ensure_not_completed(&self) -> Result<(), GameError> {
        if self.status == SessionStatus::Completed {
            return Err(GameError::SessionCompleted);
        }
        Ok(())
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    pub fn current_month(&self) -> u32 {
        self.current_month
    }

    pub fn length_months(&self) -> u32 {
        self.length_months
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn price_data(&self) -> &MultiInstrumentPriceSet {
        &self.price_data
    }

    pub fn active(&self) -> &ActivePortfolio {
        &self.active
    }

    pub fn passive(&self) -> &PassivePortfolio {
        &self.passive
    }

    pub fn events(&self) -> &EventEngine {
        &self.events
    }

    pub fn pending_event(&self) -> Option<&EconomicEvent> {
        self.pending_event.as_ref()
    }

    pub fn events_triggered(&self) -> usize {
        self.events.fired_count()
    }

    /// Initial investment plus every bonus paid so far.
    pub fn total_contributions(&self) -> f64 {
        self.total_contributions
    }

    pub fn current_prices(&self) -> PriceMap {
        self.price_data
            .prices_at(self.current_month as usize)
            .unwrap_or_default()
    }

    pub fn active_value(&self) -> f64 {
        self.active.total_value(&self.current_prices())
    }

    pub fn passive_value(&self) -> f64 {
        self.passive.total_value(&self.current_prices())
    }

    pub fn can_buy(&self) -> bool {
        self.active.can_buy()
    }

    pub fn can_sell(&self) -> bool {
        self.active.can_sell()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let prices = self.current_prices();
        SessionSnapshot {
            mode: self.mode,
            current_month: self.current_month,
            length_months: self.length_months,
            date: self.price_data.date_at(self.current_month as usize),
            active_value: self.active.total_value(&prices),
            passive_value: self.passive.total_value(&prices),
            prices,
            can_buy: self.can_buy(),
            can_sell: self.can_sell(),
            pending_event: self.pending_event.clone(),
            status: self.status,
        }
    }

    /// Final scorecard; `None` until the session completes.
    pub fn result(&self) -> Option<Result<ScoreCard, GameError>> {
        if !self.is_complete() {
            return None;
        }
        Some(score_game(
            self.initial_investment,
            self.active_value(),
            self.passive_value(),
            self.events_triggered(),
        ))
    }
}
