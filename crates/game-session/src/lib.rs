//! Game Session
//!
//! The real-time "beat the market" game: a player portfolio and a
//! buy-and-hold portfolio marched month by month over the same prices,
//! interrupted by economic news, and scored against each other at the end.

pub mod config;
pub mod portfolio;
pub mod scoring;
pub mod session;

pub use config::{GameConfig, ModeSettings};
pub use portfolio::{
    fully_invested_positions, reduce_active, reduce_passive, ActiveAction, ActivePortfolio,
    PassiveAction, PassivePortfolio, Position,
};
pub use scoring::{score_game, ScoreCard};
pub use session::{GameSession, SessionSnapshot, SessionStatus, TickOutcome};
