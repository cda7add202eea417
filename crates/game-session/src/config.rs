use market_core::{GameError, GameMode};
use serde::{Deserialize, Serialize};

/// Length and pacing of one game mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeSettings {
    /// Number of month transitions in a game
    pub length_months: u32,
    /// Delay between ticks of the driving loop
    pub tick_interval_ms: u64,
}

/// Game-wide tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Cash put to work at month 0, split evenly across symbols
    pub initial_investment: f64,
    /// Contribution added at every 12-month boundary
    pub annual_bonus: f64,
    /// Opening price of synthetic instruments in single-index modes
    pub start_price: f64,
    pub classic: ModeSettings,
    pub diversified: ModeSettings,
    pub speedrun: ModeSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_investment: 10_000.0,
            annual_bonus: 1_000.0,
            start_price: 100.0,
            classic: ModeSettings {
                length_months: 240,
                tick_interval_ms: 1000,
            },
            diversified: ModeSettings {
                length_months: 240,
                tick_interval_ms: 1000,
            },
            speedrun: ModeSettings {
                length_months: 120,
                tick_interval_ms: 300,
            },
        }
    }
}

impl GameConfig {
    pub fn mode_settings(&self, mode: GameMode) -> ModeSettings {
        match mode {
            GameMode::Classic => self.classic,
            GameMode::Diversified => self.diversified,
            GameMode::Speedrun => self.speedrun,
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(self.initial_investment > 0.0) {
            return Err(GameError::InvalidInput(format!(
                "initial investment must be positive, got {}",
                self.initial_investment
            )));
        }
        if !(self.annual_bonus >= 0.0) {
            return Err(GameError::InvalidInput(format!(
                "annual bonus cannot be negative, got {}",
                self.annual_bonus
            )));
        }
        if !(self.start_price > 0.0) {
            return Err(GameError::InvalidInput(format!(
                "start price must be positive, got {}",
                self.start_price
            )));
        }
        for mode in [GameMode::Classic, GameMode::Diversified, GameMode::Speedrun] {
            let settings = self.mode_settings(mode);
            if settings.length_months == 0 || settings.tick_interval_ms == 0 {
                return Err(GameError::InvalidInput(format!(
                    "{} mode needs a positive length and tick interval",
                    mode
                )));
            }
        }
        Ok(())
    }
}
