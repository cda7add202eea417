//! Session-scoped release of scheduled events.

use std::collections::BTreeSet;

use market_core::GameError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::EconomicEvent;
use crate::scheduler::select_events_for_session;

/// First scheduled event due at `month` whose month has not fired yet.
pub fn next_due_event<'a>(
    scheduled: &'a [EconomicEvent],
    fired_months: &BTreeSet<u32>,
    month: u32,
) -> Option<&'a EconomicEvent> {
    if fired_months.contains(&month) {
        return None;
    }
    scheduled.iter().find(|e| e.trigger_month == month)
}

/// Releases a session's scheduled events as the game reaches their months.
///
/// The engine does no polling of its own; the game loop calls
/// [`EventEngine::check_for_events`] once per month transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventEngine {
    enabled: bool,
    scheduled: Vec<EconomicEvent>,
    fired_months: BTreeSet<u32>,
}

impl EventEngine {
    pub fn new(scheduled: Vec<EconomicEvent>) -> Self {
        Self {
            enabled: true,
            scheduled,
            fired_months: BTreeSet::new(),
        }
    }

    /// Engine for a session played with economic events turned off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Schedule a fresh random subset of the catalog for a session.
    pub fn for_session<R: Rng + ?Sized>(
        game_length_months: u32,
        enabled: bool,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if !enabled {
            return Ok(Self::disabled());
        }
        let scheduled = select_events_for_session(game_length_months, rng)?;
        info!("Scheduled {} economic events", scheduled.len());
        Ok(Self::new(scheduled))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn scheduled_events(&self) -> &[EconomicEvent] {
        &self.scheduled
    }

    pub fn fired_months(&self) -> &BTreeSet<u32> {
        &self.fired_months
    }

    pub fn fired_count(&self) -> usize {
        self.fired_months.len()
    }

    /// Return the event due at `current_month`, at most one per month.
    pub fn check_for_events(&mut self, current_month: u32) -> Option<EconomicEvent> {
        if !self.enabled {
            return None;
        }

        let event = next_due_event(&self.scheduled, &self.fired_months, current_month)?.clone();
        self.fired_months.insert(current_month);

        let coinciding = self
            .scheduled
            .iter()
            .filter(|e| e.trigger_month == current_month)
            .count();
        if coinciding > 1 {
            warn!(
                "{} events share month {}, only the first fires",
                coinciding, current_month
            );
        }
        debug!("Event fired at month {}: {}", current_month, event.text);

        Some(event)
    }

    /// Forget which months fired so the same schedule can be replayed.
    pub fn reset(&mut self) {
        self.fired_months.clear();
    }
}
