//! Per-session event schedule.

use market_core::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::catalog::{CatalogEntry, EconomicEvent, EventCategory, CATALOG};

/// Target number of events in one session.
pub const EVENTS_PER_SESSION: usize = 10;

/// Every session gets one headline from each of these categories.
pub const GUARANTEED_CATEGORIES: [EventCategory; 3] = [
    EventCategory::Election,
    EventCategory::Fed,
    EventCategory::Crisis,
];

/// Pick up to [`EVENTS_PER_SESSION`] events from the built-in catalog and
/// spread them over a game of `game_length_months`.
pub fn select_events_for_session<R: Rng + ?Sized>(
    game_length_months: u32,
    rng: &mut R,
) -> Result<Vec<EconomicEvent>, GameError> {
    select_events_from_catalog(CATALOG, game_length_months, rng)
}

/// Same as [`select_events_for_session`] over an arbitrary catalog.
///
/// Returns fewer events when the catalog runs out. The result is sorted by
/// trigger month; two events may share a month, the engine only releases
/// the first.
pub fn select_events_from_catalog<R: Rng + ?Sized>(
    catalog: &[CatalogEntry],
    game_length_months: u32,
    rng: &mut R,
) -> Result<Vec<EconomicEvent>, GameError> {
    if game_length_months == 0 {
        return Err(GameError::InvalidInput(
            "game length must be at least one month".to_string(),
        ));
    }

    let mut selected: Vec<usize> = Vec::with_capacity(EVENTS_PER_SESSION);
    for category in GUARANTEED_CATEGORIES {
        let candidates: Vec<usize> = (0..catalog.len())
            .filter(|&i| catalog[i].category == category)
            .collect();
        if let Some(&pick) = candidates.choose(rng) {
            selected.push(pick);
        }
    }

    let mut remaining: Vec<usize> = (0..catalog.len())
        .filter(|i| !selected.contains(i))
        .collect();
    remaining.shuffle(rng);
    let needed = EVENTS_PER_SESSION.saturating_sub(selected.len());
    selected.extend(remaining.into_iter().take(needed));

    let bucket_size = game_length_months / EVENTS_PER_SESSION as u32;
    let last_month = game_length_months - 1;

    let mut events: Vec<EconomicEvent> = selected
        .into_iter()
        .enumerate()
        .map(|(slot, index)| {
            let jitter = (rng.gen::<f64>() * 0.8 * bucket_size as f64).floor() as u32;
            let trigger_month = (slot as u32 * bucket_size + jitter).min(last_month);
            catalog[index].schedule_at(trigger_month)
        })
        .collect();

    events.sort_by_key(|e| e.trigger_month);

    debug!(
        "Scheduled {} events over {} months: {:?}",
        events.len(),
        game_length_months,
        events.iter().map(|e| e.trigger_month).collect::<Vec<_>>()
    );

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Sentiment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_schedule_structure_for_240_months() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let events = select_events_for_session(240, &mut rng).unwrap();

            assert_eq!(events.len(), EVENTS_PER_SESSION);
            assert!(events.windows(2).all(|w| w[0].trigger_month <= w[1].trigger_month));
            assert!(events.iter().all(|e| e.trigger_month < 240));
            for category in GUARANTEED_CATEGORIES {
                assert!(events.iter().any(|e| e.category == category));
            }
            let texts: HashSet<&str> = events.iter().map(|e| e.text.as_str()).collect();
            assert_eq!(texts.len(), events.len(), "headline drawn twice");
        }
    }

    #[test]
    fn test_events_spread_across_buckets() {
        let mut rng = StdRng::seed_from_u64(5);
        let events = select_events_for_session(240, &mut rng).unwrap();

        // bucket of 24 months, jitter below 0.8 * 24
        for (slot, event) in events.iter().enumerate() {
            let start = slot as u32 * 24;
            assert!(event.trigger_month >= start && event.trigger_month < start + 20);
        }
    }

    #[test]
    fn test_short_game_clamps_to_last_month() {
        let mut rng = StdRng::seed_from_u64(6);
        let events = select_events_for_session(5, &mut rng).unwrap();

        assert_eq!(events.len(), EVENTS_PER_SESSION);
        assert!(events.iter().all(|e| e.trigger_month == 0));
    }

    #[test]
    fn test_small_catalog_returns_fewer_events() {
        let tiny = [
            CatalogEntry {
                text: "Fed hikes",
                sentiment: Sentiment::Negative,
                category: EventCategory::Fed,
            },
            CatalogEntry {
                text: "Markets rally",
                sentiment: Sentiment::Positive,
                category: EventCategory::Market,
            },
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let events = select_events_from_catalog(&tiny, 120, &mut rng).unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.text == "Fed hikes"));
    }

    #[test]
    fn test_zero_length_game_rejected() {
        let mut rng = StdRng::seed_from_u64(8);
        assert!(select_events_for_session(0, &mut rng).is_err());
    }
}
