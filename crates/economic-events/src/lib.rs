//! Economic Events
//!
//! Macro "news" that interrupts a game: a fixed catalog of headlines, the
//! per-session scheduler that spreads a random subset over the timeline, and
//! the engine that releases at most one of them per month.

pub mod catalog;
pub mod engine;
pub mod scheduler;

pub use catalog::{catalog_by_category, CatalogEntry, EconomicEvent, EventCategory, Sentiment, CATALOG};
pub use engine::{next_due_event, EventEngine};
pub use scheduler::{
    select_events_for_session, select_events_from_catalog, EVENTS_PER_SESSION,
    GUARANTEED_CATEGORIES,
};
