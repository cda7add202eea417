//! Price Path Generator
//!
//! Monthly price series for the game: synthetic paths drawn from a normal
//! return model, random slices of real history, and the aligned
//! multi-instrument set used by the diversified mode.

pub mod diversified;
pub mod historical;
pub mod stats;
pub mod synthetic;

pub use diversified::{diversified_profiles, generate_diversified_set};
pub use historical::HistoricalSupplier;
pub use stats::SeriesStats;
pub use synthetic::{
    generate_profile_series, generate_synthetic_series, generate_synthetic_series_ending,
    monthly_dates, standard_normal, InstrumentProfile, SyntheticSeries, SyntheticSupplier,
    MEAN_MONTHLY_RETURN, MIN_MONTHLY_RETURN, MIN_PRICE, MONTHLY_VOLATILITY,
};
