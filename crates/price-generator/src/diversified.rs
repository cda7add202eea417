//! Fixed instrument set of the diversified mode.

use chrono::NaiveDate;
use market_core::{GameError, MultiInstrumentPriceSet, PriceSupplier, BENCHMARK_SYMBOL};
use rand::RngCore;

use crate::synthetic::{InstrumentProfile, SyntheticSupplier};

/// Benchmark index plus growth equities, long bonds and gold.
pub fn diversified_profiles() -> Vec<InstrumentProfile> {
    vec![
        InstrumentProfile::benchmark(100.0),
        InstrumentProfile::new("QQQ", 0.010, 0.055, 100.0),
        InstrumentProfile::new("TLT", 0.003, 0.025, 100.0),
        InstrumentProfile::new("GLD", 0.005, 0.040, 100.0),
    ]
}

impl SyntheticSupplier {
    pub fn diversified() -> Result<Self, GameError> {
        SyntheticSupplier::new(diversified_profiles(), BENCHMARK_SYMBOL)
    }
}

/// Aligned `months`-long series for every diversified instrument.
pub fn generate_diversified_set(
    months: usize,
    end_date: NaiveDate,
    rng: &mut dyn RngCore,
) -> Result<MultiInstrumentPriceSet, GameError> {
    SyntheticSupplier::diversified()?
        .ending_at(end_date)
        .supply(months, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_diversified_set_is_aligned() {
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let set = generate_diversified_set(241, end, &mut rng).unwrap();

        assert_eq!(set.symbol_count(), 4);
        assert_eq!(set.benchmark(), BENCHMARK_SYMBOL);
        assert_eq!(set.len(), 241);
        for symbol in ["SPY", "QQQ", "TLT", "GLD"] {
            let series = set.series(symbol).unwrap();
            assert_eq!(series.len(), 241);
            assert_eq!(series[240].date, end);
            assert_eq!(series[0].value, 100.0);
        }
    }

    #[test]
    fn test_instruments_get_independent_paths() {
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let set = generate_diversified_set(60, end, &mut rng).unwrap();

        assert_ne!(set.series("SPY"), set.series("QQQ"));
    }
}
