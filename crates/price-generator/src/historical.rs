//! Random windows of real monthly index history.

use std::path::Path;

use market_core::{validate_series, GameError, MultiInstrumentPriceSet, PricePoint, PriceSupplier};
use rand::{Rng, RngCore};
use tracing::debug;

/// Supplies contiguous slices of a caller-provided monthly history.
#[derive(Debug, Clone)]
pub struct HistoricalSupplier {
    symbol: String,
    history: Vec<PricePoint>,
}

impl HistoricalSupplier {
    pub fn new(symbol: impl Into<String>, history: Vec<PricePoint>) -> Result<Self, GameError> {
        validate_series(&history)?;
        Ok(Self {
            symbol: symbol.into(),
            history,
        })
    }

    /// Load a JSON array of `{ "date": "YYYY-MM-DD", "value": f64 }` points.
    pub fn from_json_file(symbol: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GameError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
        })?;
        let history: Vec<PricePoint> = serde_json::from_str(&raw).map_err(|e| {
            GameError::InvalidInput(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Self::new(symbol, history)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Uniformly random contiguous window of `months` points.
    pub fn sample_slice<R: Rng + ?Sized>(
        &self,
        months: usize,
        rng: &mut R,
    ) -> Result<Vec<PricePoint>, GameError> {
        if months == 0 {
            return Err(GameError::InvalidInput("months must be at least 1".to_string()));
        }
        if months > self.history.len() {
            return Err(GameError::InvalidInput(format!(
                "requested {} months but history for {} only has {}",
                months,
                self.symbol,
                self.history.len()
            )));
        }

        let start = rng.gen_range(0..=self.history.len() - months);
        debug!(
            "Sampled {} months of {} starting {}",
            months, self.symbol, self.history[start].date
        );
        Ok(self.history[start..start + months].to_vec())
    }
}

impl PriceSupplier for HistoricalSupplier {
    fn supply(
        &self,
        months: usize,
        rng: &mut dyn RngCore,
    ) -> Result<MultiInstrumentPriceSet, GameError> {
        let slice = self.sample_slice(months, rng)?;
        MultiInstrumentPriceSet::single(self.symbol.clone(), slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn history(len: usize) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        (0..len)
            .map(|i| {
                PricePoint::new(
                    start.checked_add_months(Months::new(i as u32)).unwrap(),
                    300.0 + i as f64,
                )
            })
            .collect()
    }

    #[test]
    fn test_slice_is_contiguous_window() {
        let supplier = HistoricalSupplier::new("SPY", history(400)).unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..20 {
            let slice = supplier.sample_slice(120, &mut rng).unwrap();
            assert_eq!(slice.len(), 120);
            assert!(slice.windows(2).all(|w| w[1].value - w[0].value == 1.0));
        }
    }

    #[test]
    fn test_full_length_slice_is_whole_history() {
        let supplier = HistoricalSupplier::new("SPY", history(50)).unwrap();
        let mut rng = StdRng::seed_from_u64(22);
        let slice = supplier.sample_slice(50, &mut rng).unwrap();
        assert_eq!(slice, history(50));
    }

    #[test]
    fn test_too_long_request_rejected() {
        let supplier = HistoricalSupplier::new("SPY", history(50)).unwrap();
        let mut rng = StdRng::seed_from_u64(23);
        assert!(supplier.sample_slice(51, &mut rng).is_err());
        assert!(supplier.sample_slice(0, &mut rng).is_err());
    }

    #[test]
    fn test_bad_history_rejected() {
        let mut points = history(10);
        points[3].value = -1.0;
        assert!(HistoricalSupplier::new("SPY", points).is_err());
        assert_eq!(
            HistoricalSupplier::new("SPY", Vec::new()).unwrap_err(),
            GameError::EmptySeries
        );
    }

    #[test]
    fn test_load_history_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spy_monthly.json");
        std::fs::write(&path, serde_json::to_string(&history(36)).unwrap()).unwrap();

        let supplier = HistoricalSupplier::from_json_file("SPY", &path).unwrap();
        assert_eq!(supplier.history_len(), 36);

        let mut rng = StdRng::seed_from_u64(25);
        let set = supplier.supply(12, &mut rng).unwrap();
        assert_eq!(set.len(), 12);
    }

    #[test]
    fn test_load_history_rejects_bad_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            HistoricalSupplier::from_json_file("SPY", &missing),
            Err(GameError::InvalidInput(_))
        ));

        let malformed = dir.path().join("malformed.json");
        std::fs::write(&malformed, "[{\"date\": \"2020-01-01\", \"value\": }").unwrap();
        assert!(matches!(
            HistoricalSupplier::from_json_file("SPY", &malformed),
            Err(GameError::InvalidInput(_))
        ));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert_eq!(
            HistoricalSupplier::from_json_file("SPY", &empty).unwrap_err(),
            GameError::EmptySeries
        );
    }

    #[test]
    fn test_supply_wraps_single_symbol() {
        let supplier = HistoricalSupplier::new("SPY", history(100)).unwrap();
        let mut rng = StdRng::seed_from_u64(24);
        let set = supplier.supply(25, &mut rng).unwrap();
        assert_eq!(set.len(), 25);
        assert_eq!(set.benchmark(), "SPY");
    }
}
