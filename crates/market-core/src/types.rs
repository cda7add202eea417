use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Symbol every single-instrument game trades, and the benchmark of the
/// diversified set.
pub const BENCHMARK_SYMBOL: &str = "SPY";

/// Latest price per symbol at one month of the game.
pub type PriceMap = BTreeMap<String, f64>;

/// One monthly observation of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Always > 0, it is used as a denominator.
    pub value: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Check the PricePoint contract: non-empty, strictly positive, strictly
/// chronological.
pub fn validate_series(series: &[PricePoint]) -> Result<(), GameError> {
    if series.is_empty() {
        return Err(GameError::EmptySeries);
    }

    for (i, point) in series.iter().enumerate() {
        if !(point.value > 0.0) || !point.value.is_finite() {
            return Err(GameError::NonPositivePrice {
                date: point.date.to_string(),
                price: point.value,
            });
        }
        if i > 0 && series[i - 1].date >= point.date {
            return Err(GameError::MisalignedSeries(format!(
                "dates out of order at index {}: {} then {}",
                i,
                series[i - 1].date,
                point.date
            )));
        }
    }

    Ok(())
}

/// Game modes exposed to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// One index, one-second ticks
    Classic,
    /// Several instruments with a benchmark
    Diversified,
    /// One index, fast ticks, shorter game
    Speedrun,
}

impl GameMode {
    pub fn is_multi_instrument(&self) -> bool {
        matches!(self, GameMode::Diversified)
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Classic => write!(f, "classic"),
            GameMode::Diversified => write!(f, "diversified"),
            GameMode::Speedrun => write!(f, "speedrun"),
        }
    }
}

impl std::str::FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(GameMode::Classic),
            "diversified" => Ok(GameMode::Diversified),
            "speedrun" => Ok(GameMode::Speedrun),
            _ => Err(GameError::InvalidInput(format!("Invalid game mode: {}", s))),
        }
    }
}

/// Aligned monthly series for a fixed set of symbols.
///
/// Index `i` of every series refers to the same month. Construction
/// validates every series and the alignment, so accessors never fail on a
/// valid index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSet")]
pub struct MultiInstrumentPriceSet {
    benchmark: String,
    series: BTreeMap<String, Vec<PricePoint>>,
}

/// Unchecked wire shape; loaded sets go through the same checks as `new`.
#[derive(Deserialize)]
struct RawPriceSet {
    benchmark: String,
    series: BTreeMap<String, Vec<PricePoint>>,
}

impl TryFrom<RawPriceSet> for MultiInstrumentPriceSet {
    type Error = GameError;

    fn try_from(raw: RawPriceSet) -> Result<Self, Self::Error> {
        Self::new(raw.benchmark, raw.series)
    }
}

impl MultiInstrumentPriceSet {
    pub fn new(
        benchmark: impl Into<String>,
        series: BTreeMap<String, Vec<PricePoint>>,
    ) -> Result<Self, GameError> {
        let benchmark = benchmark.into();
        let reference = series
            .get(&benchmark)
            .ok_or_else(|| GameError::UnknownSymbol(benchmark.clone()))?;
        validate_series(reference)?;

        for (symbol, points) in &series {
            validate_series(points)?;
            if points.len() != reference.len() {
                return Err(GameError::MisalignedSeries(format!(
                    "{} has {} points, {} has {}",
                    symbol,
                    points.len(),
                    benchmark,
                    reference.len()
                )));
            }
            if let Some((a, b)) = points
                .iter()
                .zip(reference.iter())
                .find(|(a, b)| a.date != b.date)
            {
                return Err(GameError::MisalignedSeries(format!(
                    "{} has {} where {} has {}",
                    symbol, a.date, benchmark, b.date
                )));
            }
        }

        Ok(Self { benchmark, series })
    }

    /// Wrap a single series as a one-symbol set where the symbol is its own
    /// benchmark.
    pub fn single(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, GameError> {
        let symbol = symbol.into();
        let mut series = BTreeMap::new();
        series.insert(symbol.clone(), points);
        Self::new(symbol, series)
    }

    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }

    pub fn symbol_count(&self) -> usize {
        self.series.len()
    }

    /// Number of months in every series.
    pub fn len(&self) -> usize {
        self.series
            .get(&self.benchmark)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn series(&self, symbol: &str) -> Option<&[PricePoint]> {
        self.series.get(symbol).map(|s| s.as_slice())
    }

    pub fn benchmark_series(&self) -> &[PricePoint] {
        self.series(&self.benchmark).unwrap_or(&[])
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.benchmark_series().get(index).map(|p| p.date)
    }

    /// Prices of every symbol at month `index`.
    pub fn prices_at(&self, index: usize) -> Option<PriceMap> {
        self.series
            .iter()
            .map(|(symbol, points)| points.get(index).map(|p| (symbol.clone(), p.value)))
            .collect()
    }
}
