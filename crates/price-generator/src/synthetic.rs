use chrono::{Months, NaiveDate, Utc};
use market_core::{GameError, MultiInstrumentPriceSet, PricePoint, PriceSupplier, BENCHMARK_SYMBOL};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Mean monthly return of the broad-market model (~10% annualized).
pub const MEAN_MONTHLY_RETURN: f64 = 0.008;
/// Monthly standard deviation of the broad-market model (~15% annualized).
pub const MONTHLY_VOLATILITY: f64 = 0.043;
/// Returns below this are clamped so compounding can never reach zero.
pub const MIN_MONTHLY_RETURN: f64 = -0.5;
/// Smallest price a stored point may carry after rounding.
pub const MIN_PRICE: f64 = 0.01;

/// Return model of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    pub symbol: String,
    pub mean_return: f64,
    pub volatility: f64,
    pub start_price: f64,
}

impl InstrumentProfile {
    pub fn new(symbol: impl Into<String>, mean_return: f64, volatility: f64, start_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            mean_return,
            volatility,
            start_price,
        }
    }

    /// Broad-market index profile.
    pub fn benchmark(start_price: f64) -> Self {
        Self::new(BENCHMARK_SYMBOL, MEAN_MONTHLY_RETURN, MONTHLY_VOLATILITY, start_price)
    }

    fn validate(&self) -> Result<(), GameError> {
        if !(self.start_price > 0.0) || !self.start_price.is_finite() {
            return Err(GameError::InvalidInput(format!(
                "start price for {} must be positive, got {}",
                self.symbol, self.start_price
            )));
        }
        if !(self.volatility >= 0.0) || !self.mean_return.is_finite() {
            return Err(GameError::InvalidInput(format!(
                "invalid return model for {}: mean {}, volatility {}",
                self.symbol, self.mean_return, self.volatility
            )));
        }
        Ok(())
    }
}

/// A generated path together with the draws that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticSeries {
    pub symbol: String,
    /// Stored prices, rounded to cents
    pub points: Vec<PricePoint>,
    /// Unrounded monthly returns; `monthly_returns[0]` is always 0
    pub monthly_returns: Vec<f64>,
}

impl SyntheticSeries {
    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

/// Standard normal draw via the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut u1: f64 = rng.gen();
    while u1 == 0.0 {
        u1 = rng.gen();
    }
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One date per month, the last one being `end_date`.
pub fn monthly_dates(months: usize, end_date: NaiveDate) -> Result<Vec<NaiveDate>, GameError> {
    (0..months)
        .map(|i| {
            let back = (months - 1 - i) as u32;
            end_date.checked_sub_months(Months::new(back)).ok_or_else(|| {
                GameError::InvalidInput(format!("{} months before {} is out of range", back, end_date))
            })
        })
        .collect()
}

/// Generate a path for `profile` whose last point falls on `end_date`.
pub fn generate_profile_series<R: Rng + ?Sized>(
    profile: &InstrumentProfile,
    months: usize,
    end_date: NaiveDate,
    rng: &mut R,
) -> Result<SyntheticSeries, GameError> {
    if months == 0 {
        return Err(GameError::InvalidInput("months must be at least 1".to_string()));
    }
    profile.validate()?;

    let dates = monthly_dates(months, end_date)?;
    let mut points = Vec::with_capacity(months);
    let mut monthly_returns = Vec::with_capacity(months);
    let mut clamped = 0usize;

    let mut price = round_cents(profile.start_price).max(MIN_PRICE);
    for (i, date) in dates.into_iter().enumerate() {
        if i == 0 {
            monthly_returns.push(0.0);
        } else {
            let mut monthly_return = profile.mean_return + standard_normal(rng) * profile.volatility;
            if monthly_return < MIN_MONTHLY_RETURN {
                monthly_return = MIN_MONTHLY_RETURN;
                clamped += 1;
            }
            monthly_returns.push(monthly_return);
            price = round_cents(price * (1.0 + monthly_return)).max(MIN_PRICE);
        }
        points.push(PricePoint::new(date, price));
    }

    if clamped > 0 {
        warn!(
            "{}: clamped {} monthly returns at {:.0}%",
            profile.symbol,
            clamped,
            MIN_MONTHLY_RETURN * 100.0
        );
    }
    debug!(
        "Generated {} months for {} ({:.2} -> {:.2})",
        months,
        profile.symbol,
        points[0].value,
        points[points.len() - 1].value
    );

    Ok(SyntheticSeries {
        symbol: profile.symbol.clone(),
        points,
        monthly_returns,
    })
}

/// Broad-market path of `months` points ending at `end_date`.
pub fn generate_synthetic_series_ending<R: Rng + ?Sized>(
    months: usize,
    start_price: f64,
    end_date: NaiveDate,
    rng: &mut R,
) -> Result<SyntheticSeries, GameError> {
    generate_profile_series(&InstrumentProfile::benchmark(start_price), months, end_date, rng)
}

/// Broad-market path of `months` points ending this month.
pub fn generate_synthetic_series<R: Rng + ?Sized>(
    months: usize,
    start_price: f64,
    rng: &mut R,
) -> Result<SyntheticSeries, GameError> {
    generate_synthetic_series_ending(months, start_price, Utc::now().date_naive(), rng)
}

/// Supplier of synthetic paths for a fixed list of instruments.
#[derive(Debug, Clone)]
pub struct SyntheticSupplier {
    profiles: Vec<InstrumentProfile>,
    benchmark: String,
    end_date: Option<NaiveDate>,
}

impl SyntheticSupplier {
    pub fn new(profiles: Vec<InstrumentProfile>, benchmark: impl Into<String>) -> Result<Self, GameError> {
        let benchmark = benchmark.into();
        if !profiles.iter().any(|p| p.symbol == benchmark) {
            return Err(GameError::UnknownSymbol(benchmark));
        }
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(Self {
            profiles,
            benchmark,
            end_date: None,
        })
    }

    /// Single broad-market index.
    pub fn single(start_price: f64) -> Result<Self, GameError> {
        Self::new(vec![InstrumentProfile::benchmark(start_price)], BENCHMARK_SYMBOL)
    }

    /// Pin the last month instead of ending at today's date.
    pub fn ending_at(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn profiles(&self) -> &[InstrumentProfile] {
        &self.profiles
    }
}

impl PriceSupplier for SyntheticSupplier {
    fn supply(
        &self,
        months: usize,
        rng: &mut dyn RngCore,
    ) -> Result<MultiInstrumentPriceSet, GameError> {
        let end_date = self.end_date.unwrap_or_else(|| Utc::now().date_naive());
        let mut series = BTreeMap::new();
        for profile in &self.profiles {
            let generated = generate_profile_series(profile, months, end_date, &mut *rng)?;
            series.insert(profile.symbol.clone(), generated.into_points());
        }
        MultiInstrumentPriceSet::new(self.benchmark.clone(), series)
    }
}
