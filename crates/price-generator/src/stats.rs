use market_core::PricePoint;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary statistics of a monthly series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesStats {
    pub months: usize,
    pub mean_monthly_return: f64,
    pub monthly_volatility: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
}

impl SeriesStats {
    /// `None` when fewer than two points are available.
    pub fn from_series(points: &[PricePoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let returns: Vec<f64> = points
            .windows(2)
            .map(|w| (w[1].value - w[0].value) / w[0].value)
            .collect();

        let mean_monthly_return = returns.as_slice().mean();
        let monthly_volatility = if returns.len() > 1 {
            returns.as_slice().std_dev()
        } else {
            0.0
        };

        let first = points[0].value;
        let last = points[points.len() - 1].value;

        Some(Self {
            months: points.len(),
            mean_monthly_return,
            monthly_volatility,
            annualized_return: (1.0 + mean_monthly_return).powi(12) - 1.0,
            annualized_volatility: monthly_volatility * 12.0_f64.sqrt(),
            total_return_pct: (last - first) / first * 100.0,
            max_drawdown_pct: max_drawdown_pct(points),
        })
    }
}

fn max_drawdown_pct(points: &[PricePoint]) -> f64 {
    let mut peak = points[0].value;
    let mut max_dd = 0.0_f64;

    for point in points {
        if point.value > peak {
            peak = point.value;
        }
        let dd = (peak - point.value) / peak * 100.0;
        if dd > max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn points(values: &[f64]) -> Vec<PricePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| PricePoint::new(NaiveDate::from_ymd_opt(2021, 1 + i as u32, 1).unwrap(), *v))
            .collect()
    }

    #[test]
    fn test_flat_series() {
        let stats = SeriesStats::from_series(&points(&[100.0, 100.0, 100.0])).unwrap();
        assert_eq!(stats.mean_monthly_return, 0.0);
        assert_eq!(stats.monthly_volatility, 0.0);
        assert_eq!(stats.total_return_pct, 0.0);
        assert_eq!(stats.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_drawdown_and_total_return() {
        let stats = SeriesStats::from_series(&points(&[100.0, 120.0, 90.0, 110.0])).unwrap();
        assert_relative_eq!(stats.max_drawdown_pct, 25.0, epsilon = 1e-9);
        assert_relative_eq!(stats.total_return_pct, 10.0, epsilon = 1e-9);
        assert!(stats.monthly_volatility > 0.0);
    }

    #[test]
    fn test_too_short() {
        assert!(SeriesStats::from_series(&points(&[100.0])).is_none());
    }
}
