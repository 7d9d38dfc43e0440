//! Ordinary least-squares trend fitting
//!
//! The fit runs on `x = days since the first bucket`, `y = mentions in the
//! bucket`. The slope's two-sided p-value comes from the Student t
//! distribution with `n - 2` degrees of freedom.

use crate::models::PeriodBucket;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Reasons a series cannot produce a usable fit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendError {
    #[error("Insufficient data points: need at least {0}, got {1}")]
    InsufficientData(usize, usize),

    #[error("Degenerate series: all x values are equal")]
    DegenerateSeries,

    #[error("Fit produced a non-finite value")]
    NonFinite,
}

/// Result type for trend fitting
pub type TrendResult<T> = Result<T, TrendError>;

/// Fitted line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    /// Standard error of the slope
    pub std_err: f64,
    /// Two-sided p-value of the slope
    pub p_value: f64,
}

/// Fit a simple linear regression by ordinary least squares
pub fn ols(points: &[(f64, f64)]) -> TrendResult<LinearFit> {
    let n = points.len();
    if n < 3 {
        return Err(TrendError::InsufficientData(3, n));
    }
    let n_f64 = n as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n_f64;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n_f64;

    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    if sxx <= 0.0 {
        return Err(TrendError::DegenerateSeries);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let sse: f64 = points
        .iter()
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let dof = n_f64 - 2.0;
    let std_err = (sse / dof / sxx).sqrt();
    if !(slope.is_finite() && intercept.is_finite() && std_err.is_finite()) {
        return Err(TrendError::NonFinite);
    }

    let p_value = if std_err == 0.0 {
        if slope == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        let t = slope / std_err;
        let dist = StudentsT::new(0.0, 1.0, dof).map_err(|_| TrendError::NonFinite)?;
        (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)
    };

    if !p_value.is_finite() {
        return Err(TrendError::NonFinite);
    }

    Ok(LinearFit {
        intercept,
        slope,
        std_err,
        p_value,
    })
}

/// Per-phrase trend estimation over a dense bucket series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendEstimator {
    /// Series with fewer nonzero buckets carry no trend evidence
    pub min_nonzero_buckets: usize,
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self {
            min_nonzero_buckets: 3,
        }
    }
}

impl TrendEstimator {
    /// Fit the series, reporting why it could not be fitted
    pub fn try_estimate(&self, series: &[(PeriodBucket, u64)]) -> TrendResult<LinearFit> {
        let nonzero = series.iter().filter(|(_, c)| *c > 0).count();
        let total: u64 = series.iter().map(|(_, c)| c).sum();
        if total == 0 || nonzero < self.min_nonzero_buckets {
            return Err(TrendError::InsufficientData(self.min_nonzero_buckets, nonzero));
        }

        let Some((origin, _)) = series.first() else {
            return Err(TrendError::InsufficientData(self.min_nonzero_buckets, 0));
        };
        let points: Vec<(f64, f64)> = series
            .iter()
            .map(|(bucket, count)| {
                let days = (bucket.start() - origin.start()).num_seconds() as f64 / 86_400.0;
                (days, *count as f64)
            })
            .collect();
        ols(&points)
    }

    /// `(slope, p_value)`; any failure yields `(0.0, 1.0)`
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use trendline::analytics::regression::TrendEstimator;
    /// use trendline::models::PeriodBucket;
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let series: Vec<_> = [0u64, 4, 0, 0]
    ///     .iter()
    ///     .enumerate()
    ///     .map(|(i, c)| (PeriodBucket::from_start(start + Duration::weeks(i as i64)), *c))
    ///     .collect();
    ///
    /// assert_eq!(TrendEstimator::default().estimate(&series), (0.0, 1.0));
    /// ```
    #[must_use]
    pub fn estimate(&self, series: &[(PeriodBucket, u64)]) -> (f64, f64) {
        match self.try_estimate(series) {
            Ok(fit) => (fit.slope, fit.p_value),
            Err(e) => {
                if !matches!(e, TrendError::InsufficientData(..)) {
                    tracing::debug!(error = %e, "Trend fit failed, treating as no evidence");
                }
                (0.0, 1.0)
            }
        }
    }
}
