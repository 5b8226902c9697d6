//! Rebasing of price index series to a reference period.
//!
//! The base value is the mean of the observed values of the reference period,
//! and every value of the series is divided by it, so the reference period
//! averages to 1.0 in the result.

use crate::config::Config;
use crate::series::Series;
use crate::stats::{Accumulator, AccumulatorReport};
use thiserror::Error;

/// Default reference period.
pub const REF_PERIOD: &str = "2009";

#[derive(Debug, Error, PartialEq)]
pub enum RebaseError {
    #[error("missing reference period {period:?}: no observed values are labeled with it")]
    MissingReference { period: String },

    #[error("degenerate base value {base} for reference period {period:?}")]
    DegenerateBase { period: String, base: f64 },

    #[error("non-numeric value {value:?} for label {label:?}")]
    NonNumeric { label: String, value: String },
}

/// Base value of a series for a reference period.
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub period: String,
    pub stats: AccumulatorReport,
}

impl Base {
    pub fn value(&self) -> f64 {
        self.stats.mean
    }
}

/// Rebase `series` to `period`.
///
/// # Errors
/// See [`base_value`].
pub fn rebase(series: &Series, period: &str) -> Result<Series, RebaseError> {
    Rebaser::new(period).rebase(series)
}

/// Rebase `series` to the default reference period.
pub fn rebase_2009(series: &Series) -> Result<Series, RebaseError> {
    rebase(series, REF_PERIOD)
}

/// Compute the base value of `series` for `period`.
///
/// Missing values are skipped.
///
/// # Errors
/// Returns [`RebaseError::MissingReference`] if the period has no observed values
/// and [`RebaseError::DegenerateBase`] if their mean is zero or overflows.
pub fn base_value(series: &Series, period: &str) -> Result<Base, RebaseError> {
    Rebaser::new(period).base_value(series)
}

/// Divide every present value of `series` by `base`.
///
/// # Errors
/// Returns [`RebaseError::DegenerateBase`] if any quotient is not finite.
pub fn rebase_with_base(series: &Series, base: &Base) -> Result<Series, RebaseError> {
    let base_val = base.value();
    series
        .try_map_values(|val| val / base_val)
        .map_err(|_| RebaseError::DegenerateBase {
            period: base.period.clone(),
            base: base_val,
        })
}

/// Rebase operation with a configured reference period and zero tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebaser {
    period: String,
    zero_tol: f64,
}

impl Rebaser {
    pub fn new<S: Into<String>>(period: S) -> Self {
        Self {
            period: period.into(),
            zero_tol: 0.0,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.ref_period.clone()).with_zero_tol(cfg.zero_tol)
    }

    /// Treat base values with `|base| <= zero_tol` as degenerate.
    pub fn with_zero_tol(mut self, zero_tol: f64) -> Self {
        self.zero_tol = zero_tol;
        self
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn base_value(&self, series: &Series) -> Result<Base, RebaseError> {
        let mut acc = Accumulator::new();
        acc.extend(series.select(&self.period).filter_map(|(_, val)| val));
        let stats = acc.report();

        if stats.n_vals == 0 {
            return Err(RebaseError::MissingReference {
                period: self.period.clone(),
            });
        }
        // A non-finite mean means the running update overflowed.
        if !stats.mean.is_finite() || stats.mean.abs() <= self.zero_tol {
            return Err(RebaseError::DegenerateBase {
                period: self.period.clone(),
                base: stats.mean,
            });
        }

        Ok(Base {
            period: self.period.clone(),
            stats,
        })
    }

    pub fn rebase(&self, series: &Series) -> Result<Series, RebaseError> {
        let base = self.base_value(series)?;
        rebase_with_base(series, &base)
    }
}
