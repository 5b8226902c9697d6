//! Labeled numeric series.

use crate::rebase::RebaseError;

/// Ordered sequence of `(label, value)` entries.
///
/// Labels are period labels such as `"2009"` or `"2009-01-01"` and may repeat.
/// A `None` value is a missing observation; present values are always finite.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Series {
    labels: Vec<String>,
    values: Vec<Option<f64>>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from `(label, value)` pairs, keeping their order.
    ///
    /// # Errors
    /// Returns [`RebaseError::NonNumeric`] if any present value is NaN or infinite.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, RebaseError>
    where
        I: IntoIterator<Item = (S, Option<f64>)>,
        S: Into<String>,
    {
        let entries = entries.into_iter();
        let (n_entries, _) = entries.size_hint();
        let mut series = Self {
            labels: Vec::with_capacity(n_entries),
            values: Vec::with_capacity(n_entries),
        };
        for (label, value) in entries {
            series.push(label, value)?;
        }
        Ok(series)
    }

    /// Append an entry at the end of the series.
    ///
    /// # Errors
    /// Returns [`RebaseError::NonNumeric`] if `value` is NaN or infinite.
    pub fn push<S: Into<String>>(
        &mut self,
        label: S,
        value: Option<f64>,
    ) -> Result<(), RebaseError> {
        let label = label.into();
        if let Some(val) = value.filter(|val| !val.is_finite()) {
            return Err(RebaseError::NonNumeric {
                label,
                value: val.to_string(),
            });
        }
        self.labels.push(label);
        self.values.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Iterate over the entries whose label belongs to `period`.
    ///
    /// See [`in_period`] for the matching rule.
    pub fn select<'a>(
        &'a self,
        period: &'a str,
    ) -> impl Iterator<Item = (&'a str, Option<f64>)> {
        self.iter().filter(move |(label, _)| in_period(label, period))
    }

    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|val| val.is_none()).count()
    }

    /// Build a new series with the same labels, applying `f` to every present value.
    ///
    /// # Errors
    /// Returns [`RebaseError::NonNumeric`] for the first entry `f` maps to NaN or infinity.
    pub fn try_map_values<F: Fn(f64) -> f64>(&self, f: F) -> Result<Self, RebaseError> {
        Self::from_entries(self.iter().map(|(label, val)| (label, val.map(&f))))
    }
}

/// Whether `label` belongs to `period`.
///
/// A label belongs to a period when it is equal to it or when it extends it
/// with a `-` separated suffix, so `"2009-03"` and `"2009-03-01"` are both in `"2009"`.
pub fn in_period(label: &str, period: &str) -> bool {
    match label.strip_prefix(period) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}
