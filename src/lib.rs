//! Rebasing of consumer price index series to a reference year.
//!
//! [`rebase()`] divides a labeled series by the mean of its reference period
//! (`"2009"` by default), so that period averages to 1.0 in the result.

pub mod config;
pub mod data;
pub mod manager;
pub mod rebase;
pub mod series;
pub mod stats;

pub use rebase::{
    Base, REF_PERIOD, RebaseError, Rebaser, base_value, rebase, rebase_2009, rebase_with_base,
};
pub use series::Series;
