//! Climatological aggregation: mean diurnal cycles per year with amplitude
//! and peak-hour summaries, and daily resampling of sub-daily fields.
//!
//! Both aggregations group samples by calendar labels resolved through
//! [`hyetos_time::TimeGrid`] and reduce groups in parallel, skipping NaN.

mod daily;
mod diurnal;
mod error;

pub use daily::daily_mean;
pub use diurnal::{DIM_HOUR, DIM_YEAR, DiurnalCycle, diurnal_cycle};
pub use error::ClimatologyError;
