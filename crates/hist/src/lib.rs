//! Histogram accumulation for climate fields.
//!
//! Everything here is built from one primitive: half-open [`BinEdges`] that
//! carry their physical unit, counted into by [`Hist1d`] and [`Hist2d`]
//! accumulators whose merge is associative. On top of that sit the two
//! analyses this workspace runs:
//!
//! - [`joint_histogram`]: chunk-parallel joint counts of precipitation
//!   against temperature, with [`ConditionalCdf`] and quantile curves
//!   derived from them and [`scaling_curve`] as the theoretical reference;
//! - [`intensity_spectrum`]: per-year, per-latitude intensity distributions
//!   of a precipitation field at whatever cadence it arrives in.
//!
//! Accumulators never drop samples silently: out-of-range and non-finite
//! values land in explicit tallies.

mod bins;
mod cdf;
mod error;
mod hist1d;
mod hist2d;
mod intensity;
mod joint;
mod scaling;

pub use bins::{BinEdges, BinLocation, Spacing};
pub use cdf::ConditionalCdf;
pub use error::HistError;
pub use hist1d::Hist1d;
pub use hist2d::{DroppedTally, Hist2d};
pub use intensity::{IntensitySpectrum, intensity_spectrum};
pub use joint::joint_histogram;
pub use scaling::{CC_RATE_PER_K, scaling_curve};
