//! Labeled gridded arrays for climate fields.
//!
//! The central type is [`LabeledArray`]: a dense `f64` array whose axes carry
//! names (`time`, `lat`, `lon`) and coordinate vectors, plus a variable name
//! and physical [`Unit`]. Construction validates the labeling invariants once;
//! selection, unit conversion and reductions all preserve them, so downstream
//! crates can index by name without re-checking shapes.
//!
//! Missing values travel as NaN inside the data. Reductions skip NaN; nothing
//! in this crate drops or fills samples on its own.

mod array;
mod error;
mod schema;
mod select;
mod units;

pub use array::{LabeledArray, nan_extreme, nan_mean};
pub use error::GridError;
pub use schema::{DIM_LAT, DIM_LON, DIM_TIME, canonical_dim, canonicalize_dims};
pub use units::{LinearMap, SECONDS_PER_DAY, Unit};
