//! CF time handling: calendars, epoch-based time grids, and alignment of
//! fields between offset grids.
//!
//! A [`TimeGrid`] is the time axis of one dataset: fractional day offsets
//! from a [`CivilDate`] epoch, resolved in a [`Calendar`], with a
//! [`TimeAlignment`] saying where inside its sampling interval each
//! timestamp sits. [`labels`](TimeGrid::labels) turns the grid into
//! `(year, day-of-year, hour)` tuples for grouping, and [`align_to`]
//! interpolates a field from one grid onto another so variables written on
//! staggered grids can be compared sample by sample.

mod align;
mod calendar;
mod error;
mod grid;

pub use align::align_to;
pub use calendar::{Calendar, CivilDate, NOLEAP_YEAR_DAYS};
pub use error::TimeError;
pub use grid::{TimeAlignment, TimeGrid, TimePoint};
