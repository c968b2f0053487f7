//! Error types for calendars, time grids and alignment.

use thiserror::Error;

/// Error type for all fallible operations on calendars and time grids.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeError {
    /// A month number outside 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The rejected month number.
        month: u8,
    },

    /// A day number that exceeds the length of its month.
    #[error("invalid day: {day} for month {month} (max {max_day})")]
    InvalidDay {
        /// The rejected day number.
        day: u8,
        /// Month the day was checked against.
        month: u8,
        /// Last valid day of that month.
        max_day: u8,
    },

    /// A date that does not exist in the calendar it was used with,
    /// e.g. February 29 in the no-leap calendar or in a non-leap year.
    #[error("{year:04}-{month:02}-{day:02} does not exist in the {calendar} calendar")]
    InvalidDate {
        /// Year of the rejected date.
        year: i32,
        /// Month of the rejected date.
        month: u8,
        /// Day of the rejected date.
        day: u8,
        /// Name of the calendar that rejected it.
        calendar: String,
    },

    /// A CF calendar attribute this crate does not model.
    #[error("unsupported calendar '{name}'")]
    UnknownCalendar {
        /// The calendar attribute as found in the file.
        name: String,
    },

    /// An epoch string that is not `YYYY-MM-DD`.
    #[error("cannot parse '{value}' as a YYYY-MM-DD date")]
    EpochParse {
        /// The string that failed to parse.
        value: String,
    },

    /// A timestamp alignment name outside `centered`/`end`.
    #[error("unsupported timestamp alignment '{name}'")]
    UnknownAlignment {
        /// The alignment string as found in the manifest.
        name: String,
    },

    /// A day offset that leaves the representable date range.
    #[error("day offset {days} leaves the representable date range")]
    OffsetOutOfRange {
        /// The offending whole-day offset from the epoch.
        days: i64,
    },

    /// A time grid with no samples.
    #[error("time grid has no samples")]
    EmptyGrid,

    /// Offsets that are not finite and strictly increasing.
    #[error("time offsets must be finite and strictly increasing (violated at index {index})")]
    NonIncreasing {
        /// Index of the first offending offset.
        index: usize,
    },

    /// A step was requested from a grid too short to define one.
    #[error("cannot infer a time step from {len} sample(s)")]
    StepUndefined {
        /// Number of samples in the grid.
        len: usize,
    },

    /// Sample spacing that deviates from the grid's nominal step.
    #[error(
        "irregular time spacing: step at index {index} is {found} days, expected {median} days"
    )]
    IrregularSpacing {
        /// Index of the interval that deviates most.
        index: usize,
        /// The deviating interval, in days.
        found: f64,
        /// The median interval of the grid, in days.
        median: f64,
    },

    /// Two grids whose nominal steps differ, e.g. 3-hourly vs 6-hourly.
    #[error("time steps differ: {src} vs {dst} days")]
    StepMismatch {
        /// Step of the source grid, in days.
        src: f64,
        /// Step of the destination grid, in days.
        dst: f64,
    },

    /// Two grids on different calendars.
    #[error("calendars differ: {src} vs {dst}")]
    CalendarMismatch {
        /// Calendar of the source grid.
        src: String,
        /// Calendar of the destination grid.
        dst: String,
    },

    /// A data array whose time axis disagrees with its grid.
    #[error("time axis has {axis_len} samples but the grid has {grid_len}")]
    LengthMismatch {
        /// Length of the array's time axis.
        axis_len: usize,
        /// Number of samples in the time grid.
        grid_len: usize,
    },

    /// A labeled-array operation failed while aligning.
    #[error("grid error: {reason}")]
    Grid {
        /// Underlying labeled-array error, flattened to a message.
        reason: String,
    },
}

impl From<hyetos_grid::GridError> for TimeError {
    fn from(err: hyetos_grid::GridError) -> Self {
        TimeError::Grid {
            reason: err.to_string(),
        }
    }
}
