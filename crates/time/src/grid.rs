//! Time grids: sample offsets tied to an epoch, a calendar and an alignment.

use crate::calendar::{Calendar, CivilDate};
use crate::error::TimeError;

/// Relative tolerance for treating sample spacing as regular.
pub(crate) const SPACING_REL_TOL: f64 = 1e-3;

/// Where inside its sampling interval a timestamp sits.
///
/// CMIP6 writes interval means with centered timestamps (a 3-hourly mean
/// over 00-03 is stamped 01:30) while some products stamp the interval end.
/// The distinction matters when turning offsets into hour-of-day labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeAlignment {
    /// Timestamp at the middle of the sampling interval.
    Centered,
    /// Timestamp at the end of the sampling interval.
    End,
}

impl TimeAlignment {
    /// Parses the alignment names used in manifests.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownAlignment`] for strings outside
    /// `centered`/`end`.
    pub fn parse(name: &str) -> Result<Self, TimeError> {
        match name.trim() {
            "centered" | "center" | "mid" => Ok(TimeAlignment::Centered),
            "end" => Ok(TimeAlignment::End),
            other => Err(TimeError::UnknownAlignment {
                name: other.to_string(),
            }),
        }
    }

    /// Name used in manifests and logs.
    pub fn name(&self) -> &'static str {
        match self {
            TimeAlignment::Centered => "centered",
            TimeAlignment::End => "end",
        }
    }
}

/// A single sample resolved to calendar labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint {
    /// Calendar year.
    pub year: i32,
    /// Day of year, 1-based.
    pub doy: u16,
    /// Hour of day, 0..=23, truncated from the sub-day part of the offset.
    pub hour: u8,
}

/// The time axis of a dataset: fractional day offsets from an epoch, plus
/// the calendar and alignment needed to interpret them.
///
/// Offsets are always in days; loaders convert `hours since` and
/// `seconds since` units before building a grid. Offsets are validated to be
/// finite and strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    offsets: Vec<f64>,
    epoch: CivilDate,
    calendar: Calendar,
    alignment: TimeAlignment,
}

impl TimeGrid {
    /// Builds a time grid.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::EmptyGrid`] for an empty offset vector and
    /// [`TimeError::NonIncreasing`] when offsets are not finite and strictly
    /// increasing.
    pub fn new(
        offsets: Vec<f64>,
        epoch: CivilDate,
        calendar: Calendar,
        alignment: TimeAlignment,
    ) -> Result<Self, TimeError> {
        if offsets.is_empty() {
            return Err(TimeError::EmptyGrid);
        }
        for (i, pair) in offsets.windows(2).enumerate() {
            if !pair[1].is_finite() || pair[1] <= pair[0] {
                return Err(TimeError::NonIncreasing { index: i + 1 });
            }
        }
        if !offsets[0].is_finite() {
            return Err(TimeError::NonIncreasing { index: 0 });
        }
        Ok(Self {
            offsets,
            epoch,
            calendar,
            alignment,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when the grid ended up empty. Construction forbids this, so the
    /// method exists for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Day offsets from the epoch.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// The epoch the offsets count from.
    pub fn epoch(&self) -> CivilDate {
        self.epoch
    }

    /// The calendar the offsets are resolved in.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Where each timestamp sits in its sampling interval.
    pub fn alignment(&self) -> TimeAlignment {
        self.alignment
    }

    /// A grid with the same epoch and calendar around new offsets.
    ///
    /// # Errors
    ///
    /// Same validation as [`TimeGrid::new`].
    pub fn with_offsets(
        &self,
        offsets: Vec<f64>,
        alignment: TimeAlignment,
    ) -> Result<Self, TimeError> {
        Self::new(offsets, self.epoch, self.calendar, alignment)
    }

    /// The nominal step of the grid in days, taken as the median interval.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::StepUndefined`] for single-sample grids and
    /// [`TimeError::IrregularSpacing`] when any interval deviates from the
    /// median by more than a 1e-3 relative tolerance.
    pub fn step(&self) -> Result<f64, TimeError> {
        if self.offsets.len() < 2 {
            return Err(TimeError::StepUndefined {
                len: self.offsets.len(),
            });
        }
        let mut deltas: Vec<f64> = self.offsets.windows(2).map(|w| w[1] - w[0]).collect();
        deltas.sort_by(|a, b| a.total_cmp(b));
        let median = deltas[deltas.len() / 2];
        for (i, pair) in self.offsets.windows(2).enumerate() {
            let delta = pair[1] - pair[0];
            if (delta - median).abs() > SPACING_REL_TOL * median {
                return Err(TimeError::IrregularSpacing {
                    index: i,
                    found: delta,
                    median,
                });
            }
        }
        Ok(median)
    }

    /// Resolves every offset to `(year, doy, hour)` labels.
    ///
    /// The sub-day part is rounded to the nearest minute before the hour is
    /// truncated, so float noise around exact hours cannot shift a label.
    ///
    /// # Errors
    ///
    /// Propagates [`Calendar::year_doy`] errors for epochs invalid in the
    /// grid's calendar or offsets outside the representable range.
    pub fn labels(&self) -> Result<Vec<TimePoint>, TimeError> {
        self.offsets
            .iter()
            .map(|&offset| {
                let mut day = offset.floor() as i64;
                let mut minutes = ((offset - day as f64) * 1440.0).round() as i64;
                if minutes >= 1440 {
                    day += 1;
                    minutes -= 1440;
                }
                let (year, doy) = self.calendar.year_doy(self.epoch, day)?;
                Ok(TimePoint {
                    year,
                    doy,
                    hour: (minutes / 60) as u8,
                })
            })
            .collect()
    }

    /// Days to add to `other`'s offsets to express them relative to this
    /// grid's epoch.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::CalendarMismatch`] when the grids disagree on the
    /// calendar, plus date errors for epochs invalid in it.
    pub fn offset_shift_from(&self, other: &TimeGrid) -> Result<f64, TimeError> {
        if self.calendar != other.calendar {
            return Err(TimeError::CalendarMismatch {
                src: self.calendar.name().to_string(),
                dst: other.calendar.name().to_string(),
            });
        }
        let days = self.calendar.days_between(self.epoch, other.epoch)?;
        Ok(days as f64)
    }
}
