//! CF calendars and the date arithmetic behind them.
//!
//! CMIP6 models typically run on the 365-day no-leap calendar while
//! observational products use the Gregorian one. Both are modeled behind
//! [`Calendar`], which turns whole-day offsets from an epoch into
//! `(year, day-of-year)` pairs and back.

use std::fmt;

use chrono::{Datelike, NaiveDate, TimeDelta};

use crate::error::TimeError;

/// Number of days in each month of the no-leap calendar
/// (index 0 unused, index 1 = January).
const DAYS_PER_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Day-of-year on which each no-leap month starts
/// (index 0 unused, index 1 = January starts at DOY 1).
const MONTH_START_DOY: [u16; 13] = [0, 1, 32, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// Days in every no-leap year.
pub const NOLEAP_YEAR_DAYS: i64 = 365;

/// A CF calendar attribute reduced to the two systems this crate supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Calendar {
    /// The 365-day model calendar; February always has 28 days.
    NoLeap,
    /// The civil calendar, with leap days.
    Gregorian,
}

impl Calendar {
    /// Parses a CF `calendar` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownCalendar`] for attributes outside the
    /// no-leap and Gregorian families.
    pub fn parse(name: &str) -> Result<Self, TimeError> {
        match name.trim() {
            "noleap" | "365_day" | "365day" => Ok(Calendar::NoLeap),
            "gregorian" | "standard" | "proleptic_gregorian" => Ok(Calendar::Gregorian),
            other => Err(TimeError::UnknownCalendar {
                name: other.to_string(),
            }),
        }
    }

    /// Canonical CF name of this calendar.
    pub fn name(&self) -> &'static str {
        match self {
            Calendar::NoLeap => "noleap",
            Calendar::Gregorian => "gregorian",
        }
    }

    /// Resolves `days` whole days after `epoch` to a `(year, day-of-year)` pair.
    ///
    /// Day-of-year is 1-based; negative `days` resolves to dates before the
    /// epoch. In the Gregorian calendar leap years make day-of-year run to
    /// 366.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidDate`] when the epoch itself does not
    /// exist in this calendar and [`TimeError::OffsetOutOfRange`] when the
    /// target date cannot be represented.
    pub fn year_doy(&self, epoch: CivilDate, days: i64) -> Result<(i32, u16), TimeError> {
        match self {
            Calendar::NoLeap => {
                let epoch_doy = noleap_doy(epoch)? as i64;
                let total = epoch_doy - 1 + days;
                let year = i64::from(epoch.year()) + total.div_euclid(NOLEAP_YEAR_DAYS);
                let doy = total.rem_euclid(NOLEAP_YEAR_DAYS) + 1;
                let year = i32::try_from(year)
                    .map_err(|_| TimeError::OffsetOutOfRange { days })?;
                Ok((year, doy as u16))
            }
            Calendar::Gregorian => {
                let date = gregorian_date(epoch)?
                    .checked_add_signed(TimeDelta::days(days))
                    .ok_or(TimeError::OffsetOutOfRange { days })?;
                Ok((date.year(), date.ordinal() as u16))
            }
        }
    }

    /// Whole days from `from` to `to` (positive when `to` is later).
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidDate`] when either date does not exist in
    /// this calendar.
    pub fn days_between(&self, from: CivilDate, to: CivilDate) -> Result<i64, TimeError> {
        match self {
            Calendar::NoLeap => Ok(noleap_day_number(to)? - noleap_day_number(from)?),
            Calendar::Gregorian => {
                Ok((gregorian_date(to)? - gregorian_date(from)?).num_days())
            }
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Day-of-year of `date` in the no-leap calendar (1..=365).
fn noleap_doy(date: CivilDate) -> Result<u16, TimeError> {
    let month = date.month() as usize;
    if date.day() > DAYS_PER_MONTH[month] {
        return Err(TimeError::InvalidDate {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            calendar: Calendar::NoLeap.name().to_string(),
        });
    }
    Ok(MONTH_START_DOY[month] + u16::from(date.day()) - 1)
}

/// Absolute day number of `date` in the no-leap calendar, for differencing.
fn noleap_day_number(date: CivilDate) -> Result<i64, TimeError> {
    Ok(i64::from(date.year()) * NOLEAP_YEAR_DAYS + i64::from(noleap_doy(date)?) - 1)
}

fn gregorian_date(date: CivilDate) -> Result<NaiveDate, TimeError> {
    NaiveDate::from_ymd_opt(date.year(), u32::from(date.month()), u32::from(date.day())).ok_or(
        TimeError::InvalidDate {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            calendar: Calendar::Gregorian.name().to_string(),
        },
    )
}

/// A year-month-day triple not yet tied to a calendar.
///
/// Construction checks the month and the day against the longest form of the
/// month (February 29 is accepted here); whether the date exists in a
/// concrete calendar is checked where the date is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilDate {
    year: i32,
    month: u8,
    day: u8,
}

impl CivilDate {
    /// Creates a date from year, month and day.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidMonth`] or [`TimeError::InvalidDay`] when
    /// the pair can exist in no calendar at all.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, TimeError> {
        if !(1..=12).contains(&month) {
            return Err(TimeError::InvalidMonth { month });
        }
        let max_day = if month == 2 {
            29
        } else {
            DAYS_PER_MONTH[month as usize]
        };
        if !(1..=max_day).contains(&day) {
            return Err(TimeError::InvalidDay {
                day,
                month,
                max_day,
            });
        }
        Ok(Self { year, month, day })
    }

    /// Parses a `YYYY-MM-DD` date, as found in CF `units` attributes.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::EpochParse`] when the string is not three
    /// dash-separated numbers, plus the [`CivilDate::new`] errors.
    pub fn parse(value: &str) -> Result<Self, TimeError> {
        let parse_err = || TimeError::EpochParse {
            value: value.to_string(),
        };
        let mut parts = value.trim().splitn(3, '-');
        let year: i32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(parse_err)?;
        let month: u8 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(parse_err)?;
        let day: u8 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(parse_err)?;
        Self::new(year, month, day)
    }

    /// Returns the year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// Returns the day within the month.
    pub fn day(self) -> u8 {
        self.day
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u8, d: u8) -> CivilDate {
        CivilDate::new(y, m, d).expect("valid test date")
    }

    #[test]
    fn parses_cf_calendar_names() {
        assert_eq!(Calendar::parse("noleap").expect("known"), Calendar::NoLeap);
        assert_eq!(Calendar::parse("365_day").expect("known"), Calendar::NoLeap);
        assert_eq!(
            Calendar::parse("standard").expect("known"),
            Calendar::Gregorian
        );
        assert_eq!(
            Calendar::parse("proleptic_gregorian").expect("known"),
            Calendar::Gregorian
        );
        let err = Calendar::parse("360_day").expect_err("unsupported");
        assert!(matches!(err, TimeError::UnknownCalendar { .. }));
    }

    #[test]
    fn civil_date_validation() {
        assert!(CivilDate::new(2000, 1, 31).is_ok());
        assert!(CivilDate::new(2000, 2, 29).is_ok(), "Feb 29 is calendar-dependent");
        assert!(matches!(
            CivilDate::new(2000, 0, 1).expect_err("month 0"),
            TimeError::InvalidMonth { month: 0 }
        ));
        assert!(matches!(
            CivilDate::new(2000, 4, 31).expect_err("April 31"),
            TimeError::InvalidDay { day: 31, month: 4, max_day: 30 }
        ));
    }

    #[test]
    fn parses_epoch_strings() {
        let d = CivilDate::parse("1850-01-01").expect("valid");
        assert_eq!((d.year(), d.month(), d.day()), (1850, 1, 1));
        assert_eq!(d.to_string(), "1850-01-01");
        assert!(matches!(
            CivilDate::parse("1850/01/01").expect_err("wrong separator"),
            TimeError::EpochParse { .. }
        ));
        assert!(matches!(
            CivilDate::parse("jan 1 1850").expect_err("words"),
            TimeError::EpochParse { .. }
        ));
    }

    #[test]
    fn noleap_year_doy_within_year() {
        let cal = Calendar::NoLeap;
        let epoch = date(2000, 1, 1);
        assert_eq!(cal.year_doy(epoch, 0).expect("valid"), (2000, 1));
        assert_eq!(cal.year_doy(epoch, 58).expect("valid"), (2000, 59)); // Feb 28
        assert_eq!(cal.year_doy(epoch, 59).expect("valid"), (2000, 60)); // Mar 1, no leap day
        assert_eq!(cal.year_doy(epoch, 364).expect("valid"), (2000, 365));
    }

    #[test]
    fn noleap_year_doy_crosses_years() {
        let cal = Calendar::NoLeap;
        let epoch = date(2000, 1, 1);
        assert_eq!(cal.year_doy(epoch, 365).expect("valid"), (2001, 1));
        assert_eq!(cal.year_doy(epoch, 2 * 365 + 10).expect("valid"), (2002, 11));
        assert_eq!(cal.year_doy(epoch, -1).expect("valid"), (1999, 365));
    }

    #[test]
    fn noleap_mid_year_epoch() {
        let cal = Calendar::NoLeap;
        let epoch = date(1999, 7, 1); // doy 182
        assert_eq!(cal.year_doy(epoch, 0).expect("valid"), (1999, 182));
        assert_eq!(cal.year_doy(epoch, 183).expect("valid"), (1999, 365));
        assert_eq!(cal.year_doy(epoch, 184).expect("valid"), (2000, 1));
    }

    #[test]
    fn noleap_rejects_leap_day() {
        let cal = Calendar::NoLeap;
        let err = cal
            .year_doy(date(2000, 2, 29), 0)
            .expect_err("no Feb 29 in noleap");
        assert!(matches!(err, TimeError::InvalidDate { .. }));
    }

    #[test]
    fn gregorian_honors_leap_years() {
        let cal = Calendar::Gregorian;
        let epoch = date(2000, 1, 1);
        // 2000 is a leap year: day 59 is Feb 29, day 60 is Mar 1.
        assert_eq!(cal.year_doy(epoch, 59).expect("valid"), (2000, 60));
        assert_eq!(cal.year_doy(epoch, 366).expect("valid"), (2001, 1));
    }

    #[test]
    fn days_between_agrees_per_calendar() {
        let a = date(2000, 1, 1);
        let b = date(2001, 1, 1);
        assert_eq!(Calendar::NoLeap.days_between(a, b).expect("valid"), 365);
        assert_eq!(Calendar::Gregorian.days_between(a, b).expect("valid"), 366);
        assert_eq!(Calendar::NoLeap.days_between(b, a).expect("valid"), -365);
    }

    #[test]
    fn month_tables_are_consistent() {
        let total: u16 = DAYS_PER_MONTH[1..=12].iter().copied().map(u16::from).sum();
        assert_eq!(total, 365);
        for m in 1..12usize {
            assert_eq!(
                MONTH_START_DOY[m] + u16::from(DAYS_PER_MONTH[m]),
                MONTH_START_DOY[m + 1],
                "month start table mismatch at month {m}"
            );
        }
    }
}
