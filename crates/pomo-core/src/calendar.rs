//! Calendar arithmetic for the day-indexed counter log.
//!
//! Everything here is pure: leap years, month lengths, day-of-year
//! conversions and ISO day-of-week. The [`CalendarSnapshot`] is the only
//! derived value the rest of the core keeps around, and it is rebuilt from
//! a fresh RTC reading every time it is refreshed.

use crate::app_state::AppError;
use crate::constants::{MAX_YEAR, MIN_YEAR};

/// Cumulative days before the first of each month in a common year
const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Wall-clock reading as produced by the RTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Checks the reading against the supported year range and the
    /// calendar/clock bounds.
    pub fn is_sane(&self) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&self.year)
            && (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    /// Like [`DateTime::is_sane`], but as a `Result` carrying the fault.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_sane() {
            Ok(())
        } else {
            Err(AppError::ClockInsane)
        }
    }
}

/// A calendar date resolved from a day-of-year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Gregorian leap-year rule
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given year
pub const fn days_in_year(year: u16) -> u16 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Number of days in `month` (1-based). Returns 0 for an invalid month.
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Day-of-year (1-based) of the given date.
pub fn date_to_day_of_year(year: u16, month: u8, day: u8) -> u16 {
    let index = usize::from(month.clamp(1, 12) - 1);
    let mut doy = DAYS_BEFORE_MONTH[index] + u16::from(day);
    if month > 2 && is_leap_year(year) {
        doy += 1;
    }
    doy
}

/// Resolves a day-of-year into a date.
///
/// `reference_day`/`reference_year` anchor the lookup: a day-of-year at or
/// before the reference day belongs to the reference year, anything later
/// must be from the year before. Returns `None` when the day does not exist
/// in the resolved year.
pub fn day_of_year_to_date(day_of_year: u16, reference_day: u16, reference_year: u16) -> Option<Date> {
    let year = if day_of_year <= reference_day {
        reference_year
    } else {
        reference_year.checked_sub(1)?
    };

    if day_of_year == 0 || day_of_year > days_in_year(year) {
        return None;
    }

    let mut remaining = day_of_year;
    for month in 1..=12u8 {
        let len = u16::from(days_in_month(year, month));
        if remaining <= len {
            return Some(Date {
                year,
                month,
                // remaining <= 31 here
                day: remaining as u8,
            });
        }
        remaining -= len;
    }
    None
}

/// ISO 8601 day of week: Monday = 1 .. Sunday = 7.
pub fn day_of_week(year: u16, month: u8, day: u8) -> u8 {
    // Sakamoto's congruence, 0 = Sunday
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let y = if month < 3 { year - 1 } else { year };
    let index = usize::from(month.clamp(1, 12) - 1);
    let weekday = (y + y / 4 - y / 100 + y / 400 + OFFSETS[index] + u16::from(day)) % 7;
    if weekday == 0 { 7 } else { weekday as u8 }
}

/// ISO day of week for a day index relative to the year start.
///
/// `day` may be zero or negative (the tail of the previous year); the result
/// continues the weekly cycle anchored at `start_dow`, the weekday of day 1.
pub fn day_of_week_from_start(start_dow: u8, day: i32) -> u8 {
    let offset = (i32::from(start_dow) - 1 + day - 1).rem_euclid(7);
    offset as u8 + 1
}

/// Derived, non-persisted view of "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSnapshot {
    pub day_of_year: u16,
    /// ISO 8601, Monday = 1 .. Sunday = 7
    pub day_of_week: u8,
    pub month: u8,
    pub year: u16,
}

impl CalendarSnapshot {
    /// Builds a snapshot from an RTC reading, rejecting insane readings.
    pub fn from_datetime(now: &DateTime) -> Result<Self, AppError> {
        now.validate()?;
        Ok(Self {
            day_of_year: date_to_day_of_year(now.year, now.month, now.day),
            day_of_week: day_of_week(now.year, now.month, now.day),
            month: now.month,
            year: now.year,
        })
    }

    /// Weekday of day-of-year 1 of the snapshot's year.
    pub fn start_day_of_week(&self) -> u8 {
        let back = (i32::from(self.day_of_year) - 1) % 7;
        ((i32::from(self.day_of_week) - 1 - back).rem_euclid(7) + 1) as u8
    }
}
