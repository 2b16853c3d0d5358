//! Aggregation of log cells over a day range

use crate::app_state::AppError;
use crate::calendar::{day_of_week_from_start, days_in_year};
use crate::config::{CountingDays, CountingUnit};
use crate::constants::MAX_DAILY_COUNT;

use super::CellSource;

/// Raw aggregates for one period, before unit scaling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    pub total: u32,
    pub min: u32,
    pub max: u32,
    /// Number of days that passed the filter
    pub days: u32,
}

impl WindowStats {
    fn add(&mut self, count: u8) {
        let count = u32::from(count);
        if self.days == 0 {
            self.min = count;
            self.max = count;
        } else {
            self.min = self.min.min(count);
            self.max = self.max.max(count);
        }
        self.total += count;
        self.days += 1;
    }

    /// Fixed-point (×10) `[total, min, avg, max]` in the given unit.
    ///
    /// All zero when no day matched.
    pub fn scaled(&self, unit: CountingUnit) -> [u32; 4] {
        if self.days == 0 {
            return [0; 4];
        }
        let m = unit.multiplier_x100();
        [
            self.total * m / 100,
            self.min * m / 100,
            self.total * m / (100 * self.days),
            self.max * m / 100,
        ]
    }
}

/// Aggregates the log over `start..=end` (day-of-year indices).
///
/// Indices below 1 address the tail of the previous year: index 0 is the
/// last day of `year - 1`. `start_dow` is the ISO weekday of day 1 of
/// `year`. Empty cells, the end marker and out-of-range bytes are skipped,
/// as are days the `filter` excludes.
pub fn aggregate<L: CellSource>(
    log: &mut L,
    start: i32,
    end: i32,
    start_dow: u8,
    year: u16,
    filter: CountingDays,
) -> Result<WindowStats, AppError> {
    let previous_year_len = i32::from(days_in_year(year.saturating_sub(1)));
    let mut stats = WindowStats::default();

    for day in start..=end {
        let cell = if day < 1 { day + previous_year_len } else { day };
        if cell < 1 {
            continue;
        }

        // cell is within 1..=366 here
        let count = log.cell(cell as u16)?;
        if count > MAX_DAILY_COUNT {
            continue;
        }
        if !filter.includes(day_of_week_from_start(start_dow, day), count) {
            continue;
        }
        stats.add(count);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EMPTY_VALUE, END_MARKER};
    use crate::stats::tests::ArrayLog;

    #[test]
    fn non_zero_filter_week() {
        // 2024-01-01 is a Monday
        let mut log = ArrayLog::new();
        for (i, &count) in [2u8, 0, 0, 5, 0, 0, 3].iter().enumerate() {
            log.set(i as u16 + 1, count);
        }

        let stats = aggregate(&mut log, 1, 7, 1, 2024, CountingDays::NonZeroDays).unwrap();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.days, 3);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 5);
        assert_eq!(stats.scaled(CountingUnit::Sprints), [100, 20, 33, 50]);
    }

    #[test]
    fn weekday_filters() {
        let mut log = ArrayLog::new();
        for day in 1..=7 {
            log.set(day, 1);
        }
        let weekdays = aggregate(&mut log, 1, 7, 1, 2024, CountingDays::Weekdays).unwrap();
        assert_eq!(weekdays.days, 5);
        let six = aggregate(&mut log, 1, 7, 1, 2024, CountingDays::WeekdaysSaturday).unwrap();
        assert_eq!(six.days, 6);
        let all = aggregate(&mut log, 1, 7, 1, 2024, CountingDays::AllDays).unwrap();
        assert_eq!(all.days, 7);
    }

    #[test]
    fn skips_empty_and_marker_cells() {
        let mut log = ArrayLog::new();
        log.set(1, 4);
        log.set(2, END_MARKER);
        log.set(3, EMPTY_VALUE);
        let stats = aggregate(&mut log, 1, 3, 1, 2024, CountingDays::AllDays).unwrap();
        assert_eq!(stats.days, 1);
        assert_eq!(stats.total, 4);
    }

    #[test]
    fn window_crosses_new_year() {
        // Year 2024, previous year 2023 has 365 days
        let mut log = ArrayLog::new();
        log.set(364, 2); // Dec 30th 2023
        log.set(365, 3); // Dec 31st 2023
        log.set(1, 4); // Jan 1st 2024
        let stats = aggregate(&mut log, -1, 1, 1, 2024, CountingDays::AllDays).unwrap();
        assert_eq!(stats.total, 9);
        assert_eq!(stats.days, 3);
    }

    #[test]
    fn hours_unit() {
        let stats = WindowStats {
            total: 12,
            min: 12,
            max: 12,
            days: 1,
        };
        // 12 sprints of 25 minutes are 5 hours, 4.99 with the 4.16 factor
        assert_eq!(stats.scaled(CountingUnit::Hours), [49, 49, 49, 49]);
    }

    #[test]
    fn no_days_yields_zero() {
        assert_eq!(WindowStats::default().scaled(CountingUnit::Sprints), [0; 4]);
    }
}
