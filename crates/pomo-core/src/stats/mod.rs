//! Statistics engine.
//!
//! Recomputes total / min / average / max over five rolling windows and the
//! twelve calendar months from the counter log. Values are fixed-point
//! tenths, already converted to the configured unit.
//!
//! A month later in the year than the current one is read as that month of
//! the previous year, since no future data can exist. The current month is
//! incomplete; callers leave it out when listing months.

pub mod window;

use crate::app_state::AppError;
use crate::calendar::{CalendarSnapshot, date_to_day_of_year, days_in_month, days_in_year};
use crate::config::{CountingDays, CountingUnit};

pub use window::{WindowStats, aggregate};

/// Read access to day cells, implemented by the counter log
pub trait CellSource {
    fn cell(&mut self, day: u16) -> Result<u8, AppError>;
}

/// Rolling window lengths in days, ending yesterday
pub const ROLLING_WINDOWS: [u16; 5] = [7, 30, 60, 100, 365];

/// Number of statistics periods (rolling windows + months)
pub const PERIOD_COUNT: usize = ROLLING_WINDOWS.len() + 12;

const MONTH_LABELS: [&str; 12] = [
    " JAN", " FEb", " MAr", " APr", " MAY", " JUN", " JUL", " AUG", " SEP", " OCt", " NOV", " dEC",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Total,
    Min,
    Avg,
    Max,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Self::Total, Self::Min, Self::Avg, Self::Max];

    pub const fn index(self) -> usize {
        match self {
            Self::Total => 0,
            Self::Min => 1,
            Self::Avg => 2,
            Self::Max => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Total => "tOtL",
            Self::Min => " MIN",
            Self::Avg => " AVG",
            Self::Max => " MAX",
        }
    }
}

/// A statistics period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The last N days, ending yesterday
    Rolling(u16),
    /// A calendar month, 1..=12
    Month(u8),
}

impl Period {
    /// Period at a table index: rolling windows first, then months.
    pub fn from_index(index: usize) -> Option<Self> {
        if let Some(&days) = ROLLING_WINDOWS.get(index) {
            return Some(Self::Rolling(days));
        }
        let month = index.checked_sub(ROLLING_WINDOWS.len())?;
        (month < 12).then(|| Self::Month(month as u8 + 1))
    }

    pub fn index(self) -> usize {
        match self {
            Self::Rolling(days) => ROLLING_WINDOWS.iter().position(|&d| d == days).unwrap_or(0),
            Self::Month(month) => ROLLING_WINDOWS.len() + usize::from(month.clamp(1, 12) - 1),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rolling(7) => "  7d",
            Self::Rolling(30) => " 30d",
            Self::Rolling(60) => " 60d",
            Self::Rolling(100) => "100d",
            Self::Rolling(_) => "365d",
            Self::Month(month) => MONTH_LABELS[usize::from(month.clamp(1, 12) - 1)],
        }
    }
}

/// Day-of-year range of a month relative to the snapshot's year.
///
/// Months after the current one resolve to the previous year and come back
/// as zero/negative indices, as understood by [`aggregate`].
pub fn month_range(month: u8, snapshot: &CalendarSnapshot) -> (i32, i32) {
    if month <= snapshot.month {
        let start = i32::from(date_to_day_of_year(snapshot.year, month, 1));
        let len = i32::from(days_in_month(snapshot.year, month));
        (start, start + len - 1)
    } else {
        let year = snapshot.year.saturating_sub(1);
        let shift = i32::from(days_in_year(year));
        let start = i32::from(date_to_day_of_year(year, month, 1)) - shift;
        let len = i32::from(days_in_month(year, month));
        (start, start + len - 1)
    }
}

/// Every metric for every period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsTable {
    values: [[u32; 4]; PERIOD_COUNT],
}

impl Default for StatsTable {
    fn default() -> Self {
        Self {
            values: [[0; 4]; PERIOD_COUNT],
        }
    }
}

impl StatsTable {
    /// Fixed-point (×10) value of a metric over a period.
    pub fn get(&self, metric: Metric, period: Period) -> u32 {
        self.values[period.index()][metric.index()]
    }
}

/// Recomputes the full statistics table.
pub fn compute_all<L: CellSource>(
    log: &mut L,
    snapshot: &CalendarSnapshot,
    filter: CountingDays,
    unit: CountingUnit,
) -> Result<StatsTable, AppError> {
    let start_dow = snapshot.start_day_of_week();
    let today = i32::from(snapshot.day_of_year);
    let mut table = StatsTable::default();

    for &days in ROLLING_WINDOWS.iter() {
        let period = Period::Rolling(days);
        let stats = aggregate(log, today - i32::from(days), today - 1, start_dow, snapshot.year, filter)?;
        table.values[period.index()] = stats.scaled(unit);
    }

    for month in 1..=12u8 {
        let period = Period::Month(month);
        let (start, end) = month_range(month, snapshot);
        let stats = aggregate(log, start, end, start_dow, snapshot.year, filter)?;
        table.values[period.index()] = stats.scaled(unit);
    }

    Ok(table)
}
