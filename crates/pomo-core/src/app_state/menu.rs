//! Standby menu cursor.
//!
//! One variant per menu level, so a cursor can never claim to be inside a
//! submenu whose parent is not open.

use crate::config::ConfigItem;
use crate::stats::{Metric, PERIOD_COUNT, Period};

/// Top-level Standby items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainItem {
    Sprint,
    Statistics,
    Config,
    Clock,
}

impl MainItem {
    pub fn next(self) -> Self {
        match self {
            Self::Sprint => Self::Statistics,
            Self::Statistics => Self::Config,
            Self::Config => Self::Clock,
            Self::Clock => Self::Sprint,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Sprint => Self::Clock,
            Self::Statistics => Self::Sprint,
            Self::Config => Self::Statistics,
            Self::Clock => Self::Config,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sprint => "SPr",
            Self::Statistics => "StAt",
            Self::Config => "COnF",
            Self::Clock => "CLOC",
        }
    }
}

/// Entries of the Statistics submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsItem {
    Metric(Metric),
    /// Wipe the counter log
    Clear,
}

impl StatsItem {
    pub fn next(self) -> Self {
        match self {
            Self::Metric(Metric::Total) => Self::Metric(Metric::Min),
            Self::Metric(Metric::Min) => Self::Metric(Metric::Avg),
            Self::Metric(Metric::Avg) => Self::Metric(Metric::Max),
            Self::Metric(Metric::Max) => Self::Clear,
            Self::Clear => Self::Metric(Metric::Total),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Metric(metric) => metric.label(),
            Self::Clear => " CLr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Main(MainItem),
    StatsSelect(StatsItem),
    StatsPeriod { metric: Metric, period: Period },
    StatsValue { metric: Metric, period: Period },
    ConfigSelect(ConfigItem),
    ConfigEdit(ConfigItem),
}

/// Next statistics period after `period`, skipping the current month.
///
/// The month in progress is incomplete, so it is never offered.
pub fn next_period(period: Period, current_month: u8) -> Period {
    let mut index = period.index();
    loop {
        index = (index + 1) % PERIOD_COUNT;
        match Period::from_index(index) {
            Some(Period::Month(m)) if m == current_month => continue,
            Some(next) => return next,
            None => return Period::Rolling(7),
        }
    }
}
