//! Application-wide state and error types for the sprint timer

mod clock_setup;
mod machine;
mod menu;

#[cfg(test)]
mod tests;

pub use clock_setup::{ClockField, ClockSetup};
pub use machine::App;
pub use menu::{MainItem, MenuState, StatsItem};

use thiserror_no_std::Error;

use crate::input::Button;

/// Fatal faults. Each blocks normal operation until its recovery gesture.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    #[error("RTC oscillator halted")]
    ClockHalted,
    #[error("RTC reading out of bounds")]
    ClockInsane,
    #[error("Counter log was not cleared")]
    UnclearedLog,
    #[error("EEPROM access failed")]
    Storage,
}

impl AppError {
    /// Number shown on the display as `Er N`
    pub const fn code(self) -> u8 {
        match self {
            Self::ClockHalted => 1,
            Self::ClockInsane => 2,
            Self::UnclearedLog => 3,
            Self::Storage => 4,
        }
    }

    /// Faults cleared by setting the clock
    pub const fn is_clock_fault(self) -> bool {
        matches!(self, Self::ClockHalted | Self::ClockInsane)
    }
}

/// Outer operating state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingState {
    /// Idle, navigating the menu
    Standby(MenuState),
    /// An interval is running. `armed` is a button held for a one-click toggle.
    Counting { armed: Option<Button> },
    Paused,
    Sleeping,
    DateTimeSetup(ClockSetup),
    /// Waiting for confirmation to wipe the counter log
    Clearing,
    Error(AppError),
}

impl OperatingState {
    /// Power-up default: Standby on the Sprint item
    pub const fn initial() -> Self {
        Self::Standby(MenuState::Main(MainItem::Sprint))
    }
}
