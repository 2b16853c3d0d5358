use core::fmt::Write;

use heapless::String;

use crate::calendar::{DateTime, days_in_month};
use crate::constants::{MAX_YEAR, MIN_YEAR};

/// Field currently being edited, in entry order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl ClockField {
    fn next(self) -> Option<Self> {
        match self {
            Self::Year => Some(Self::Month),
            Self::Month => Some(Self::Day),
            Self::Day => Some(Self::Hour),
            Self::Hour => Some(Self::Minute),
            Self::Minute => None,
        }
    }
}

/// Date/time entry in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSetup {
    pub field: ClockField,
    pub draft: DateTime,
}

fn step(value: u16, min: u16, max: u16, up: bool) -> u16 {
    match (up, value) {
        (true, v) if v >= max => min,
        (true, v) => v + 1,
        (false, v) if v <= min => max,
        (false, v) => v - 1,
    }
}

impl ClockSetup {
    /// Starts from `now` (seconds dropped), or from the earliest supported
    /// date when the reading is unusable.
    pub fn new(now: DateTime) -> Self {
        let mut draft = if now.is_sane() {
            now
        } else {
            DateTime::new(MIN_YEAR, 1, 1, 0, 0, 0)
        };
        draft.second = 0;
        Self {
            field: ClockField::Year,
            draft,
        }
    }

    /// Moves the edited field one step up or down, wrapping at its bounds.
    pub fn adjust(&mut self, up: bool) {
        let d = &mut self.draft;
        match self.field {
            ClockField::Year => d.year = step(d.year, MIN_YEAR, MAX_YEAR, up),
            ClockField::Month => d.month = step(d.month.into(), 1, 12, up) as u8,
            ClockField::Day => {
                let len = days_in_month(d.year, d.month);
                d.day = step(d.day.into(), 1, len.into(), up) as u8;
            }
            ClockField::Hour => d.hour = step(d.hour.into(), 0, 23, up) as u8,
            ClockField::Minute => d.minute = step(d.minute.into(), 0, 59, up) as u8,
        }
        // Keep the day valid after a month or year change
        d.day = d.day.min(days_in_month(d.year, d.month)).max(1);
        d.second = 0;
    }

    /// Moves to the next field. Returns `false` once the last field is done.
    pub fn advance(&mut self) -> bool {
        match self.field.next() {
            Some(field) => {
                self.field = field;
                true
            }
            None => false,
        }
    }

    /// Text for the edited field and the digit mask that should blink.
    pub fn render(&self) -> (String<8>, u8) {
        let d = &self.draft;
        let mut text = String::new();
        let blink = match self.field {
            ClockField::Year => {
                write!(text, "{:04}", d.year).ok();
                0b1111
            }
            ClockField::Month | ClockField::Day => {
                write!(text, "{:02}.{:02}", d.day, d.month).ok();
                if self.field == ClockField::Day { 0b0011 } else { 0b1100 }
            }
            ClockField::Hour | ClockField::Minute => {
                write!(text, "{:02}:{:02}", d.hour, d.minute).ok();
                if self.field == ClockField::Hour { 0b0011 } else { 0b1100 }
            }
        };
        (text, blink)
    }
}
