//! Work/break interval sequencer.
//!
//! The scheduler owns the countdown and the running sprint counter for
//! today. It is advanced by [`SprintScheduler::tick`] once per 100 ms loop
//! iteration and reports what happened as a [`SprintEvent`]; persisting a
//! finished sprint and playing cues is left to the caller.

mod leds;

pub use leds::{LedPattern, led_pattern};

use log::{debug, info};

use crate::constants::{
    LONG_BREAK_MINUTES, MAX_DAILY_COUNT, PAUSE_REMINDER_SECS, SHORT_BREAK_MINUTES,
    SPRINTS_PER_LONG_BREAK, TICKS_PER_SECOND, WORK_MINUTES,
};

/// The interval currently being counted down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Idle,
    Work,
    ShortBreak,
    LongBreak,
}

impl Interval {
    /// Nominal length in minutes (0 when idle).
    pub const fn minutes(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Work => WORK_MINUTES,
            Self::ShortBreak => SHORT_BREAK_MINUTES,
            Self::LongBreak => LONG_BREAK_MINUTES,
        }
    }
}

/// Outcome of a scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintEvent {
    /// The countdown moved by one second
    Second,
    /// A work interval reached 00:00; call [`SprintScheduler::complete_sprint`]
    WorkFinished,
    /// A break reached 00:00 and the next work interval has begun
    BreakFinished,
    /// One reminder period elapsed while paused
    PauseReminder,
}

/// Temporary overrides toggled by holding a button while counting.
///
/// Never persisted; cleared on every power-up. Mute is a flag on the
/// configuration record itself and is toggled there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneClickModes {
    /// Skip the completion cue for the rest of the session
    pub melody_off: bool,
    /// Inverts the configured hero mode
    pub hero: bool,
}

#[derive(Debug, Clone)]
pub struct SprintScheduler {
    interval: Interval,
    minutes: u8,
    seconds: u8,
    tenths: u8,
    counter: u8,
    paused: bool,
    paused_ticks: u32,
}

impl Default for SprintScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SprintScheduler {
    pub const fn new() -> Self {
        Self {
            interval: Interval::Idle,
            minutes: 0,
            seconds: 0,
            tenths: 0,
            counter: 0,
            paused: false,
            paused_ticks: 0,
        }
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sprints completed today
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Loads today's count, e.g. after boot reconciliation.
    pub fn set_counter(&mut self, counter: u8) {
        self.counter = counter.min(MAX_DAILY_COUNT);
    }

    /// Remaining `(minutes, seconds)` of the current interval.
    pub fn remaining(&self) -> (u8, u8) {
        (self.minutes, self.seconds)
    }

    fn remaining_secs(&self) -> u16 {
        u16::from(self.minutes) * 60 + u16::from(self.seconds)
    }

    fn begin(&mut self, interval: Interval) {
        self.interval = interval;
        self.minutes = interval.minutes();
        self.seconds = 0;
        self.tenths = 0;
    }

    /// Starts a work interval. Only valid from idle.
    pub fn start(&mut self) -> bool {
        if self.interval != Interval::Idle {
            return false;
        }
        info!("Sprint {} started", self.counter + 1);
        self.begin(Interval::Work);
        true
    }

    /// Freezes the countdown. Refused when idle, already paused, or at 00:00.
    pub fn pause(&mut self) -> bool {
        if self.interval == Interval::Idle || self.paused || self.remaining_secs() == 0 {
            return false;
        }
        debug!("Paused at {:02}:{:02}", self.minutes, self.seconds);
        self.paused = true;
        self.paused_ticks = 0;
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        debug!("Resumed at {:02}:{:02}", self.minutes, self.seconds);
        self.paused = false;
        true
    }

    /// Abandons the current interval without saving. Only valid while paused.
    pub fn cancel(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        info!("{:?} cancelled", self.interval);
        self.reset();
        true
    }

    /// Drops any interval in progress, keeping the counter.
    pub fn reset(&mut self) {
        self.paused = false;
        self.begin(Interval::Idle);
    }

    /// Advances by one 100 ms tick.
    pub fn tick(&mut self) -> Option<SprintEvent> {
        if self.interval == Interval::Idle {
            return None;
        }

        if self.paused {
            self.paused_ticks += 1;
            let period = PAUSE_REMINDER_SECS * u32::from(TICKS_PER_SECOND);
            return (self.paused_ticks % period == 0).then_some(SprintEvent::PauseReminder);
        }

        self.tenths += 1;
        if self.tenths < TICKS_PER_SECOND {
            return None;
        }
        self.tenths = 0;

        if self.seconds > 0 {
            self.seconds -= 1;
        } else if self.minutes > 0 {
            self.minutes -= 1;
            self.seconds = 59;
        }

        if self.remaining_secs() > 0 {
            return Some(SprintEvent::Second);
        }

        if self.interval == Interval::Work {
            Some(SprintEvent::WorkFinished)
        } else {
            debug!("{:?} finished", self.interval);
            self.begin(Interval::Work);
            Some(SprintEvent::BreakFinished)
        }
    }

    /// Counts the finished work interval and starts the following break.
    ///
    /// Every fourth sprint earns the long break. With `hero` set the break
    /// still happens but lasts a single second.
    pub fn complete_sprint(&mut self, hero: bool) -> u8 {
        self.counter = self.counter.saturating_add(1).min(MAX_DAILY_COUNT);

        let next = if self.counter % SPRINTS_PER_LONG_BREAK == 0 {
            Interval::LongBreak
        } else {
            Interval::ShortBreak
        };
        info!("Sprint {} complete, next: {:?}", self.counter, next);

        self.begin(next);
        if hero {
            self.minutes = 0;
            self.seconds = 1;
        }
        self.counter
    }
}
