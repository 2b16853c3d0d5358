//! Device settings record.
//!
//! Persisted by [`crate::storage::config_store`] as a postcard payload behind
//! a signature byte and a layout version byte. The `mute` flag is transient
//! and never serialized.

use core::fmt::Write;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::constants::BRIGHTNESS_LEVELS;
use crate::cues::TUNE_COUNT;

/// Display brightness step
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brightness(u8);

impl Brightness {
    pub const fn new(level: u8) -> Self {
        if level < BRIGHTNESS_LEVELS {
            Self(level)
        } else {
            Self(BRIGHTNESS_LEVELS - 1)
        }
    }

    pub const fn level(self) -> u8 {
        self.0
    }

    fn next(self) -> Self {
        Self((self.0 + 1) % BRIGHTNESS_LEVELS)
    }
}

/// Completion cue selection
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tune {
    Off,
    Random,
    Cue(u8),
}

impl Tune {
    fn next(self) -> Self {
        match self {
            Self::Off => Self::Random,
            Self::Random => Self::Cue(0),
            Self::Cue(i) if i + 1 < TUNE_COUNT => Self::Cue(i + 1),
            Self::Cue(_) => Self::Off,
        }
    }
}

/// Which days take part in statistics
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingDays {
    /// Monday to Friday
    Weekdays,
    /// Monday to Saturday
    WeekdaysSaturday,
    /// Every day
    AllDays,
    /// Every day with at least one sprint
    NonZeroDays,
}

impl CountingDays {
    /// Whether a day with the given ISO weekday and count is counted.
    pub fn includes(self, day_of_week: u8, count: u8) -> bool {
        match self {
            Self::Weekdays => day_of_week <= 5,
            Self::WeekdaysSaturday => day_of_week <= 6,
            Self::AllDays => true,
            Self::NonZeroDays => count != 0,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Weekdays => Self::WeekdaysSaturday,
            Self::WeekdaysSaturday => Self::AllDays,
            Self::AllDays => Self::NonZeroDays,
            Self::NonZeroDays => Self::Weekdays,
        }
    }
}

/// Unit used when displaying statistics
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingUnit {
    Sprints,
    Hours,
}

impl CountingUnit {
    /// Multiplier applied to raw counts, in hundredths.
    ///
    /// Raw counts become fixed-point tenths: sprints ×10, hours ×4.16
    /// (25 min / 60 min × 10).
    pub const fn multiplier_x100(self) -> u32 {
        match self {
            Self::Sprints => 1000,
            Self::Hours => 416,
        }
    }
}

/// Persisted device settings
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub brightness: Brightness,
    pub buzzer: bool,
    pub tune: Tune,
    pub pause_reminder: bool,
    pub progress_leds: bool,
    pub counting_days: CountingDays,
    pub unit: CountingUnit,
    pub hero_mode: bool,
    #[serde(skip)]
    pub mute: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brightness: Brightness::new(2),
            buzzer: true,
            tune: Tune::Cue(0),
            pause_reminder: true,
            progress_leds: true,
            counting_days: CountingDays::AllDays,
            unit: CountingUnit::Sprints,
            hero_mode: false,
            mute: false,
        }
    }
}

/// Layout version 1, before progress LEDs, units and hero mode existed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigV1 {
    pub brightness: Brightness,
    pub buzzer: bool,
    pub tune: Tune,
    pub pause_reminder: bool,
    pub counting_days: CountingDays,
}

impl From<ConfigV1> for Config {
    fn from(old: ConfigV1) -> Self {
        Self {
            brightness: old.brightness,
            buzzer: old.buzzer,
            tune: old.tune,
            pause_reminder: old.pause_reminder,
            counting_days: old.counting_days,
            ..Self::default()
        }
    }
}

/// Entries of the Config submenu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigItem {
    Brightness,
    Buzzer,
    Tune,
    PauseReminder,
    ProgressLeds,
    CountingDays,
    Unit,
    HeroMode,
}

impl ConfigItem {
    pub const ALL: [ConfigItem; 8] = [
        Self::Brightness,
        Self::Buzzer,
        Self::Tune,
        Self::PauseReminder,
        Self::ProgressLeds,
        Self::CountingDays,
        Self::Unit,
        Self::HeroMode,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brightness => "brIG",
            Self::Buzzer => "bUZZ",
            Self::Tune => "tUNE",
            Self::PauseReminder => "rEMI",
            Self::ProgressLeds => "LEdS",
            Self::CountingDays => "dAYS",
            Self::Unit => "UNIt",
            Self::HeroMode => "HErO",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&i| i == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|&i| i == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

fn on_off(value: bool) -> &'static str {
    if value { " On " } else { " OFF" }
}

impl Config {
    /// Advances the given setting to its next value (in memory only).
    pub fn cycle(&mut self, item: ConfigItem) {
        match item {
            ConfigItem::Brightness => self.brightness = self.brightness.next(),
            ConfigItem::Buzzer => self.buzzer = !self.buzzer,
            ConfigItem::Tune => self.tune = self.tune.next(),
            ConfigItem::PauseReminder => self.pause_reminder = !self.pause_reminder,
            ConfigItem::ProgressLeds => self.progress_leds = !self.progress_leds,
            ConfigItem::CountingDays => self.counting_days = self.counting_days.next(),
            ConfigItem::Unit => {
                self.unit = match self.unit {
                    CountingUnit::Sprints => CountingUnit::Hours,
                    CountingUnit::Hours => CountingUnit::Sprints,
                }
            }
            ConfigItem::HeroMode => self.hero_mode = !self.hero_mode,
        }
    }

    /// Four-glyph rendering of a setting's current value.
    pub fn value_text(&self, item: ConfigItem) -> String<8> {
        let mut text = String::new();
        match item {
            ConfigItem::Brightness => {
                write!(text, "br {}", self.brightness.level() + 1).ok();
            }
            ConfigItem::Buzzer => {
                text.push_str(on_off(self.buzzer)).ok();
            }
            ConfigItem::Tune => match self.tune {
                Tune::Off => {
                    text.push_str(" OFF").ok();
                }
                Tune::Random => {
                    text.push_str(" rnd").ok();
                }
                Tune::Cue(i) => {
                    write!(text, "t  {}", i + 1).ok();
                }
            },
            ConfigItem::PauseReminder => {
                text.push_str(on_off(self.pause_reminder)).ok();
            }
            ConfigItem::ProgressLeds => {
                text.push_str(on_off(self.progress_leds)).ok();
            }
            ConfigItem::CountingDays => {
                let label = match self.counting_days {
                    CountingDays::Weekdays => " 1-5",
                    CountingDays::WeekdaysSaturday => " 1-6",
                    CountingDays::AllDays => " 1-7",
                    CountingDays::NonZeroDays => "nonZ",
                };
                text.push_str(label).ok();
            }
            ConfigItem::Unit => {
                let label = match self.unit {
                    CountingUnit::Sprints => " SPr",
                    CountingUnit::Hours => "HOUr",
                };
                text.push_str(label).ok();
            }
            ConfigItem::HeroMode => {
                text.push_str(on_off(self.hero_mode)).ok();
            }
        }
        text
    }
}
