//! Compile-time tunables shared across the core

// ============================================================================
// Timing
// ============================================================================

/// Main loop period in milliseconds
pub const TICK_MS: u32 = 100;

/// Ticks per real-time second
pub const TICKS_PER_SECOND: u8 = 10;

/// Ticks per real-time minute
pub const TICKS_PER_MINUTE: u32 = 600;

/// Length of a work sprint in minutes
pub const WORK_MINUTES: u8 = 25;

/// Length of a short break in minutes
pub const SHORT_BREAK_MINUTES: u8 = 5;

/// Length of a long break in minutes
pub const LONG_BREAK_MINUTES: u8 = 15;

/// A long break follows every this many completed sprints
pub const SPRINTS_PER_LONG_BREAK: u8 = 4;

/// Seconds between pause reminder cues
pub const PAUSE_REMINDER_SECS: u32 = 60;

/// Standby inactivity before the device goes to sleep
pub const SLEEP_TIMEOUT_TICKS: u32 = 120 * TICKS_PER_SECOND as u32;

// ============================================================================
// Counter log
// ============================================================================

/// Highest valid day-of-year
pub const MAX_DAY_OF_YEAR: u16 = 366;

/// Last cell that may hold the end marker (day 366 + 1)
pub const LOOKAHEAD_CELL: u16 = MAX_DAY_OF_YEAR + 1;

/// Highest sprint count a single day can hold (24h / 25min)
pub const MAX_DAILY_COUNT: u8 = 57;

/// Erased EEPROM cell
pub const EMPTY_VALUE: u8 = 0xFF;

/// Marks the cell right after the most recently written day
pub const END_MARKER: u8 = 0xFE;

/// Number of reserved log cells; `today + 2` is always addressable
pub const LOG_CELLS: u32 = LOOKAHEAD_CELL as u32 + 2;

// ============================================================================
// Configuration record
// ============================================================================

/// Start of the configuration block, clear of the counter log
pub const CONFIG_ADDR: u32 = 384;

/// Size of the configuration block (signature + version + payload)
pub const CONFIG_BLOCK_LEN: usize = 32;

/// First byte of an initialized configuration block
pub const CONFIG_SIGNATURE: u8 = 0xA5;

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 2;

/// Total EEPROM bytes the core addresses
pub const EEPROM_SIZE: usize = CONFIG_ADDR as usize + CONFIG_BLOCK_LEN;

/// Settle time after each byte written to the EEPROM
pub const WRITE_SETTLE_MS: u32 = 4;

// ============================================================================
// Calendar
// ============================================================================

/// Earliest year the RTC reading is trusted for
pub const MIN_YEAR: u16 = 2020;

/// Latest year the RTC reading is trusted for
pub const MAX_YEAR: u16 = 2099;

// ============================================================================
// Display
// ============================================================================

/// Mask covering all four progress LEDs
pub const ALL_LEDS: u8 = 0b1111;

/// Mask covering all four digits
pub const ALL_DIGITS: u8 = 0b1111;

/// Number of brightness steps the display supports
pub const BRIGHTNESS_LEVELS: u8 = 4;
