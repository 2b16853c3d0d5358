//! Collaborator driver traits.
//!
//! The physical display, buzzer, RTC and buttons live outside the core. Each
//! is reached through one of these traits so the state machine can run on
//! the device and on the desktop simulator alike. All calls are blocking:
//! the main loop finishes one before making the next timing decision.

use crate::calendar::DateTime;
use crate::input::ButtonEvent;

/// Battery-backed real-time clock
pub trait ClockDriver {
    /// Current wall-clock reading.
    fn read(&mut self) -> DateTime;

    /// Sets the clock and restarts its oscillator.
    fn write(&mut self, now: &DateTime);

    /// Whether the oscillator stopped (e.g. after losing backup power).
    fn is_halted(&mut self) -> bool;
}

/// Four-character display plus the four progress LEDs
pub trait DisplayDriver {
    /// Shows up to four glyphs. `.` and `:` attach to the previous glyph.
    fn write_text(&mut self, text: &str);

    /// Brightness step, `0..BRIGHTNESS_LEVELS`.
    fn set_brightness(&mut self, level: u8);

    /// Turns the LEDs in `mask` steadily on or off.
    fn set_led(&mut self, mask: u8, on: bool);

    /// Starts or stops blinking the LEDs in `mask`.
    fn blink_led(&mut self, mask: u8, on: bool);

    /// Starts or stops blinking the digits in `mask`.
    fn blink_digit(&mut self, mask: u8, on: bool);
}

/// Piezo buzzer
pub trait AudioDriver {
    /// `count` beeps of `on_ms`, separated by `off_ms` of silence.
    fn beep(&mut self, on_ms: u16, off_ms: u16, count: u8);

    /// A single tone. A frequency of 0 is a rest.
    fn play_tone(&mut self, freq_hz: u16, duration_ms: u16);
}

/// Debounced button events, polled once per tick
pub trait ButtonSource {
    fn poll(&mut self) -> Option<ButtonEvent>;
}
