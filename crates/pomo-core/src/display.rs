//! Four-glyph display rendering with change tracking.
//!
//! The state machine describes what should be visible as a [`Frame`] every
//! tick; [`Screen`] compares it with what was last sent and only forwards
//! the differences to the [`DisplayDriver`].

use core::fmt::Write;

use heapless::String;
use log::trace;

use crate::app_state::AppError;
use crate::constants::{ALL_DIGITS, ALL_LEDS};
use crate::drivers::DisplayDriver;
use crate::sprint::LedPattern;

/// Everything visible on the front panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub text: String<8>,
    pub leds: LedPattern,
    pub blink_digits: u8,
}

impl Frame {
    pub fn text(text: &str) -> Self {
        let mut frame = Self::default();
        frame.text.push_str(text).ok();
        frame
    }

    pub fn with_leds(mut self, leds: LedPattern) -> Self {
        self.leds = leds;
        self
    }

    pub fn blinking(mut self, digits: u8) -> Self {
        self.blink_digits = digits;
        self
    }
}

/// Display driver plus a cache of the last presented frame
pub struct Screen<D: DisplayDriver> {
    driver: D,
    shown: Frame,
    brightness: Option<u8>,
    dirty: bool,
}

impl<D: DisplayDriver> Screen<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            shown: Frame::default(),
            brightness: None,
            dirty: true,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Forces the next frame to be sent in full.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn set_brightness(&mut self, level: u8) {
        if self.brightness != Some(level) {
            self.driver.set_brightness(level);
            self.brightness = Some(level);
        }
    }

    /// Sends whatever differs between `frame` and the last frame shown.
    pub fn present(&mut self, frame: &Frame) {
        let full = core::mem::take(&mut self.dirty);

        if full || frame.text != self.shown.text {
            trace!("Display: {:?}", frame.text.as_str());
            self.driver.write_text(&frame.text);
        }

        if full {
            self.driver.set_led(ALL_LEDS, false);
            self.driver.blink_led(ALL_LEDS, false);
            self.driver.blink_digit(ALL_DIGITS, false);
            self.driver.set_led(frame.leds.steady, true);
            self.driver.blink_led(frame.leds.blink, true);
            self.driver.blink_digit(frame.blink_digits, true);
        } else {
            apply_mask_diff(self.shown.leds.steady, frame.leds.steady, |mask, on| {
                self.driver.set_led(mask, on)
            });
            apply_mask_diff(self.shown.leds.blink, frame.leds.blink, |mask, on| {
                self.driver.blink_led(mask, on)
            });
            apply_mask_diff(self.shown.blink_digits, frame.blink_digits, |mask, on| {
                self.driver.blink_digit(mask, on)
            });
        }

        self.shown = frame.clone();
    }
}

fn apply_mask_diff(old: u8, new: u8, mut apply: impl FnMut(u8, bool)) {
    let off = old & !new;
    let on = new & !old;
    if off != 0 {
        apply(off, false);
    }
    if on != 0 {
        apply(on, true);
    }
}

/// `MM:SS`
pub fn format_countdown(minutes: u8, seconds: u8) -> String<8> {
    let mut text = String::new();
    write!(text, "{:02}:{:02}", minutes, seconds).ok();
    text
}

/// Renders a fixed-point (×10) statistic into four glyphs.
///
/// `dd.d` below 100.0, whole numbers up to 9999, `----` beyond.
pub fn format_stat(value_x10: u32) -> String<8> {
    let mut text = String::new();
    if value_x10 < 1000 {
        write!(text, "{:>3}.{}", value_x10 / 10, value_x10 % 10).ok();
    } else if value_x10 / 10 <= 9999 {
        write!(text, "{:>4}", value_x10 / 10).ok();
    } else {
        text.push_str("----").ok();
    }
    text
}

/// `Er N`
pub fn format_error(error: AppError) -> String<8> {
    let mut text = String::new();
    write!(text, "Er {}", error.code()).ok();
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockDisplay;

    #[test]
    fn stat_formatting() {
        assert_eq!(format_stat(0).as_str(), "  0.0");
        assert_eq!(format_stat(33).as_str(), "  3.3");
        assert_eq!(format_stat(999).as_str(), " 99.9");
        assert_eq!(format_stat(1000).as_str(), " 100");
        assert_eq!(format_stat(99_999).as_str(), "9999");
        assert_eq!(format_stat(100_000).as_str(), "----");
    }

    #[test]
    fn countdown_and_error_text() {
        assert_eq!(format_countdown(25, 0).as_str(), "25:00");
        assert_eq!(format_countdown(4, 7).as_str(), "04:07");
        assert_eq!(format_error(AppError::UnclearedLog).as_str(), "Er 3");
    }

    #[test]
    fn unchanged_frame_is_not_resent() {
        let mut screen = Screen::new(MockDisplay::default());
        let frame = Frame::text("25:00");
        screen.present(&frame);
        screen.present(&frame);
        assert_eq!(screen.driver().writes, 1);

        screen.present(&Frame::text("24:59"));
        assert_eq!(screen.driver().writes, 2);
        assert_eq!(screen.driver().text.as_str(), "24:59");
    }

    #[test]
    fn led_changes_are_diffed() {
        let mut screen = Screen::new(MockDisplay::default());
        let leds = LedPattern {
            steady: 0b0011,
            blink: 0b0100,
        };
        screen.present(&Frame::text("x").with_leds(leds));
        assert_eq!(screen.driver().leds, 0b0011);
        assert_eq!(screen.driver().blinking_leds, 0b0100);

        let leds = LedPattern {
            steady: 0b0111,
            blink: 0,
        };
        screen.present(&Frame::text("x").with_leds(leds).blinking(0b1111));
        assert_eq!(screen.driver().leds, 0b0111);
        assert_eq!(screen.driver().blinking_leds, 0);
        assert_eq!(screen.driver().blinking_digits, 0b1111);
    }

    #[test]
    fn brightness_only_sent_on_change() {
        let mut screen = Screen::new(MockDisplay::default());
        screen.set_brightness(2);
        screen.driver_mut().brightness = 0;
        screen.set_brightness(2);
        assert_eq!(screen.driver().brightness, 0);
        screen.set_brightness(3);
        assert_eq!(screen.driver().brightness, 3);
    }
}
