//! In-memory stand-ins for the collaborator drivers.
//!
//! Used by the unit tests and by the desktop simulator.

use embedded_hal::delay::DelayNs;
use embedded_storage::{ReadStorage, Storage};
use heapless::{Deque, String, Vec};

use crate::calendar::DateTime;
use crate::constants::EEPROM_SIZE;
use crate::drivers::{AudioDriver, ButtonSource, ClockDriver, DisplayDriver};
use crate::input::ButtonEvent;

/// Erased EEPROM image held in RAM
pub struct MemoryEeprom {
    bytes: [u8; EEPROM_SIZE],
    writes: usize,
}

impl MemoryEeprom {
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; EEPROM_SIZE],
            writes: 0,
        }
    }

    /// Builds an image from existing bytes; missing bytes stay erased.
    pub fn from_image(image: &[u8]) -> Self {
        let mut eeprom = Self::new();
        let len = image.len().min(EEPROM_SIZE);
        eeprom.bytes[..len].copy_from_slice(&image[..len]);
        eeprom
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of write calls that reached the image
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Default for MemoryEeprom {
    fn default() -> Self {
        Self::new()
    }
}

/// Error returned for accesses beyond the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds;

impl ReadStorage for MemoryEeprom {
    type Error = OutOfBounds;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let src = self.bytes.get(start..start + bytes.len()).ok_or(OutOfBounds)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }
}

impl Storage for MemoryEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let dst = self
            .bytes
            .get_mut(start..start + bytes.len())
            .ok_or(OutOfBounds)?;
        dst.copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

/// Delay that returns immediately but remembers how long it was asked to wait
#[derive(Debug, Default)]
pub struct NoopDelay {
    pub total_ns: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Settable real-time clock
#[derive(Debug, Clone)]
pub struct MockClock {
    pub now: DateTime,
    pub halted: bool,
}

impl MockClock {
    pub fn new(now: DateTime) -> Self {
        Self { now, halted: false }
    }
}

impl ClockDriver for MockClock {
    fn read(&mut self) -> DateTime {
        self.now
    }

    fn write(&mut self, now: &DateTime) {
        self.now = *now;
        self.halted = false;
    }

    fn is_halted(&mut self) -> bool {
        self.halted
    }
}

/// Display that records what it was last told to show
#[derive(Debug, Default)]
pub struct MockDisplay {
    pub text: String<8>,
    pub brightness: u8,
    pub leds: u8,
    pub blinking_leds: u8,
    pub blinking_digits: u8,
    pub writes: usize,
}

fn apply_mask(current: u8, mask: u8, on: bool) -> u8 {
    if on { current | mask } else { current & !mask }
}

impl DisplayDriver for MockDisplay {
    fn write_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text).ok();
        self.writes += 1;
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }

    fn set_led(&mut self, mask: u8, on: bool) {
        self.leds = apply_mask(self.leds, mask, on);
    }

    fn blink_led(&mut self, mask: u8, on: bool) {
        self.blinking_leds = apply_mask(self.blinking_leds, mask, on);
    }

    fn blink_digit(&mut self, mask: u8, on: bool) {
        self.blinking_digits = apply_mask(self.blinking_digits, mask, on);
    }
}

/// Audio sink that counts what would have been played
#[derive(Debug, Default)]
pub struct MockAudio {
    pub beeps: usize,
    pub tones: Vec<(u16, u16), 64>,
}

impl AudioDriver for MockAudio {
    fn beep(&mut self, _on_ms: u16, _off_ms: u16, count: u8) {
        self.beeps += usize::from(count);
    }

    fn play_tone(&mut self, freq_hz: u16, duration_ms: u16) {
        self.tones.push((freq_hz, duration_ms)).ok();
    }
}

/// Button source fed from a queue, one event per poll
#[derive(Debug, Default)]
pub struct ScriptedButtons {
    events: Deque<ButtonEvent, 32>,
}

impl ScriptedButtons {
    pub fn push(&mut self, event: ButtonEvent) -> Result<(), ButtonEvent> {
        self.events.push_back(event)
    }
}

impl ButtonSource for ScriptedButtons {
    fn poll(&mut self) -> Option<ButtonEvent> {
        self.events.pop_front()
    }
}
