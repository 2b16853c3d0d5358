//! Terminal simulator for the pomo-rs sprint timer appliance.
//!
//! Runs the `pomo-core` state machine on the desktop: the host clock stands
//! in for the RTC, the EEPROM is a file on disk, the display and buzzer are
//! printed to the terminal and buttons are typed on stdin (one key per line,
//! then Enter).
//!
//! # Key bindings
//!
//! | Key | Action                                   |
//! |-----|------------------------------------------|
//! | b   | Back, short press                        |
//! | s   | Switch, short press                      |
//! | o   | OK, short press                          |
//! | B   | Back, long press (hold + release)        |
//! | S   | Switch, long press                       |
//! | O   | OK, long press                           |
//! | w   | Wake interrupt                           |
//! | q   | Quit                                     |
//!
//! The EEPROM image path is the first argument (default `pomo-eeprom.bin`).
//! Set `RUST_LOG=debug` for state transitions.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Datelike, Local, NaiveDate, TimeDelta, Timelike};
use embedded_hal::delay::DelayNs;
use embedded_storage::{ReadStorage, Storage};
use log::{error, info, warn};

use pomo_core::app_state::App;
use pomo_core::calendar::DateTime;
use pomo_core::constants::{EEPROM_SIZE, TICK_MS};
use pomo_core::drivers::{AudioDriver, ButtonSource, ClockDriver, DisplayDriver};
use pomo_core::input::{Button, ButtonEvent};
use pomo_core::storage::Eeprom;
use pomo_core::wake::WAKE;

const DEFAULT_IMAGE: &str = "pomo-eeprom.bin";

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Host wall clock shifted by whatever offset the user last set.
struct HostClock {
    offset: TimeDelta,
}

impl ClockDriver for HostClock {
    fn read(&mut self) -> DateTime {
        let now = Local::now().naive_local() + self.offset;
        DateTime::new(
            now.year().clamp(0, i32::from(u16::MAX)) as u16,
            now.month() as u8,
            now.day() as u8,
            now.hour() as u8,
            now.minute() as u8,
            now.second() as u8,
        )
    }

    fn write(&mut self, now: &DateTime) {
        let target = NaiveDate::from_ymd_opt(i32::from(now.year), now.month.into(), now.day.into())
            .and_then(|d| d.and_hms_opt(now.hour.into(), now.minute.into(), now.second.into()));
        match target {
            Some(target) => {
                self.offset = target - Local::now().naive_local();
                info!("Clock offset is now {}s", self.offset.num_seconds());
            }
            None => warn!("Ignoring invalid clock setting {:?}", now),
        }
    }

    fn is_halted(&mut self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Display and audio
// ---------------------------------------------------------------------------

/// Prints the panel whenever something on it changes.
#[derive(Default)]
struct TerminalDisplay {
    text: String,
    leds: u8,
    blinking_leds: u8,
    blinking_digits: u8,
}

impl TerminalDisplay {
    fn print(&self) {
        let leds: String = (0..4)
            .map(|i| {
                let bit = 1 << i;
                if self.blinking_leds & bit != 0 {
                    '*'
                } else if self.leds & bit != 0 {
                    'o'
                } else {
                    '.'
                }
            })
            .collect();
        let blink = if self.blinking_digits != 0 { " (blinking)" } else { "" };
        println!("[{:>5}] {}{}", self.text, leds, blink);
    }
}

fn apply(current: u8, mask: u8, on: bool) -> u8 {
    if on { current | mask } else { current & !mask }
}

impl DisplayDriver for TerminalDisplay {
    fn write_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.print();
    }

    fn set_brightness(&mut self, level: u8) {
        println!("[brightness {}]", level + 1);
    }

    fn set_led(&mut self, mask: u8, on: bool) {
        let leds = apply(self.leds, mask, on);
        if leds != self.leds {
            self.leds = leds;
            self.print();
        }
    }

    fn blink_led(&mut self, mask: u8, on: bool) {
        let leds = apply(self.blinking_leds, mask, on);
        if leds != self.blinking_leds {
            self.blinking_leds = leds;
            self.print();
        }
    }

    fn blink_digit(&mut self, mask: u8, on: bool) {
        let digits = apply(self.blinking_digits, mask, on);
        if digits != self.blinking_digits {
            self.blinking_digits = digits;
            self.print();
        }
    }
}

struct TerminalAudio;

impl AudioDriver for TerminalAudio {
    fn beep(&mut self, on_ms: u16, off_ms: u16, count: u8) {
        println!("♪ beep x{} ({}ms on / {}ms off)\x07", count, on_ms, off_ms);
    }

    fn play_tone(&mut self, freq_hz: u16, duration_ms: u16) {
        if freq_hz == 0 {
            println!("♪ rest {}ms", duration_ms);
        } else {
            println!("♪ {}Hz {}ms", freq_hz, duration_ms);
        }
    }
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

enum Input {
    Button(ButtonEvent),
    Quit,
}

fn spawn_keyboard() -> Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for key in line.trim().chars() {
                let (button, long) = match key {
                    'b' => (Button::Back, false),
                    's' => (Button::Switch, false),
                    'o' => (Button::Ok, false),
                    'B' => (Button::Back, true),
                    'S' => (Button::Switch, true),
                    'O' => (Button::Ok, true),
                    'w' => {
                        // Stands in for the wake interrupt
                        WAKE.notify();
                        continue;
                    }
                    'q' => {
                        tx.send(Input::Quit).ok();
                        return;
                    }
                    other => {
                        warn!("Unknown key {:?}", other);
                        continue;
                    }
                };
                let events: &[ButtonEvent] = if long {
                    &[ButtonEvent::LongStart(button), ButtonEvent::LongRelease(button)]
                } else {
                    &[ButtonEvent::Short(button)]
                };
                for &event in events {
                    if tx.send(Input::Button(event)).is_err() {
                        return;
                    }
                }
            }
        }
        tx.send(Input::Quit).ok();
    });
    rx
}

/// Delivers one queued key per tick, like the debouncer would.
struct KeyboardButtons {
    rx: Receiver<Input>,
    quit: bool,
}

impl ButtonSource for KeyboardButtons {
    fn poll(&mut self) -> Option<ButtonEvent> {
        match self.rx.try_recv() {
            Ok(Input::Button(event)) => Some(event),
            Ok(Input::Quit) | Err(TryRecvError::Disconnected) => {
                self.quit = true;
                None
            }
            Err(TryRecvError::Empty) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// EEPROM image kept in memory and written through to a file.
struct FileEeprom {
    path: PathBuf,
    bytes: Vec<u8>,
}

#[derive(Debug)]
enum FileEepromError {
    OutOfBounds,
    Io(io::ErrorKind),
}

impl FileEeprom {
    fn open(path: PathBuf) -> Self {
        let mut bytes = vec![0xFF; EEPROM_SIZE];
        match fs::read(&path) {
            Ok(image) => {
                let len = image.len().min(EEPROM_SIZE);
                bytes[..len].copy_from_slice(&image[..len]);
                info!("Loaded EEPROM image from {}", path.display());
            }
            Err(e) => info!("Starting with an erased EEPROM ({}: {})", path.display(), e),
        }
        Self { path, bytes }
    }
}

impl ReadStorage for FileEeprom {
    type Error = FileEepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let src = self
            .bytes
            .get(start..start + bytes.len())
            .ok_or(FileEepromError::OutOfBounds)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }
}

impl Storage for FileEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let dst = self
            .bytes
            .get_mut(start..start + bytes.len())
            .ok_or(FileEepromError::OutOfBounds)?;
        dst.copy_from_slice(bytes);
        fs::write(&self.path, &self.bytes).map_err(|e| FileEepromError::Io(e.kind()))
    }
}

struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE));
    info!("pomo-simulator: keys b/s/o short, B/S/O long, w wake, q quit");

    let buttons = KeyboardButtons {
        rx: spawn_keyboard(),
        quit: false,
    };
    let mut app = App::new(
        HostClock {
            offset: TimeDelta::zero(),
        },
        TerminalDisplay::default(),
        TerminalAudio,
        buttons,
        Eeprom::new(FileEeprom::open(path), StdDelay),
        &WAKE,
    );
    app.boot();

    let tick = Duration::from_millis(u64::from(TICK_MS));
    let mut deadline = Instant::now();
    loop {
        app.tick();
        if app.buttons_mut().quit {
            info!("Bye");
            break;
        }

        deadline += tick;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        } else if now - deadline > tick * 10 {
            error!("Main loop fell {}ms behind", (now - deadline).as_millis());
            deadline = now;
        }
    }
}
