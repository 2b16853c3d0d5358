//! Hardware-independent core library for pomo-rs
//!
//! This crate contains all platform-agnostic logic for the sprint timer
//! appliance: calendar math, the day-indexed counter log and configuration
//! record kept in EEPROM, the statistics engine, the work/break scheduler
//! and the operating/menu state machine that ties them together.
//!
//! It is `#![no_std]` so it compiles on both embedded targets and desktop
//! hosts (for the simulator and tests). The display, buzzer, RTC and buttons
//! are reached through the traits in [`drivers`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod app_state;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod cues;
pub mod display;
pub mod drivers;
pub mod input;
pub mod sprint;
pub mod stats;
pub mod storage;
pub mod wake;

#[cfg(any(test, feature = "std"))]
pub mod mocks;
