//! Non-volatile storage: the byte-level EEPROM wrapper, the day-indexed
//! counter log and the configuration record.
//!
//! ## Address map
//!
//! | Range      | Contents                                   |
//! |------------|--------------------------------------------|
//! | 0          | unused                                     |
//! | 1..=366    | sprint count per day-of-year               |
//! | 367..=368  | lookahead cells (end marker, boundary check)|
//! | 384..416   | configuration block                        |

pub mod config_store;
pub mod counter_log;
pub mod eeprom;

pub use config_store::ConfigLoad;
pub use counter_log::CounterLog;
pub use eeprom::Eeprom;
