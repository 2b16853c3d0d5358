//! Day-indexed persistent sprint counter.
//!
//! Cell `d` holds the number of sprints completed on day-of-year `d`. The
//! cell right after the most recently written day holds [`END_MARKER`]; a
//! day's count is only trusted when its right neighbour carries the marker.
//!
//! Write order for a new count is: count, then remove any other marker, then
//! place the marker. Losing power in between leaves at worst *no* marker,
//! which the next boot treats as "no saved counter for today" and repairs.

use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;
use log::{debug, info, warn};

use super::eeprom::Eeprom;
use crate::app_state::AppError;
use crate::calendar::{day_of_year_to_date, days_in_year};
use crate::constants::{EMPTY_VALUE, END_MARKER, LOG_CELLS, LOOKAHEAD_CELL, MAX_DAILY_COUNT};
use crate::stats::CellSource;

/// Borrowed view of the counter log region of the EEPROM
pub struct CounterLog<'a, S, D>
where
    S: Storage,
    D: DelayNs,
{
    eeprom: &'a mut Eeprom<S, D>,
}

impl<'a, S, D> CounterLog<'a, S, D>
where
    S: Storage,
    S::Error: core::fmt::Debug,
    D: DelayNs,
{
    pub fn new(eeprom: &'a mut Eeprom<S, D>) -> Self {
        Self { eeprom }
    }

    /// Raw cell contents, no validation.
    pub fn read_cell(&mut self, day: u16) -> Result<u8, AppError> {
        self.eeprom.read_byte(u32::from(day))
    }

    fn write_cell(&mut self, day: u16, value: u8) -> Result<(), AppError> {
        self.eeprom.write_byte(u32::from(day), value)
    }

    /// Stores today's count and moves the end marker to `day + 1`.
    pub fn write_count(&mut self, day: u16, count: u8) -> Result<(), AppError> {
        let count = count.min(MAX_DAILY_COUNT);
        self.write_cell(day, count)?;
        self.place_end_marker(day + 1)?;
        debug!("Saved {} sprints for day {}", count, day);
        Ok(())
    }

    /// Clears every marker except one at `cell`, then writes the marker there.
    fn place_end_marker(&mut self, cell: u16) -> Result<(), AppError> {
        for other in 1..=LOOKAHEAD_CELL {
            if other != cell && self.read_cell(other)? == END_MARKER {
                debug!("Removing stray end marker at {}", other);
                self.write_cell(other, EMPTY_VALUE)?;
            }
        }
        self.write_cell(cell, END_MARKER)
    }

    /// Location of the end marker, if the log has one.
    pub fn find_end_marker(&mut self) -> Result<Option<u16>, AppError> {
        for cell in 1..=LOOKAHEAD_CELL {
            if self.read_cell(cell)? == END_MARKER {
                return Ok(Some(cell));
            }
        }
        Ok(None)
    }

    /// Fails when the cell two days ahead already holds data.
    ///
    /// That cell should only ever be empty: data there is left over from a
    /// statistics cycle that was never cleared. Only `EMPTY_VALUE` passes, so
    /// any other leftover byte trips the check as well.
    pub fn validate_boundary(&mut self, today: u16) -> Result<(), AppError> {
        let value = self.read_cell(today + 2)?;
        if value != EMPTY_VALUE {
            warn!("Lookahead cell {} holds {:#04x}, log not cleared", today + 2, value);
            return Err(AppError::UnclearedLog);
        }
        Ok(())
    }

    /// Brings the log up to date for `today` and returns today's count.
    ///
    /// Days skipped since the last saved day are filled with explicit zeros
    /// so no day is ever silently missing. Running this twice in a row is a
    /// no-op the second time.
    pub fn reconcile_on_boot(&mut self, today: u16, year: u16) -> Result<u8, AppError> {
        if self.read_cell(today + 1)? == END_MARKER {
            let count = self.read_cell(today)?;
            debug!("Counter for day {} is current: {}", today, count);
            return Ok(if count <= MAX_DAILY_COUNT { count } else { 0 });
        }

        let Some(marker) = self.find_end_marker()? else {
            info!("No saved counter found, starting at zero");
            return Ok(0);
        };
        let latest = marker.saturating_sub(1);

        match day_of_year_to_date(latest, today, year) {
            Some(date) => info!(
                "Last saved day {} ({}-{:02}-{:02}), today is {}",
                latest, date.year, date.month, date.day, today
            ),
            None => info!("Last saved day {}, today is {}", latest, today),
        }

        if today < latest {
            let previous_year_len = days_in_year(year.saturating_sub(1));
            self.fill_zeros(latest + 1, previous_year_len)?;
            self.fill_zeros(1, today)?;
        } else {
            self.fill_zeros(latest + 1, today)?;
        }
        self.place_end_marker(today + 1)?;

        Ok(0)
    }

    fn fill_zeros(&mut self, from: u16, to: u16) -> Result<(), AppError> {
        if from > to {
            return Ok(());
        }
        info!("Filling skipped days {}..={} with zero", from, to);
        for day in from..=to {
            self.write_cell(day, 0)?;
        }
        Ok(())
    }

    /// Repairs the log after the clock was set by hand.
    ///
    /// A marker beyond `today + 1` belongs to a date that now lies in the
    /// future; it is dropped before the regular reconciliation runs.
    pub fn repair_after_clock_change(&mut self, today: u16, year: u16) -> Result<u8, AppError> {
        if let Some(marker) = self.find_end_marker()? {
            if marker > today + 1 {
                warn!("End marker at {} is ahead of the new date, dropping it", marker);
                self.write_cell(marker, EMPTY_VALUE)?;
            }
        }
        self.reconcile_on_boot(today, year)
    }

    /// Resets every log cell to empty.
    pub fn clear_all(&mut self) -> Result<(), AppError> {
        info!("Clearing all statistics");
        for cell in 0..LOG_CELLS {
            self.eeprom.write_byte(cell, EMPTY_VALUE)?;
        }
        Ok(())
    }
}

impl<S, D> CellSource for CounterLog<'_, S, D>
where
    S: Storage,
    S::Error: core::fmt::Debug,
    D: DelayNs,
{
    fn cell(&mut self, day: u16) -> Result<u8, AppError> {
        self.read_cell(day)
    }
}
