use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;
use log::error;

use crate::app_state::AppError;
use crate::constants::WRITE_SETTLE_MS;

/// Byte-granular, rate-limited access to the non-volatile store.
///
/// Every real write blocks for [`WRITE_SETTLE_MS`] before returning, so two
/// writes never overlap. Writes of an unchanged value are skipped to spare
/// the cell's endurance.
pub struct Eeprom<S, D>
where
    S: Storage,
    D: DelayNs,
{
    storage: S,
    delay: D,
}

impl<S, D> Eeprom<S, D>
where
    S: Storage,
    S::Error: core::fmt::Debug,
    D: DelayNs,
{
    pub fn new(storage: S, delay: D) -> Self {
        Self { storage, delay }
    }

    pub fn read_byte(&mut self, addr: u32) -> Result<u8, AppError> {
        let mut buf = [0u8; 1];
        self.storage.read(addr, &mut buf).map_err(|e| {
            error!("EEPROM read at {} failed: {:?}", addr, e);
            AppError::Storage
        })?;
        Ok(buf[0])
    }

    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), AppError> {
        if self.read_byte(addr)? == value {
            return Ok(());
        }

        self.storage.write(addr, &[value]).map_err(|e| {
            error!("EEPROM write at {} failed: {:?}", addr, e);
            AppError::Storage
        })?;
        self.delay.delay_ms(WRITE_SETTLE_MS);
        Ok(())
    }

    pub fn read_block(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), AppError> {
        self.storage.read(addr, buf).map_err(|e| {
            error!("EEPROM block read at {} failed: {:?}", addr, e);
            AppError::Storage
        })
    }

    /// Writes a block one byte at a time, honouring the settle delay.
    pub fn write_block(&mut self, addr: u32, bytes: &[u8]) -> Result<(), AppError> {
        for (offset, &value) in bytes.iter().enumerate() {
            self.write_byte(addr + offset as u32, value)?;
        }
        Ok(())
    }

    /// Hands back the underlying storage (used by hosts that persist images).
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
