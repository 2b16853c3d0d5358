//! Wake-from-sleep signal.
//!
//! The wake interrupt only ever calls [`WakeSignal::notify`]; the main loop
//! polls [`WakeSignal::take`] while sleeping. Nothing else crosses the
//! interrupt boundary.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

pub struct WakeSignal {
    inner: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeSignal {
    pub const fn new() -> Self {
        Self {
            inner: Signal::new(),
        }
    }

    /// Raises the flag. Safe to call from interrupt context.
    pub fn notify(&self) {
        self.inner.signal(());
    }

    /// Consumes the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.inner.try_take().is_some()
    }
}

/// Global wake flag shared with the wake interrupt handler
pub static WAKE: WakeSignal = WakeSignal::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_is_consumed_once() {
        let wake = WakeSignal::new();
        assert!(!wake.take());
        wake.notify();
        wake.notify();
        assert!(wake.take());
        assert!(!wake.take());
    }
}
