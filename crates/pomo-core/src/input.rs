//! Button events as delivered by the debouncer

/// The three front-panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Back / select-decrement
    Back,
    /// Cycle to the next item or value
    Switch,
    /// Confirm / enter
    Ok,
}

/// What happened to a button since the last poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Released before the long-press threshold
    Short(Button),
    /// Held past the long-press threshold (fires once, while still held)
    LongStart(Button),
    /// Released after a long press
    LongRelease(Button),
}

impl ButtonEvent {
    pub fn button(self) -> Button {
        match self {
            Self::Short(b) | Self::LongStart(b) | Self::LongRelease(b) => b,
        }
    }
}
