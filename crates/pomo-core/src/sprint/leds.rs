use super::Interval;
use crate::constants::{ALL_LEDS, SPRINTS_PER_LONG_BREAK};

/// Progress LED state: bit `n` is LED `n`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedPattern {
    pub steady: u8,
    pub blink: u8,
}

/// Maps today's sprint counter onto the four-LED progress ring.
///
/// Finished sprints of the current round are lit steadily. During work the
/// LED of the sprint in progress blinks; during a break nothing blinks and
/// the sprint just finished shows steady, so the fourth one lights the
/// whole ring.
pub fn led_pattern(counter: u8, interval: Interval) -> LedPattern {
    let done = counter % SPRINTS_PER_LONG_BREAK;
    let prefix = (1u8 << done) - 1;

    match interval {
        Interval::Work => LedPattern {
            steady: prefix,
            blink: 1 << done,
        },
        _ if done == 0 && counter > 0 => LedPattern {
            steady: ALL_LEDS,
            blink: 0,
        },
        _ => LedPattern {
            steady: prefix,
            blink: 0,
        },
    }
}
