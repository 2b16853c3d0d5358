//! Short tone cues played when a sprint completes

use crate::config::Tune;

/// `(frequency in Hz, duration in ms)`; frequency 0 is a rest
pub type Note = (u16, u16);

/// Number of selectable cues
pub const TUNE_COUNT: u8 = 4;

const RISING: &[Note] = &[(523, 120), (659, 120), (784, 120), (1047, 240)];
const FALLING: &[Note] = &[(1047, 120), (784, 120), (659, 120), (523, 240)];
const DOUBLE: &[Note] = &[(880, 90), (0, 60), (880, 90), (0, 200), (880, 90), (0, 60), (880, 90)];
const FANFARE: &[Note] = &[(392, 100), (523, 100), (659, 100), (784, 300), (659, 100), (784, 400)];

const CUES: [&[Note]; TUNE_COUNT as usize] = [RISING, FALLING, DOUBLE, FANFARE];

/// Small xorshift generator for the "random" tune setting
#[derive(Debug, Clone, Copy)]
pub struct Xorshift(u32);

impl Xorshift {
    pub const fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

/// Resolves the tune setting to the notes to play, if any.
pub fn select(tune: Tune, rng: &mut Xorshift) -> Option<&'static [Note]> {
    match tune {
        Tune::Off => None,
        Tune::Random => Some(CUES[(rng.next_u32() % u32::from(TUNE_COUNT)) as usize]),
        Tune::Cue(index) => Some(CUES[usize::from(index % TUNE_COUNT)]),
    }
}
