//! Swing timing policies.
//!
//! A policy shifts individual clock pulses earlier or later. Offsets are
//! expressed in timer ticks and should cancel out over a bar so the average
//! tempo stays put.

use pulsebox_types::{GrooveTemplate, PULSES_PER_STEP};

/// Timing offset applied to the pulse at `tick_index` (0..96 inside a bar of
/// 16th notes) given the unswung `pulse_interval` in timer ticks.
pub trait SwingPolicy: Send + Sync {
    fn offset(
        &self,
        template: GrooveTemplate,
        amount: u8,
        pulse_interval: u32,
        tick_index: u8,
    ) -> i32;
}

/// Step curves, one weight per 16th note in 1/128ths of a pulse interval.
#[derive(Debug, Clone, Copy)]
pub struct GrooveTable {
    curves: [[i8; 16]; 6],
}

pub const GROOVE_CURVES: [[i8; 16]; 6] = [
    // Swing
    [32, -32, 32, -32, 32, -32, 32, -32, 32, -32, 32, -32, 32, -32, 32, -32],
    // Shuffle (triplet feel at full amount)
    [43, -43, 43, -43, 43, -43, 43, -43, 43, -43, 43, -43, 43, -43, 43, -43],
    // Push: the last 16th of each beat lands early
    [0, 0, -24, 24, 0, 0, -24, 24, 0, 0, -24, 24, 0, 0, -24, 24],
    // Lag: the last 16th of each beat lands late
    [0, 0, 24, -24, 0, 0, 24, -24, 0, 0, 24, -24, 0, 0, 24, -24],
    // Human
    [6, -4, 10, -8, -3, 7, -9, 2, 5, -6, 3, -5, -7, 8, -2, 3],
    // Monkey
    [20, -12, 28, -36, 12, -20, 30, -22, 16, -8, 24, -32, 8, -16, 26, -18],
];

pub static DEFAULT_GROOVE: GrooveTable = GrooveTable { curves: GROOVE_CURVES };

impl GrooveTable {
    pub const fn new(curves: [[i8; 16]; 6]) -> Self {
        Self { curves }
    }

    pub fn weight(&self, template: GrooveTemplate, step: usize) -> i8 {
        self.curves[template.index() as usize][step % 16]
    }
}

impl Default for GrooveTable {
    fn default() -> Self {
        DEFAULT_GROOVE
    }
}

impl SwingPolicy for GrooveTable {
    fn offset(
        &self,
        template: GrooveTemplate,
        amount: u8,
        pulse_interval: u32,
        tick_index: u8,
    ) -> i32 {
        if amount == 0 {
            return 0;
        }
        let step = (tick_index / PULSES_PER_STEP) as usize;
        let weight = self.weight(template, step) as i64;
        let scaled = pulse_interval as i64 * weight * amount.min(127) as i64 / (127 * 128);
        scaled as i32
    }
}

/// No timing modulation at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Straight;

impl SwingPolicy for Straight {
    fn offset(&self, _: GrooveTemplate, _: u8, _: u32, _: u8) -> i32 {
        0
    }
}
