//! Drum pattern sequencer state.

use serde::{Deserialize, Serialize};

use crate::clock::ClockSource;
use crate::{IDLE_TIMEOUT_TICKS, NUM_PARTS};

/// Euclidean step counts, addressed by a 0..=11 code.
pub const EUCLIDEAN_STEP_COUNTS: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 8, 10, 12, 14, 16];

/// Step-count code selected for every part at init (16 steps).
pub const DEFAULT_STEPS_CODE: u8 = 11;

pub const MIN_INSTRUMENT: u8 = 20;
pub const MAX_INSTRUMENT: u8 = 108;
pub const DEFAULT_INSTRUMENTS: [u8; NUM_PARTS] = [36, 38, 42, 46];
pub const DEFAULT_CHANNEL: u8 = 9;

/// Step count for a code; codes past the table clamp to the longest pattern.
pub fn step_count(steps_code: u8) -> u8 {
    let last = EUCLIDEAN_STEP_COUNTS.len() - 1;
    EUCLIDEAN_STEP_COUNTS[(steps_code as usize).min(last)]
}

/// How held notes are turned into rhythms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SequencerMode {
    /// Each part plays a pattern from the preset table.
    #[default]
    Preset,
    /// Each part plays a Euclidean distribution of pulses over steps.
    Euclidean,
}

impl SequencerMode {
    pub fn from_value(value: u8) -> Self {
        if value == 0 {
            SequencerMode::Preset
        } else {
            SequencerMode::Euclidean
        }
    }

    pub fn value(self) -> u8 {
        match self {
            SequencerMode::Preset => 0,
            SequencerMode::Euclidean => 1,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "preset" | "ptn" => Some(SequencerMode::Preset),
            "euclidean" | "euc" => Some(SequencerMode::Euclidean),
            _ => None,
        }
    }
}

/// One drum voice.
///
/// Both parameter sets are kept so switching mode does not lose the other
/// mode's settings; only the set matching the active mode is read on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartState {
    /// Output note number.
    pub instrument: u8,
    /// Instrument currently sounding, 0 when silent.
    pub active_note: u8,
    /// Preset mode: key into the preset table.
    pub pattern_selector: u8,
    /// Euclidean mode: number of onsets, 0 mutes the part.
    pub pulses: u8,
    /// Euclidean mode: index into [`EUCLIDEAN_STEP_COUNTS`].
    pub steps_code: u8,
    pub step_counter: u8,
    pub bitmask: u16,
}

impl PartState {
    pub fn new(instrument: u8) -> Self {
        Self {
            instrument,
            active_note: 0,
            pattern_selector: 0,
            pulses: 0,
            steps_code: DEFAULT_STEPS_CODE,
            step_counter: 0,
            bitmask: 1,
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.active_note != 0
    }

    pub fn rewind(&mut self) {
        self.step_counter = 0;
        self.bitmask = 1;
    }
}

/// Transport and position of the pattern sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerState {
    /// Pulses elapsed inside the current 16th note, 0..=5.
    pub tick_counter: u8,
    /// Preset mode position, 0..=15.
    pub global_step: u8,
    /// `1 << global_step`.
    pub global_bitmask: u16,
    /// Ticks since the last note input or audible configuration.
    pub idle_ticks: u32,
    pub mode: SequencerMode,
    pub clk_source: ClockSource,
    pub running: bool,
    pub channel: u8,
}

impl Default for SequencerState {
    fn default() -> Self {
        Self {
            tick_counter: 0,
            global_step: 0,
            global_bitmask: 1,
            // Saturated so the first note on engages the internal clock.
            idle_ticks: IDLE_TIMEOUT_TICKS,
            mode: SequencerMode::Preset,
            clk_source: ClockSource::Internal,
            running: false,
            channel: DEFAULT_CHANNEL,
        }
    }
}

impl SequencerState {
    /// Back to the top of the bar.
    pub fn rewind(&mut self) {
        self.tick_counter = 0;
        self.global_step = 0;
        self.global_bitmask = 1;
    }

    pub fn is_idle(&self) -> bool {
        self.idle_ticks >= IDLE_TIMEOUT_TICKS
    }
}
