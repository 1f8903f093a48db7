//! Clock configuration: tempo, groove and where pulses come from.

use serde::{Deserialize, Serialize};

pub const MIN_BPM: u8 = 40;
pub const MAX_BPM: u8 = 240;
pub const DEFAULT_BPM: u8 = 120;
pub const MAX_GROOVE_AMOUNT: u8 = 127;

/// Whether the clock engine generates pulses or follows received ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockSource {
    #[default]
    Internal,
    External,
}

impl ClockSource {
    /// Parameter encoding: 0 = internal, anything else = external.
    pub fn from_value(value: u8) -> Self {
        if value == 0 {
            ClockSource::Internal
        } else {
            ClockSource::External
        }
    }

    pub fn value(self) -> u8 {
        match self {
            ClockSource::Internal => 0,
            ClockSource::External => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClockSource::Internal => "int",
            ClockSource::External => "ext",
        }
    }
}

/// Micro-timing profile applied to the generated pulse train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GrooveTemplate {
    #[default]
    Swing,
    Shuffle,
    Push,
    Lag,
    Human,
    Monkey,
}

impl GrooveTemplate {
    pub fn all() -> &'static [GrooveTemplate] {
        &[
            GrooveTemplate::Swing,
            GrooveTemplate::Shuffle,
            GrooveTemplate::Push,
            GrooveTemplate::Lag,
            GrooveTemplate::Human,
            GrooveTemplate::Monkey,
        ]
    }

    /// Out-of-range indices clamp to the last template.
    pub fn from_index(index: u8) -> Self {
        let all = Self::all();
        all[(index as usize).min(all.len() - 1)]
    }

    pub fn index(self) -> u8 {
        match self {
            GrooveTemplate::Swing => 0,
            GrooveTemplate::Shuffle => 1,
            GrooveTemplate::Push => 2,
            GrooveTemplate::Lag => 3,
            GrooveTemplate::Human => 4,
            GrooveTemplate::Monkey => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GrooveTemplate::Swing => "swg",
            GrooveTemplate::Shuffle => "shf",
            GrooveTemplate::Push => "psh",
            GrooveTemplate::Lag => "lag",
            GrooveTemplate::Human => "hum",
            GrooveTemplate::Monkey => "mnk",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "swing" | "swg" => Some(GrooveTemplate::Swing),
            "shuffle" | "shf" => Some(GrooveTemplate::Shuffle),
            "push" | "psh" => Some(GrooveTemplate::Push),
            "lag" => Some(GrooveTemplate::Lag),
            "human" | "hum" => Some(GrooveTemplate::Human),
            "monkey" | "mnk" => Some(GrooveTemplate::Monkey),
            _ => None,
        }
    }
}

/// Tempo and groove of the clock engine plus its run flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub running: bool,
    pub tempo_bpm: u8,
    pub groove_template: GrooveTemplate,
    pub groove_amount: u8,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            running: false,
            tempo_bpm: DEFAULT_BPM,
            groove_template: GrooveTemplate::Swing,
            groove_amount: 0,
        }
    }
}

impl ClockState {
    /// Store tempo and groove, clamping into their domains.
    pub fn set_tempo_groove(&mut self, bpm: u8, template: GrooveTemplate, amount: u8) {
        self.tempo_bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        self.groove_template = template;
        self.groove_amount = amount.min(MAX_GROOVE_AMOUNT);
    }
}
