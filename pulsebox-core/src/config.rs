use std::path::{Path, PathBuf};

use serde::Deserialize;

use pulsebox_types::clock::{DEFAULT_BPM, MAX_BPM, MAX_GROOVE_AMOUNT, MIN_BPM};
use pulsebox_types::sequencer::{
    DEFAULT_CHANNEL, DEFAULT_INSTRUMENTS, MAX_INSTRUMENT, MIN_INSTRUMENT,
};
use pulsebox_types::{ClockSource, GrooveTemplate, SequencerMode, NUM_PARTS};

use crate::clock::DEFAULT_TIMER_RATE_HZ;
use crate::note_stack::{DEFAULT_CAPACITY, MAX_SLOTS};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    clock: ClockConfig,
    #[serde(default)]
    sequencer: SequencerConfig,
    #[serde(default)]
    host: HostConfig,
}

#[derive(Deserialize, Default)]
struct ClockConfig {
    bpm: Option<u16>,
    groove_template: Option<String>,
    groove_amount: Option<u16>,
    timer_rate_hz: Option<u32>,
}

#[derive(Deserialize, Default)]
struct SequencerConfig {
    mode: Option<String>,
    clock_source: Option<String>,
    channel: Option<u8>,
    instruments: Option<[u8; NUM_PARTS]>,
    note_stack_capacity: Option<usize>,
}

#[derive(Deserialize, Default)]
struct HostConfig {
    app: Option<String>,
    input_port: Option<String>,
    output_port: Option<String>,
}

/// Which app the host runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    Drums,
    Clock,
}

impl AppKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "drums" | "drum" | "sequencer" => Some(AppKind::Drums),
            "clock" => Some(AppKind::Clock),
            _ => None,
        }
    }
}

pub struct Config {
    clock: ClockConfig,
    sequencer: SequencerConfig,
    host: HostConfig,
}

impl Config {
    /// Embedded defaults merged with the user's config file, if any.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Embedded defaults merged with the file at `path`. A missing or
    /// malformed file leaves the defaults in place.
    pub fn load_from(path: Option<&Path>) -> Self {
        let mut base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!(target: "config", "embedded config.toml is invalid: {}", e);
            ConfigFile::default()
        });

        if let Some(path) = path {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_clock(&mut base.clock, user.clock);
                            merge_sequencer(&mut base.sequencer, user.sequencer);
                            merge_host(&mut base.host, user.host);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            clock: base.clock,
            sequencer: base.sequencer,
            host: base.host,
        }
    }

    pub fn bpm(&self) -> u8 {
        self.clock
            .bpm
            .map(|bpm| bpm.clamp(MIN_BPM as u16, MAX_BPM as u16) as u8)
            .unwrap_or(DEFAULT_BPM)
    }

    pub fn groove_template(&self) -> GrooveTemplate {
        self.clock
            .groove_template
            .as_deref()
            .and_then(GrooveTemplate::parse)
            .unwrap_or_default()
    }

    pub fn groove_amount(&self) -> u8 {
        self.clock
            .groove_amount
            .map(|amount| amount.min(MAX_GROOVE_AMOUNT as u16) as u8)
            .unwrap_or(0)
    }

    /// Periodic timer rate (clamped to 1 kHz..100 kHz).
    pub fn timer_rate_hz(&self) -> u32 {
        self.clock
            .timer_rate_hz
            .unwrap_or(DEFAULT_TIMER_RATE_HZ)
            .clamp(1_000, 100_000)
    }

    pub fn mode(&self) -> SequencerMode {
        self.sequencer
            .mode
            .as_deref()
            .and_then(SequencerMode::parse)
            .unwrap_or_default()
    }

    pub fn clock_source(&self) -> ClockSource {
        match self.sequencer.clock_source.as_deref() {
            Some("external") => ClockSource::External,
            _ => ClockSource::Internal,
        }
    }

    pub fn channel(&self) -> u8 {
        self.sequencer.channel.unwrap_or(DEFAULT_CHANNEL).min(15)
    }

    pub fn instruments(&self) -> [u8; NUM_PARTS] {
        self.sequencer
            .instruments
            .unwrap_or(DEFAULT_INSTRUMENTS)
            .map(|note| note.clamp(MIN_INSTRUMENT, MAX_INSTRUMENT))
    }

    /// Held-note polyphony (clamped to 1..=16).
    pub fn note_stack_capacity(&self) -> usize {
        self.sequencer
            .note_stack_capacity
            .unwrap_or(DEFAULT_CAPACITY)
            .clamp(1, MAX_SLOTS)
    }

    pub fn app(&self) -> AppKind {
        self.host
            .app
            .as_deref()
            .and_then(AppKind::parse)
            .unwrap_or(AppKind::Drums)
    }

    pub fn input_port(&self) -> Option<&str> {
        self.host.input_port.as_deref()
    }

    pub fn output_port(&self) -> Option<&str> {
        self.host.output_port.as_deref()
    }

    /// Settings record for the clock-source app.
    pub fn clock_settings(&self) -> [u8; 4] {
        [0, self.bpm(), self.groove_template().index(), self.groove_amount()]
    }

    /// Settings record for the drum pattern sequencer.
    pub fn drum_settings(&self) -> [u8; 10] {
        let [i1, i2, i3, i4] = self.instruments();
        [
            self.mode().value(),
            self.clock_source().value(),
            self.bpm(),
            self.groove_template().index(),
            self.groove_amount(),
            self.channel(),
            i1,
            i2,
            i3,
            i4,
        ]
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pulsebox").join("config.toml"))
}

fn merge_clock(base: &mut ClockConfig, user: ClockConfig) {
    if user.bpm.is_some() {
        base.bpm = user.bpm;
    }
    if user.groove_template.is_some() {
        base.groove_template = user.groove_template;
    }
    if user.groove_amount.is_some() {
        base.groove_amount = user.groove_amount;
    }
    if user.timer_rate_hz.is_some() {
        base.timer_rate_hz = user.timer_rate_hz;
    }
}

fn merge_sequencer(base: &mut SequencerConfig, user: SequencerConfig) {
    if user.mode.is_some() {
        base.mode = user.mode;
    }
    if user.clock_source.is_some() {
        base.clock_source = user.clock_source;
    }
    if user.channel.is_some() {
        base.channel = user.channel;
    }
    if user.instruments.is_some() {
        base.instruments = user.instruments;
    }
    if user.note_stack_capacity.is_some() {
        base.note_stack_capacity = user.note_stack_capacity;
    }
}

fn merge_host(base: &mut HostConfig, user: HostConfig) {
    if user.app.is_some() {
        base.app = user.app;
    }
    if user.input_port.is_some() {
        base.input_port = user.input_port;
    }
    if user.output_port.is_some() {
        base.output_port = user.output_port;
    }
}
