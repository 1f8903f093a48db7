//! # pulsebox-types
//!
//! Shared data model for the pulsebox MIDI utility: clock state, note and
//! pitch-class types, sequencer part state and the parameter tables that the
//! settings collaborator reads and writes.
//!
//! Nothing in this crate allocates; every type is `Copy` or a fixed array so it
//! can live inside the tick path.

pub mod clock;
pub mod note;
pub mod param;
pub mod sequencer;

pub use clock::{ClockSource, ClockState, GrooveTemplate};
pub use note::{NoteEntry, PitchClass};
pub use param::ParamSpec;
pub use sequencer::{PartState, SequencerMode, SequencerState};

/// MIDI clock resolution: pulses per quarter note.
pub const PPQN: u8 = 24;

/// Clock pulses per 16th note at 24 PPQN.
pub const PULSES_PER_STEP: u8 = 6;

/// Pulse offset inside a 16th note at which sounding parts are released.
pub const GATE_PULSES: u8 = 3;

/// Steps in one bar of 16th notes.
pub const STEPS_PER_BAR: u8 = 16;

/// One 4/4 bar at 24 PPQN. Used as the idle window for auto stop/start.
pub const IDLE_TIMEOUT_TICKS: u32 = 96;

/// Velocity of every note the sequencer emits.
pub const TRIGGER_VELOCITY: u8 = 0x64;

/// Number of drum parts sequenced in parallel.
pub const NUM_PARTS: usize = 4;

/// Realtime and channel-voice status bytes.
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xb0;
    pub const SYSEX_START: u8 = 0xf0;
    pub const SYSEX_END: u8 = 0xf7;
    pub const CLOCK: u8 = 0xf8;
    pub const START: u8 = 0xfa;
    pub const CONTINUE: u8 = 0xfb;
    pub const STOP: u8 = 0xfc;
    pub const ACTIVE_SENSING: u8 = 0xfe;
    pub const RESET: u8 = 0xff;
}
