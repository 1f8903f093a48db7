//! # pulsebox-core
//!
//! Real-time clock and rhythm engine for the pulsebox MIDI utility. Everything
//! on the tick path works on fixed-size state and never allocates.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pulsebox_core::apps::PatternSequencer;
//! use pulsebox_core::clock::ClockEngine;
//! use pulsebox_core::host::Host;
//! use pulsebox_core::note_stack::NoteStack;
//! use pulsebox_types::ClockSource;
//!
//! let clock = ClockEngine::new(ClockSource::Internal, 8_000);
//! let mut host = Host::new(PatternSequencer::new(), clock, NoteStack::new(), Vec::new());
//! host.activate(&PatternSequencer::FACTORY_DATA);
//!
//! // Periodic interrupt stand-in
//! host.on_timer_tick();
//! // Incoming MIDI, one byte at a time
//! host.on_midi_bytes(&[0x99, 36, 100]);
//! ```
//!
//! ## Module Overview
//!
//! - [`note_stack`]: sorted set of held input notes
//! - [`rhythm`]: preset pattern table and Euclidean pattern generation
//! - [`clock`]: `ClockEngine` with tempo/groove, pulse generation and transport
//! - [`apps`]: the pattern sequencer and the clock-source app
//! - [`app`]: the `App` hook trait and the per-session `Context`
//! - [`host`]: byte parser and hook dispatch for the active app
//! - [`engine`]: engine thread that serializes ticks, MIDI input and parameter writes
//! - [`midi`]: output sink trait, stream parser and `midir` port adapters
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub mod app;
pub mod apps;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod midi;
pub mod note_stack;
pub mod rhythm;

pub use error::PulseError;
