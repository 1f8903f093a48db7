#![allow(dead_code)]
//! Shared harness for the pulsebox-core scenario tests.

use pulsebox_core::app::App;
use pulsebox_core::apps::drum_pattern::{PARAM_CHANNEL, PARAM_CLOCK_SOURCE, PARAM_MODE};
use pulsebox_core::apps::{ClockSourceApp, PatternSequencer};
use pulsebox_core::clock::ClockEngine;
use pulsebox_core::host::Host;
use pulsebox_core::midi::{is_realtime, MidiMessage, MidiParser};
use pulsebox_core::note_stack::NoteStack;
use pulsebox_types::{ClockSource, SequencerMode};

/// 2400 Hz at 120 bpm gives exactly 50 timer ticks per pulse.
pub const TIMER_RATE_HZ: u32 = 2_400;
pub const TICKS_PER_PULSE: u32 = 50;

pub type DrumHost = Host<PatternSequencer, Vec<u8>>;
pub type ClockHost = Host<ClockSourceApp, Vec<u8>>;

pub fn drum_host(mode: SequencerMode, source: ClockSource, channel: u8) -> DrumHost {
    let mut settings = PatternSequencer::FACTORY_DATA;
    settings[PARAM_MODE as usize] = mode.value();
    settings[PARAM_CLOCK_SOURCE as usize] = source.value();
    settings[PARAM_CHANNEL as usize] = channel;
    let mut host = Host::new(
        PatternSequencer::new(),
        ClockEngine::new(source, TIMER_RATE_HZ),
        NoteStack::new(),
        Vec::new(),
    );
    host.activate(&settings);
    host
}

pub fn clock_host() -> ClockHost {
    let mut host = Host::new(
        ClockSourceApp::new(),
        ClockEngine::new(ClockSource::Internal, TIMER_RATE_HZ),
        NoteStack::new(),
        Vec::new(),
    );
    host.activate(&ClockSourceApp::FACTORY_DATA);
    host
}

/// Run timer ticks until the pulse generator has produced `count` pulses.
pub fn run_internal_pulses<A: App>(host: &mut Host<A, Vec<u8>>, count: usize) {
    for _ in 0..count {
        let before = host.clock().generator().tick_index();
        let mut guard = 0;
        while host.clock().generator().tick_index() == before {
            host.on_timer_tick();
            guard += 1;
            assert!(guard < 1_000_000, "pulse generator is not running");
        }
    }
}

/// Feed `count` external clock bytes.
pub fn send_clocks<A: App>(host: &mut Host<A, Vec<u8>>, count: usize) {
    for _ in 0..count {
        host.on_midi_byte(0xf8);
    }
}

/// Drain everything the host has written so far.
pub fn take_output<A: App>(host: &mut Host<A, Vec<u8>>) -> Vec<u8> {
    std::mem::take(host.output_mut())
}

/// Channel messages in a byte stream, realtime bytes skipped.
pub fn channel_messages(bytes: &[u8]) -> Vec<(u8, u8, u8)> {
    let mut parser = MidiParser::new();
    bytes
        .iter()
        .filter_map(|&b| parser.feed(b))
        .filter_map(|message| match message {
            MidiMessage::Channel { status, data, .. } => Some((status, data[0], data[1])),
            _ => None,
        })
        .collect()
}

pub fn realtime_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().filter(|&b| is_realtime(b)).collect()
}

pub fn count_byte(bytes: &[u8], byte: u8) -> usize {
    bytes.iter().filter(|&&b| b == byte).count()
}
