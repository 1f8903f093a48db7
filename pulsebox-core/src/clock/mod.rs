//! Clock engine: tempo and groove state, internal pulse generation, MIDI
//! transport (Start/Stop/Continue) and the realtime relay policy.

mod generator;
mod groove;

pub use generator::{PulseGenerator, PULSES_PER_BAR};
pub use groove::{GrooveTable, Straight, SwingPolicy, DEFAULT_GROOVE, GROOVE_CURVES};

use pulsebox_types::{status, ClockSource, ClockState, GrooveTemplate, PPQN};

use crate::midi::{is_realtime, MidiSink};

pub const DEFAULT_TIMER_RATE_HZ: u32 = 8_000;

pub struct ClockEngine {
    state: ClockState,
    source: ClockSource,
    generator: PulseGenerator,
    timer_rate_hz: u32,
    swing: &'static dyn SwingPolicy,
}

impl ClockEngine {
    /// Engine with the default groove table. `timer_rate_hz` is the rate at
    /// which [`on_timer_tick`](Self::on_timer_tick) will be called.
    pub fn new(source: ClockSource, timer_rate_hz: u32) -> Self {
        Self::with_swing(source, timer_rate_hz, &DEFAULT_GROOVE)
    }

    pub fn with_swing(
        source: ClockSource,
        timer_rate_hz: u32,
        swing: &'static dyn SwingPolicy,
    ) -> Self {
        Self {
            state: ClockState::default(),
            source,
            generator: PulseGenerator::new(),
            timer_rate_hz: timer_rate_hz.max(1),
            swing,
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn source(&self) -> ClockSource {
        self.source
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn timer_rate_hz(&self) -> u32 {
        self.timer_rate_hz
    }

    /// Rebind the pulse source. Called when the owning app is (re)configured.
    pub fn set_source(&mut self, source: ClockSource) {
        if self.source != source {
            log::debug!(target: "clock", "source -> {:?}", source);
            self.source = source;
        }
    }

    /// Store tempo and groove. The generator picks them up when it schedules
    /// the next pulse; a pulse already counting down keeps its interval.
    pub fn set_tempo_groove(&mut self, bpm: u8, template: GrooveTemplate, amount: u8) {
        self.state.set_tempo_groove(bpm, template, amount);
    }

    /// Unswung pulse interval in 24.8 fixed-point timer ticks.
    pub fn pulse_interval_q8(&self) -> u64 {
        (self.timer_rate_hz as u64 * 60 * 256) / (self.state.tempo_bpm as u64 * PPQN as u64)
    }

    /// Interval after the pulse at `tick_index`, swing included.
    pub fn swung_interval_q8(&self, tick_index: u8) -> u64 {
        let base = self.pulse_interval_q8();
        let offset = self.swing.offset(
            self.state.groove_template,
            self.state.groove_amount,
            (base >> 8) as u32,
            tick_index,
        ) as i64;
        (base as i64 + offset * 256).max(256) as u64
    }

    /// Periodic interrupt entry point. Returns true when an internal pulse is
    /// due; the caller then runs the app's internal clock hook.
    pub fn on_timer_tick(&mut self) -> bool {
        if self.source == ClockSource::External {
            return false;
        }
        if !self.generator.countdown() {
            return false;
        }
        let interval = self.swung_interval_q8(self.generator.next_tick_index());
        self.generator.reload(interval);
        log::trace!(target: "clock", "pulse {}", self.generator.tick_index());
        true
    }

    /// Emit one MIDI clock byte for an internally generated pulse.
    pub fn emit_pulse(&self, out: &mut dyn MidiSink) {
        if self.source == ClockSource::Internal {
            out.send_now(status::CLOCK);
        }
    }

    /// Restart the pulse generator without any transport message.
    pub fn restart_generator(&mut self) {
        self.generator.start();
    }

    pub fn generator(&self) -> &PulseGenerator {
        &self.generator
    }

    /// Silently stop generation and clear the run flag.
    pub fn halt(&mut self) {
        self.generator.stop();
        self.state.running = false;
    }

    /// Begin running and emit Start. No-op when already running.
    pub fn start(&mut self, out: &mut dyn MidiSink) {
        if self.state.running {
            return;
        }
        if self.source == ClockSource::Internal {
            self.generator.start();
        }
        out.send_now(status::START);
        self.state.running = true;
        log::debug!(target: "clock", "start at {} bpm", self.state.tempo_bpm);
    }

    /// Emit Stop and halt generation. No-op when already stopped.
    pub fn stop(&mut self, out: &mut dyn MidiSink) {
        if !self.state.running {
            return;
        }
        self.generator.stop();
        out.send_now(status::STOP);
        self.state.running = false;
        log::debug!(target: "clock", "stop");
    }

    /// Continue has no resume position here, so it behaves as Start.
    pub fn resume(&mut self, out: &mut dyn MidiSink) {
        self.start(out);
    }

    /// Forward an incoming byte that is not part of a channel message.
    ///
    /// With an internal source the engine is the clock master, so received
    /// realtime bytes are dropped; SysEx framing and system common bytes are
    /// always forwarded. With an external source everything passes through.
    pub fn relay_raw_byte(&self, out: &mut dyn MidiSink, byte: u8) {
        if self.source == ClockSource::External || !is_realtime(byte) {
            out.send_now(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ClockEngine {
        ClockEngine::new(ClockSource::Internal, 9_600)
    }

    #[test]
    fn start_is_idempotent() {
        let mut clock = engine();
        let mut out = Vec::new();
        clock.start(&mut out);
        clock.start(&mut out);
        clock.resume(&mut out);
        assert_eq!(out, vec![status::START]);
        assert!(clock.is_running());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut clock = engine();
        let mut out = Vec::new();
        clock.stop(&mut out);
        assert!(out.is_empty());
        clock.start(&mut out);
        clock.stop(&mut out);
        clock.stop(&mut out);
        assert_eq!(out, vec![status::START, status::STOP]);
        assert!(!clock.is_running());
    }

    #[test]
    fn pulse_interval_follows_tempo() {
        let mut clock = engine();
        clock.set_tempo_groove(120, GrooveTemplate::Swing, 0);
        // 9600 * 60 / (120 * 24) = 200 timer ticks per pulse
        assert_eq!(clock.pulse_interval_q8(), 200 << 8);
        clock.set_tempo_groove(240, GrooveTemplate::Swing, 0);
        assert_eq!(clock.pulse_interval_q8(), 100 << 8);
    }

    #[test]
    fn tempo_is_clamped() {
        let mut clock = engine();
        clock.set_tempo_groove(10, GrooveTemplate::Swing, 200);
        assert_eq!(clock.state().tempo_bpm, 40);
        assert_eq!(clock.state().groove_amount, 127);
    }

    fn count_ticks_between_pulses(clock: &mut ClockEngine, pulses: usize) -> Vec<u32> {
        let mut gaps = Vec::new();
        let mut since = 0;
        while gaps.len() < pulses {
            since += 1;
            if clock.on_timer_tick() {
                gaps.push(since);
                since = 0;
            }
        }
        gaps
    }

    #[test]
    fn internal_generation_paces_pulses() {
        let mut clock = engine();
        let mut out = Vec::new();
        clock.set_tempo_groove(120, GrooveTemplate::Swing, 0);
        clock.start(&mut out);
        let gaps = count_ticks_between_pulses(&mut clock, 5);
        assert_eq!(gaps, vec![1, 200, 200, 200, 200]);
    }

    #[test]
    fn stopped_engine_generates_nothing() {
        let mut clock = engine();
        for _ in 0..1_000 {
            assert!(!clock.on_timer_tick());
        }
    }

    #[test]
    fn external_source_never_generates() {
        let mut clock = ClockEngine::new(ClockSource::External, 9_600);
        let mut out = Vec::new();
        clock.start(&mut out);
        assert_eq!(out, vec![status::START]);
        for _ in 0..1_000 {
            assert!(!clock.on_timer_tick());
        }
    }

    #[test]
    fn swing_lengthens_then_shortens_steps() {
        let mut clock = engine();
        let mut out = Vec::new();
        clock.set_tempo_groove(120, GrooveTemplate::Swing, 127);
        clock.start(&mut out);
        let gaps = count_ticks_between_pulses(&mut clock, 13);
        // Pulses 0-5 belong to the first 16th: 200 + 200 * 32 / 128 = 250.
        assert!(gaps[1..7].iter().all(|&g| g == 250), "{:?}", gaps);
        assert!(gaps[7..13].iter().all(|&g| g == 150), "{:?}", gaps);
    }

    #[test]
    fn straight_policy_ignores_groove_amount() {
        let mut clock = ClockEngine::with_swing(ClockSource::Internal, 9_600, &Straight);
        let mut out = Vec::new();
        clock.set_tempo_groove(120, GrooveTemplate::Swing, 127);
        clock.start(&mut out);
        let gaps = count_ticks_between_pulses(&mut clock, 13);
        assert!(gaps[1..].iter().all(|&g| g == 200), "{:?}", gaps);
    }

    #[test]
    fn tempo_change_applies_from_next_pulse() {
        let mut clock = engine();
        let mut out = Vec::new();
        clock.set_tempo_groove(120, GrooveTemplate::Swing, 0);
        clock.start(&mut out);
        assert!(clock.on_timer_tick());
        // Halfway through a 200-tick interval, double the tempo.
        for _ in 0..100 {
            assert!(!clock.on_timer_tick());
        }
        clock.set_tempo_groove(240, GrooveTemplate::Swing, 0);
        let gaps = count_ticks_between_pulses(&mut clock, 2);
        assert_eq!(gaps, vec![100, 100]);
    }

    #[test]
    fn relay_policy() {
        let internal = engine();
        let external = ClockEngine::new(ClockSource::External, 9_600);
        let mut out = Vec::new();
        for byte in [0xf8, 0xfa, 0xf0, 0x01, 0xf7, 0xf2] {
            internal.relay_raw_byte(&mut out, byte);
        }
        assert_eq!(out, vec![0xf0, 0x01, 0xf7, 0xf2]);
        out.clear();
        for byte in [0xf8, 0xfa, 0xfc, 0xfb] {
            external.relay_raw_byte(&mut out, byte);
        }
        assert_eq!(out, vec![0xf8, 0xfa, 0xfc, 0xfb]);
    }

    #[test]
    fn emit_pulse_only_for_internal_source() {
        let mut out = Vec::new();
        engine().emit_pulse(&mut out);
        ClockEngine::new(ClockSource::External, 9_600).emit_pulse(&mut out);
        assert_eq!(out, vec![status::CLOCK]);
    }
}
