//! Drum pattern generator.
//!
//! Four drum parts are driven either from the preset pattern table or from
//! Euclidean rhythms. Held notes on the input channel pick the patterns: the
//! octave of a note selects the part, its pitch class selects the pattern
//! (preset mode) or the pulse and step counts (Euclidean mode).
//!
//! With an internal clock the sequencer starts itself on the first note after
//! a bar of silence and stops again once a bar passes with nothing to play.

use pulsebox_types::clock::{MAX_BPM, MAX_GROOVE_AMOUNT, MIN_BPM};
use pulsebox_types::param::{self, ParamSpec};
use pulsebox_types::sequencer::{step_count, DEFAULT_INSTRUMENTS, MAX_INSTRUMENT, MIN_INSTRUMENT};
use pulsebox_types::{
    status, ClockSource, GrooveTemplate, PartState, SequencerMode, SequencerState, GATE_PULSES,
    IDLE_TIMEOUT_TICKS, NUM_PARTS, PULSES_PER_STEP, STEPS_PER_BAR, TRIGGER_VELOCITY,
};

use crate::app::{App, Context};
use crate::note_stack::NoteStack;
use crate::rhythm::{euclidean_pattern, preset_pattern, PRESET_STRIDE};

pub const PARAM_MODE: u8 = 0;
pub const PARAM_CLOCK_SOURCE: u8 = 1;
pub const PARAM_BPM: u8 = 2;
pub const PARAM_GROOVE_TEMPLATE: u8 = 3;
pub const PARAM_GROOVE_AMOUNT: u8 = 4;
pub const PARAM_CHANNEL: u8 = 5;
/// First of the four per-part instrument keys.
pub const PARAM_INSTRUMENT: u8 = 6;

const PARAMS: &[ParamSpec] = &[
    ParamSpec::new(PARAM_MODE, "mode", 0, 1),
    ParamSpec::new(PARAM_CLOCK_SOURCE, "clock_source", 0, 1),
    ParamSpec::new(PARAM_BPM, "bpm", MIN_BPM, MAX_BPM),
    ParamSpec::new(PARAM_GROOVE_TEMPLATE, "groove_template", 0, 5),
    ParamSpec::new(PARAM_GROOVE_AMOUNT, "groove_amount", 0, MAX_GROOVE_AMOUNT),
    ParamSpec::new(PARAM_CHANNEL, "channel", 0, 15),
    ParamSpec::new(PARAM_INSTRUMENT, "part_1_instrument", MIN_INSTRUMENT, MAX_INSTRUMENT),
    ParamSpec::new(PARAM_INSTRUMENT + 1, "part_2_instrument", MIN_INSTRUMENT, MAX_INSTRUMENT),
    ParamSpec::new(PARAM_INSTRUMENT + 2, "part_3_instrument", MIN_INSTRUMENT, MAX_INSTRUMENT),
    ParamSpec::new(PARAM_INSTRUMENT + 3, "part_4_instrument", MIN_INSTRUMENT, MAX_INSTRUMENT),
];

#[derive(Debug, Clone)]
pub struct PatternSequencer {
    state: SequencerState,
    parts: [PartState; NUM_PARTS],
    bpm: u8,
    groove_template: GrooveTemplate,
    groove_amount: u8,
}

impl PatternSequencer {
    pub const FACTORY_DATA: [u8; 10] = [0, 0, 120, 0, 0, 9, 36, 38, 42, 46];

    pub fn new() -> Self {
        Self {
            state: SequencerState::default(),
            parts: DEFAULT_INSTRUMENTS.map(PartState::new),
            bpm: Self::FACTORY_DATA[PARAM_BPM as usize],
            groove_template: GrooveTemplate::Swing,
            groove_amount: 0,
        }
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn parts(&self) -> &[PartState; NUM_PARTS] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> &PartState {
        &self.parts[index]
    }

    pub fn mode(&self) -> SequencerMode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    fn is_internal(&self) -> bool {
        self.state.clk_source == ClockSource::Internal
    }

    fn push_tempo(&self, ctx: &mut Context) {
        ctx.clock
            .set_tempo_groove(self.bpm, self.groove_template, self.groove_amount);
    }

    /// Back to the first step, globally and for every Euclidean part.
    fn reset_position(&mut self) {
        self.state.rewind();
        for part in &mut self.parts {
            part.rewind();
        }
    }

    fn trigger(&mut self, ctx: &mut Context, index: usize) {
        let part = &mut self.parts[index];
        ctx.out
            .send3(status::NOTE_ON | self.state.channel, part.instrument, TRIGGER_VELOCITY);
        part.active_note = part.instrument;
    }

    fn all_notes_off(&mut self, ctx: &mut Context) {
        let channel = self.state.channel;
        for part in &mut self.parts {
            if part.is_sounding() {
                ctx.out.send3(status::NOTE_OFF | channel, part.active_note, 0);
                part.active_note = 0;
            }
        }
    }

    /// Advance one clock pulse.
    fn tick(&mut self, ctx: &mut Context) {
        if !self.state.running {
            return;
        }
        self.state.tick_counter += 1;

        self.state.idle_ticks = self.state.idle_ticks.saturating_add(1);
        if self.state.idle_ticks >= IDLE_TIMEOUT_TICKS {
            self.state.idle_ticks = IDLE_TIMEOUT_TICKS;
            if self.is_internal() {
                self.all_notes_off(ctx);
                ctx.out.send_now(status::STOP);
                self.state.running = false;
                log::debug!(target: "sequencer", "idle for a bar, auto stop");
                return;
            }
        }

        if self.state.tick_counter == PULSES_PER_STEP {
            self.state.tick_counter = 0;
            match self.state.mode {
                SequencerMode::Preset => self.preset_step(ctx),
                SequencerMode::Euclidean => self.euclidean_step(ctx),
            }
        } else if self.state.tick_counter == GATE_PULSES {
            self.all_notes_off(ctx);
        }
    }

    fn preset_step(&mut self, ctx: &mut Context) {
        for index in 0..NUM_PARTS {
            let selector = self.parts[index].pattern_selector;
            if selector != 0 {
                self.state.idle_ticks = 0;
            }
            let pattern = preset_pattern(selector, index as u8 * PRESET_STRIDE);
            if pattern & self.state.global_bitmask != 0 {
                self.trigger(ctx, index);
            }
        }
        self.state.global_step += 1;
        self.state.global_bitmask = self.state.global_bitmask.wrapping_shl(1);
        if self.state.global_step >= STEPS_PER_BAR {
            self.state.global_step = 0;
            self.state.global_bitmask = 1;
        }
    }

    fn euclidean_step(&mut self, ctx: &mut Context) {
        for index in 0..NUM_PARTS {
            let part = self.parts[index];
            if part.pulses != 0 {
                self.state.idle_ticks = 0;
                if euclidean_pattern(part.pulses, part.steps_code) & part.bitmask != 0 {
                    self.trigger(ctx, index);
                }
            }
            let part = &mut self.parts[index];
            part.step_counter = part.step_counter.wrapping_add(1);
            part.bitmask = part.bitmask.wrapping_shl(1);
            if part.step_counter >= step_count(part.steps_code) {
                part.rewind();
            }
        }
    }

    /// Derive part settings from everything currently held.
    fn apply_held_notes(&mut self, notes: &NoteStack) {
        match self.state.mode {
            SequencerMode::Preset => {
                for entry in notes.iter() {
                    let pitch = NoteStack::factorize_pitch(entry.pitch);
                    self.parts[pitch.part()].pattern_selector = pitch.note;
                }
            }
            SequencerMode::Euclidean => {
                let mut previous_octave = None;
                for entry in notes.iter() {
                    let pitch = NoteStack::factorize_pitch(entry.pitch);
                    let part = &mut self.parts[pitch.part()];
                    if previous_octave == Some(pitch.octave) {
                        part.steps_code = pitch.note;
                    } else {
                        part.pulses = pitch.note;
                        part.rewind();
                    }
                    previous_octave = Some(pitch.octave);
                }
            }
        }
    }
}

impl Default for PatternSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl App for PatternSequencer {
    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn factory_data(&self) -> &'static [u8] {
        &Self::FACTORY_DATA
    }

    fn name(&self) -> &'static str {
        "drums"
    }

    fn set_parameter(&mut self, ctx: &mut Context, key: u8, value: u8) {
        let Some(spec) = param::lookup(PARAMS, key) else {
            log::warn!(target: "sequencer", "unknown parameter {}", key);
            return;
        };
        if !spec.contains(value) {
            log::debug!(target: "sequencer", "{} = {} clamped", spec.name, value);
        }
        let value = spec.clamp(value);
        match key {
            PARAM_MODE => self.state.mode = SequencerMode::from_value(value),
            PARAM_CLOCK_SOURCE => {
                let source = ClockSource::from_value(value);
                if source != self.state.clk_source && !self.state.running {
                    // Note input may engage the new source straight away.
                    self.state.idle_ticks = IDLE_TIMEOUT_TICKS;
                }
                self.state.clk_source = source;
                ctx.clock.set_source(source);
            }
            PARAM_BPM => self.bpm = value,
            PARAM_GROOVE_TEMPLATE => self.groove_template = GrooveTemplate::from_index(value),
            PARAM_GROOVE_AMOUNT => self.groove_amount = value,
            PARAM_CHANNEL => self.state.channel = value,
            _ => self.parts[(key - PARAM_INSTRUMENT) as usize].instrument = value,
        }
        if key <= PARAM_GROOVE_AMOUNT {
            self.push_tempo(ctx);
        }
    }

    fn get_parameter(&self, key: u8) -> u8 {
        match key {
            PARAM_MODE => self.state.mode.value(),
            PARAM_CLOCK_SOURCE => self.state.clk_source.value(),
            PARAM_BPM => self.bpm,
            PARAM_GROOVE_TEMPLATE => self.groove_template.index(),
            PARAM_GROOVE_AMOUNT => self.groove_amount,
            PARAM_CHANNEL => self.state.channel,
            k if (PARAM_INSTRUMENT..PARAM_INSTRUMENT + NUM_PARTS as u8).contains(&k) => {
                self.parts[(k - PARAM_INSTRUMENT) as usize].instrument
            }
            _ => 0,
        }
    }

    fn on_init(&mut self, ctx: &mut Context) {
        for part in &mut self.parts {
            *part = PartState::new(part.instrument);
        }
        self.state.rewind();
        self.state.idle_ticks = IDLE_TIMEOUT_TICKS;
        self.state.running = false;
        ctx.clock.set_source(self.state.clk_source);
        self.push_tempo(ctx);
        ctx.clock.restart_generator();
        ctx.notes.clear();
    }

    fn on_raw_byte(&mut self, ctx: &mut Context, byte: u8) {
        // Incoming realtime is dropped while the internal clock is master.
        ctx.clock.relay_raw_byte(ctx.out, byte);
    }

    fn on_raw_midi_data(&mut self, ctx: &mut Context, status_byte: u8, data: &[u8]) {
        let channel = self.state.channel;
        if status_byte != status::NOTE_OFF | channel && status_byte != status::NOTE_ON | channel {
            ctx.out.send(status_byte, data);
        }
    }

    fn on_note_on(&mut self, ctx: &mut Context, channel: u8, note: u8, velocity: u8) {
        if channel != self.state.channel {
            return;
        }
        if self.is_internal() && !self.state.running && self.state.is_idle() {
            ctx.clock.restart_generator();
            self.reset_position();
            self.state.running = true;
            ctx.out.send_now(status::START);
            log::debug!(target: "sequencer", "note input, auto start");
        }
        self.state.idle_ticks = 0;
        ctx.notes.note_on(note, velocity);
        self.apply_held_notes(ctx.notes);
    }

    fn on_note_off(&mut self, ctx: &mut Context, channel: u8, note: u8, _velocity: u8) {
        if channel != self.state.channel {
            return;
        }
        ctx.notes.note_off(note);
    }

    fn on_clock(&mut self, ctx: &mut Context) {
        if !self.is_internal() && self.state.running {
            self.tick(ctx);
        }
    }

    fn on_start(&mut self, _ctx: &mut Context) {
        if !self.is_internal() {
            self.state.running = true;
            self.reset_position();
            log::debug!(target: "sequencer", "external start");
        }
    }

    fn on_continue(&mut self, _ctx: &mut Context) {
        if !self.is_internal() {
            self.state.running = true;
        }
    }

    fn on_stop(&mut self, ctx: &mut Context) {
        if !self.is_internal() {
            self.state.running = false;
            log::debug!(target: "sequencer", "external stop");
        }
        self.all_notes_off(ctx);
    }

    fn on_exit(&mut self, ctx: &mut Context) {
        if self.is_internal() && self.state.running {
            self.all_notes_off(ctx);
            ctx.out.send_now(status::STOP);
            self.state.running = false;
            log::debug!(target: "sequencer", "deactivated while running, stop");
            return;
        }
        self.on_stop(ctx);
    }

    fn on_internal_clock_tick(&mut self, ctx: &mut Context) {
        if self.is_internal() && self.state.running {
            ctx.clock.emit_pulse(ctx.out);
            self.tick(ctx);
        }
    }
}
