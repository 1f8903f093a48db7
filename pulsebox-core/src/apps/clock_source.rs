//! Standalone MIDI clock: runs the internal generator at a set tempo and
//! groove, answers incoming transport, and passes everything else through.

use pulsebox_types::clock::{MAX_BPM, MAX_GROOVE_AMOUNT, MIN_BPM};
use pulsebox_types::param::{self, ParamSpec};
use pulsebox_types::{ClockSource, GrooveTemplate};

use crate::app::{App, Context};

pub const PARAM_RUNNING: u8 = 0;
pub const PARAM_BPM: u8 = 1;
pub const PARAM_GROOVE_TEMPLATE: u8 = 2;
pub const PARAM_GROOVE_AMOUNT: u8 = 3;

const PARAMS: &[ParamSpec] = &[
    ParamSpec::new(PARAM_RUNNING, "running", 0, 1),
    ParamSpec::new(PARAM_BPM, "bpm", MIN_BPM, MAX_BPM),
    ParamSpec::new(PARAM_GROOVE_TEMPLATE, "groove_template", 0, 5),
    ParamSpec::new(PARAM_GROOVE_AMOUNT, "groove_amount", 0, MAX_GROOVE_AMOUNT),
];

#[derive(Debug, Clone)]
pub struct ClockSourceApp {
    running: bool,
    bpm: u8,
    groove_template: GrooveTemplate,
    groove_amount: u8,
}

impl ClockSourceApp {
    pub const FACTORY_DATA: [u8; 4] = [0, 120, 0, 0];

    pub fn new() -> Self {
        Self {
            running: false,
            bpm: Self::FACTORY_DATA[1],
            groove_template: GrooveTemplate::Swing,
            groove_amount: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn push_tempo(&self, ctx: &mut Context) {
        ctx.clock
            .set_tempo_groove(self.bpm, self.groove_template, self.groove_amount);
    }

    fn sync_running(&mut self, ctx: &Context) {
        self.running = ctx.clock.is_running();
    }
}

impl Default for ClockSourceApp {
    fn default() -> Self {
        Self::new()
    }
}

impl App for ClockSourceApp {
    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn factory_data(&self) -> &'static [u8] {
        &Self::FACTORY_DATA
    }

    fn name(&self) -> &'static str {
        "clock"
    }

    fn set_parameter(&mut self, ctx: &mut Context, key: u8, value: u8) {
        let Some(spec) = param::lookup(PARAMS, key) else {
            log::warn!(target: "clock", "unknown parameter {}", key);
            return;
        };
        let value = spec.clamp(value);
        match key {
            PARAM_RUNNING => {
                if value == 1 {
                    ctx.clock.start(ctx.out);
                } else {
                    ctx.clock.stop(ctx.out);
                }
                self.sync_running(ctx);
            }
            PARAM_BPM => {
                self.bpm = value;
                self.push_tempo(ctx);
            }
            PARAM_GROOVE_TEMPLATE => {
                self.groove_template = GrooveTemplate::from_index(value);
                self.push_tempo(ctx);
            }
            PARAM_GROOVE_AMOUNT => {
                self.groove_amount = value;
                self.push_tempo(ctx);
            }
            _ => {}
        }
    }

    fn get_parameter(&self, key: u8) -> u8 {
        match key {
            PARAM_RUNNING => self.running as u8,
            PARAM_BPM => self.bpm,
            PARAM_GROOVE_TEMPLATE => self.groove_template.index(),
            PARAM_GROOVE_AMOUNT => self.groove_amount,
            _ => 0,
        }
    }

    fn on_init(&mut self, ctx: &mut Context) {
        ctx.clock.set_source(ClockSource::Internal);
        self.push_tempo(ctx);
        ctx.clock.halt();
        self.running = false;
    }

    fn on_raw_byte(&mut self, ctx: &mut Context, byte: u8) {
        ctx.clock.relay_raw_byte(ctx.out, byte);
    }

    fn on_raw_midi_data(&mut self, ctx: &mut Context, status: u8, data: &[u8]) {
        ctx.out.send(status, data);
    }

    fn on_start(&mut self, ctx: &mut Context) {
        ctx.clock.start(ctx.out);
        self.sync_running(ctx);
    }

    fn on_continue(&mut self, ctx: &mut Context) {
        ctx.clock.resume(ctx.out);
        self.sync_running(ctx);
    }

    fn on_stop(&mut self, ctx: &mut Context) {
        ctx.clock.stop(ctx.out);
        self.sync_running(ctx);
    }

    fn on_internal_clock_tick(&mut self, ctx: &mut Context) {
        ctx.clock.emit_pulse(ctx.out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockEngine;
    use crate::note_stack::NoteStack;
    use pulsebox_types::status;

    struct Rig {
        clock: ClockEngine,
        notes: NoteStack,
        out: Vec<u8>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                clock: ClockEngine::new(ClockSource::Internal, 9_600),
                notes: NoteStack::new(),
                out: Vec::new(),
            }
        }

        fn ctx(&mut self) -> Context<'_> {
            Context {
                clock: &mut self.clock,
                notes: &mut self.notes,
                out: &mut self.out,
            }
        }
    }

    #[test]
    fn init_is_silent() {
        let mut rig = Rig::new();
        let mut app = ClockSourceApp::new();
        app.on_init(&mut rig.ctx());
        assert!(rig.out.is_empty());
        assert!(!app.is_running());
        assert_eq!(rig.clock.source(), ClockSource::Internal);
    }

    #[test]
    fn running_param_drives_transport() {
        let mut rig = Rig::new();
        let mut app = ClockSourceApp::new();
        app.on_init(&mut rig.ctx());
        app.set_parameter(&mut rig.ctx(), PARAM_RUNNING, 1);
        app.set_parameter(&mut rig.ctx(), PARAM_RUNNING, 5);
        assert_eq!(app.get_parameter(PARAM_RUNNING), 1);
        app.set_parameter(&mut rig.ctx(), PARAM_RUNNING, 0);
        assert_eq!(rig.out, vec![status::START, status::STOP]);
        assert_eq!(app.get_parameter(PARAM_RUNNING), 0);
    }

    #[test]
    fn tempo_params_are_clamped_and_forwarded() {
        let mut rig = Rig::new();
        let mut app = ClockSourceApp::new();
        app.set_parameter(&mut rig.ctx(), PARAM_BPM, 250);
        app.set_parameter(&mut rig.ctx(), PARAM_GROOVE_TEMPLATE, 9);
        app.set_parameter(&mut rig.ctx(), PARAM_GROOVE_AMOUNT, 200);
        assert_eq!(app.get_parameter(PARAM_BPM), 240);
        assert_eq!(app.get_parameter(PARAM_GROOVE_TEMPLATE), 5);
        assert_eq!(app.get_parameter(PARAM_GROOVE_AMOUNT), 127);
        let state = rig.clock.state();
        assert_eq!(state.tempo_bpm, 240);
        assert_eq!(state.groove_template, GrooveTemplate::Monkey);
        assert_eq!(state.groove_amount, 127);
    }

    #[test]
    fn incoming_transport_is_idempotent() {
        let mut rig = Rig::new();
        let mut app = ClockSourceApp::new();
        app.on_init(&mut rig.ctx());
        app.on_start(&mut rig.ctx());
        app.on_continue(&mut rig.ctx());
        app.on_stop(&mut rig.ctx());
        app.on_stop(&mut rig.ctx());
        assert_eq!(rig.out, vec![status::START, status::STOP]);
    }

    #[test]
    fn incoming_realtime_is_not_echoed() {
        let mut rig = Rig::new();
        let mut app = ClockSourceApp::new();
        app.on_init(&mut rig.ctx());
        app.on_raw_byte(&mut rig.ctx(), status::CLOCK);
        app.on_raw_byte(&mut rig.ctx(), status::SYSEX_START);
        app.on_raw_midi_data(&mut rig.ctx(), 0x91, &[60, 90]);
        assert_eq!(rig.out, vec![status::SYSEX_START, 0x91, 60, 90]);
    }
}
