//! Runs one app: owns the session context, parses incoming MIDI and dispatches
//! the app's hooks.

use pulsebox_types::status;

use crate::app::{load_settings, save_settings, App, Context};
use crate::clock::ClockEngine;
use crate::midi::{MidiMessage, MidiParser, MidiSink};
use crate::note_stack::NoteStack;

/// The active-app session. Everything an app touches lives here and is lent
/// to it one hook call at a time.
pub struct Host<A: App, S: MidiSink> {
    app: A,
    clock: ClockEngine,
    notes: NoteStack,
    out: S,
    parser: MidiParser,
}

impl<A: App, S: MidiSink> Host<A, S> {
    pub fn new(app: A, clock: ClockEngine, notes: NoteStack, out: S) -> Self {
        Self {
            app,
            clock,
            notes,
            out,
            parser: MidiParser::new(),
        }
    }

    fn dispatch<R>(&mut self, f: impl FnOnce(&mut A, &mut Context) -> R) -> R {
        let mut ctx = Context {
            clock: &mut self.clock,
            notes: &mut self.notes,
            out: &mut self.out,
        };
        f(&mut self.app, &mut ctx)
    }

    /// Load a settings record (factory data or a saved one) and initialise
    /// the app.
    pub fn activate(&mut self, settings: &[u8]) {
        if settings.len() != self.app.settings_size() {
            log::warn!(
                target: "host",
                "{}: settings record has {} bytes, expected {}",
                self.app.name(),
                settings.len(),
                self.app.settings_size()
            );
        }
        self.parser.reset();
        self.dispatch(|app, ctx| {
            load_settings(app, ctx, settings);
            app.on_init(ctx);
        });
        log::info!(target: "host", "activated {}", self.app.name());
    }

    /// End the session: the app stops and releases anything sounding.
    pub fn deactivate(&mut self) {
        self.dispatch(|app, ctx| app.on_exit(ctx));
        log::info!(target: "host", "deactivated {}", self.app.name());
    }

    /// Periodic interrupt. Runs the app's internal clock hook when the pulse
    /// generator reports a due pulse.
    pub fn on_timer_tick(&mut self) {
        if self.clock.on_timer_tick() {
            self.dispatch(|app, ctx| app.on_internal_clock_tick(ctx));
        }
    }

    pub fn on_midi_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.on_midi_byte(byte);
        }
    }

    pub fn on_midi_byte(&mut self, byte: u8) {
        let Some(message) = self.parser.feed(byte) else {
            return;
        };
        match message {
            MidiMessage::Realtime(byte) => self.dispatch(|app, ctx| {
                app.on_raw_byte(ctx, byte);
                match byte {
                    status::CLOCK => app.on_clock(ctx),
                    status::START => app.on_start(ctx),
                    status::CONTINUE => app.on_continue(ctx),
                    status::STOP => app.on_stop(ctx),
                    _ => {}
                }
            }),
            MidiMessage::SysEx(byte) => self.dispatch(|app, ctx| app.on_raw_byte(ctx, byte)),
            MidiMessage::Common { status: status_byte, data, len } => self.dispatch(|app, ctx| {
                app.on_raw_byte(ctx, status_byte);
                for &byte in &data[..len] {
                    app.on_raw_byte(ctx, byte);
                }
            }),
            MidiMessage::Channel { status: status_byte, data, len } => self.dispatch(|app, ctx| {
                app.on_raw_midi_data(ctx, status_byte, &data[..len]);
                let channel = status_byte & 0x0f;
                match status_byte & 0xf0 {
                    status::NOTE_ON if data[1] != 0 => app.on_note_on(ctx, channel, data[0], data[1]),
                    status::NOTE_ON | status::NOTE_OFF => {
                        app.on_note_off(ctx, channel, data[0], data[1])
                    }
                    status::CONTROL_CHANGE => app.on_control_change(ctx, channel, data[0], data[1]),
                    _ => {}
                }
            }),
        }
    }

    /// Apply one parameter write.
    pub fn set_parameter(&mut self, key: u8, value: u8) {
        self.dispatch(|app, ctx| app.set_parameter(ctx, key, value));
    }

    pub fn get_parameter(&self, key: u8) -> u8 {
        self.app.get_parameter(key)
    }

    /// Current settings record.
    pub fn settings(&self) -> Vec<u8> {
        save_settings(&self.app)
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn clock(&self) -> &ClockEngine {
        &self.clock
    }

    pub fn notes(&self) -> &NoteStack {
        &self.notes
    }

    pub fn output(&self) -> &S {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut S {
        &mut self.out
    }
}
