//! Hook interface between the host and the active app.

use pulsebox_types::ParamSpec;

use crate::clock::ClockEngine;
use crate::midi::MidiSink;
use crate::note_stack::NoteStack;

/// Collaborators handed to every hook. The host owns them; an app only
/// borrows them for the duration of one call.
pub struct Context<'a> {
    pub clock: &'a mut ClockEngine,
    pub notes: &'a mut NoteStack,
    pub out: &'a mut dyn MidiSink,
}

/// A program the host can run. Every hook defaults to doing nothing so an app
/// only implements what it reacts to.
///
/// All hooks run on the engine thread, one at a time. Channel-voice messages
/// arrive twice: first as raw bytes through [`on_raw_midi_data`] and then as
/// the typed note/control hook. Bytes that are not part of a channel message
/// (realtime, SysEx, system common) only reach [`on_raw_byte`].
///
/// [`on_raw_midi_data`]: App::on_raw_midi_data
/// [`on_raw_byte`]: App::on_raw_byte
pub trait App {
    /// Valid range for each settings key.
    fn params(&self) -> &'static [ParamSpec];

    /// Defaults loaded into a fresh settings record.
    fn factory_data(&self) -> &'static [u8];

    fn name(&self) -> &'static str;

    /// Write one setting. Out-of-range values are clamped, unknown keys
    /// ignored.
    fn set_parameter(&mut self, ctx: &mut Context, key: u8, value: u8);

    fn get_parameter(&self, key: u8) -> u8;

    fn settings_size(&self) -> usize {
        self.factory_data().len()
    }

    fn on_init(&mut self, _ctx: &mut Context) {}

    fn on_raw_byte(&mut self, _ctx: &mut Context, _byte: u8) {}

    fn on_raw_midi_data(&mut self, _ctx: &mut Context, _status: u8, _data: &[u8]) {}

    fn on_note_on(&mut self, _ctx: &mut Context, _channel: u8, _note: u8, _velocity: u8) {}

    fn on_note_off(&mut self, _ctx: &mut Context, _channel: u8, _note: u8, _velocity: u8) {}

    fn on_control_change(&mut self, _ctx: &mut Context, _channel: u8, _controller: u8, _value: u8) {}

    fn on_clock(&mut self, _ctx: &mut Context) {}

    fn on_start(&mut self, _ctx: &mut Context) {}

    fn on_continue(&mut self, _ctx: &mut Context) {}

    fn on_stop(&mut self, _ctx: &mut Context) {}

    /// Runs once when the host is deactivated. Defaults to a transport stop.
    fn on_exit(&mut self, ctx: &mut Context) {
        self.on_stop(ctx);
    }

    fn on_internal_clock_tick(&mut self, _ctx: &mut Context) {}
}

/// Apply a whole settings record through `set_parameter`, key by key.
pub fn load_settings<A: App + ?Sized>(app: &mut A, ctx: &mut Context, settings: &[u8]) {
    for (key, &value) in settings.iter().enumerate().take(app.settings_size()) {
        app.set_parameter(ctx, key as u8, value);
    }
}

/// Current values of every key as a settings record.
pub fn save_settings<A: App + ?Sized>(app: &A) -> Vec<u8> {
    (0..app.settings_size()).map(|key| app.get_parameter(key as u8)).collect()
}
