//! MIDI output plumbing and byte-stream parsing.

mod parser;
pub mod ports;

pub use parser::{MidiMessage, MidiParser};
pub use ports::{MidiInputLink, MidiOutputSink, MidiPortInfo};

use pulsebox_types::status;

/// Destination for bytes produced by the engine.
///
/// `send_now` carries single bytes (realtime messages, forwarded raw bytes);
/// `send`/`send3` carry whole channel messages so adapters can frame them.
pub trait MidiSink {
    fn send_now(&mut self, byte: u8);

    fn send(&mut self, status: u8, data: &[u8]) {
        self.send_now(status);
        for &byte in data {
            self.send_now(byte);
        }
    }

    fn send3(&mut self, status: u8, data1: u8, data2: u8) {
        self.send(status, &[data1, data2]);
    }
}

impl MidiSink for Vec<u8> {
    fn send_now(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Discards everything. Useful when an app runs without an output port.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MidiSink for NullSink {
    fn send_now(&mut self, _byte: u8) {}
}

pub fn is_status(byte: u8) -> bool {
    byte & 0x80 != 0
}

pub fn is_realtime(byte: u8) -> bool {
    byte >= status::CLOCK
}

pub fn is_sysex(byte: u8) -> bool {
    byte == status::SYSEX_START || byte == status::SYSEX_END
}

/// Number of data bytes following a status byte, `None` for SysEx and realtime.
pub fn data_length(status_byte: u8) -> Option<usize> {
    match status_byte & 0xf0 {
        0x80 | 0x90 | 0xa0 | 0xb0 | 0xe0 => Some(2),
        0xc0 | 0xd0 => Some(1),
        0xf0 => match status_byte {
            0xf1 | 0xf3 => Some(1),
            0xf2 => Some(2),
            0xf6 => Some(0),
            _ => None,
        },
        _ => None,
    }
}
