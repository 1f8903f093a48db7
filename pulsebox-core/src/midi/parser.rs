use super::{data_length, is_realtime, is_status, is_sysex};
use pulsebox_types::status;

/// One unit of the incoming byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Single-byte realtime message (0xF8..=0xFF).
    Realtime(u8),
    /// Complete channel voice/mode message.
    Channel { status: u8, data: [u8; 2], len: usize },
    /// Complete system common message (0xF1..=0xF6).
    Common { status: u8, data: [u8; 2], len: usize },
    /// A byte of a SysEx transfer, framing bytes included.
    SysEx(u8),
}

impl MidiMessage {
    pub fn data(&self) -> &[u8] {
        match self {
            MidiMessage::Channel { data, len, .. } | MidiMessage::Common { data, len, .. } => {
                &data[..*len]
            }
            _ => &[],
        }
    }
}

/// Incremental parser with running status.
///
/// Realtime bytes may appear anywhere, including between the data bytes of
/// another message, and never disturb the message being assembled.
#[derive(Debug, Default, Clone)]
pub struct MidiParser {
    running_status: u8,
    expected: usize,
    data: [u8; 2],
    received: usize,
    in_sysex: bool,
}

impl MidiParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn feed(&mut self, byte: u8) -> Option<MidiMessage> {
        if is_realtime(byte) {
            return Some(MidiMessage::Realtime(byte));
        }

        if is_status(byte) {
            return self.feed_status(byte);
        }

        if self.in_sysex {
            return Some(MidiMessage::SysEx(byte));
        }
        if self.running_status == 0 {
            log::trace!(target: "midi", "stray data byte {:#04x}", byte);
            return None;
        }

        self.data[self.received] = byte;
        self.received += 1;
        if self.received < self.expected {
            return None;
        }

        let status = self.running_status;
        let message = if status >= status::SYSEX_START {
            // System common messages cancel running status.
            self.running_status = 0;
            MidiMessage::Common { status, data: self.data, len: self.expected }
        } else {
            MidiMessage::Channel { status, data: self.data, len: self.expected }
        };
        self.received = 0;
        Some(message)
    }

    fn feed_status(&mut self, byte: u8) -> Option<MidiMessage> {
        self.received = 0;
        if is_sysex(byte) {
            self.in_sysex = byte == status::SYSEX_START;
            self.running_status = 0;
            return Some(MidiMessage::SysEx(byte));
        }
        self.in_sysex = false;
        match data_length(byte) {
            Some(0) => {
                self.running_status = 0;
                Some(MidiMessage::Common { status: byte, data: [0; 2], len: 0 })
            }
            Some(expected) => {
                self.running_status = byte;
                self.expected = expected;
                None
            }
            None => {
                // Undefined system common status (0xF4, 0xF5).
                self.running_status = 0;
                None
            }
        }
    }
}
