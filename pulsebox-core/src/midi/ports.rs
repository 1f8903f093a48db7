//! `midir` adapters: an output sink that frames engine bytes into complete
//! messages, and an input link that feeds received bytes to the engine thread.

use crossbeam_channel::Sender;
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use super::{MidiMessage, MidiParser, MidiSink};
use crate::engine::EngineCmd;
use crate::error::PulseError;

const CLIENT_NAME: &str = "pulsebox";

/// Information about an available MIDI port
#[derive(Debug, Clone)]
pub struct MidiPortInfo {
    pub index: usize,
    pub name: String,
}

pub fn list_input_ports() -> Result<Vec<MidiPortInfo>, PulseError> {
    let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| PulseError::Midi(e.to_string()))?;
    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(index, port)| {
            midi_in
                .port_name(port)
                .ok()
                .map(|name| MidiPortInfo { index, name })
        })
        .collect())
}

pub fn list_output_ports() -> Result<Vec<MidiPortInfo>, PulseError> {
    let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| PulseError::Midi(e.to_string()))?;
    Ok(midi_out
        .ports()
        .iter()
        .enumerate()
        .filter_map(|(index, port)| {
            midi_out
                .port_name(port)
                .ok()
                .map(|name| MidiPortInfo { index, name })
        })
        .collect())
}

/// First port whose name contains `pattern` (case-insensitive).
fn find_port(ports: &[MidiPortInfo], pattern: &str) -> Result<usize, PulseError> {
    let needle = pattern.to_lowercase();
    ports
        .iter()
        .find(|p| p.name.to_lowercase().contains(&needle))
        .map(|p| p.index)
        .ok_or_else(|| PulseError::PortNotFound(pattern.to_string()))
}

/// Output port wrapped as a [`MidiSink`].
pub struct MidiOutputSink {
    connection: MidiOutputConnection,
    port_name: String,
    framer: MidiParser,
    sysex: Vec<u8>,
}

impl MidiOutputSink {
    pub fn connect(port_index: usize) -> Result<Self, PulseError> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| PulseError::Midi(e.to_string()))?;
        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or_else(|| PulseError::PortNotFound(format!("#{}", port_index)))?;
        let port_name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| "Unknown".to_string());
        let connection = midi_out
            .connect(port, "pulsebox-output")
            .map_err(|e| PulseError::Midi(e.to_string()))?;
        log::info!(target: "midi", "output connected: {}", port_name);
        Ok(Self {
            connection,
            port_name,
            framer: MidiParser::new(),
            sysex: Vec::new(),
        })
    }

    pub fn connect_matching(pattern: &str) -> Result<Self, PulseError> {
        let index = find_port(&list_output_ports()?, pattern)?;
        Self::connect(index)
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn write(&mut self, bytes: &[u8]) {
        if let Err(e) = self.connection.send(bytes) {
            log::warn!(target: "midi", "send failed: {}", e);
        }
    }

    fn write_message(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::Realtime(byte) => self.write(&[byte]),
            MidiMessage::Channel { status, data, len } | MidiMessage::Common { status, data, len } => {
                let mut frame = [status, 0, 0];
                frame[1..=len].copy_from_slice(&data[..len]);
                self.write(&frame[..=len]);
            }
            MidiMessage::SysEx(byte) => {
                self.sysex.push(byte);
                if byte == pulsebox_types::status::SYSEX_END {
                    let frame = std::mem::take(&mut self.sysex);
                    self.write(&frame);
                }
            }
        }
    }
}

impl MidiSink for MidiOutputSink {
    fn send_now(&mut self, byte: u8) {
        if let Some(message) = self.framer.feed(byte) {
            self.write_message(message);
        }
    }

    fn send(&mut self, status: u8, data: &[u8]) {
        // Whole messages bypass the framer but must not inherit its running status.
        self.framer.reset();
        let mut frame = [0u8; 3];
        let len = data.len().min(2);
        frame[0] = status;
        frame[1..=len].copy_from_slice(&data[..len]);
        self.write(&frame[..=len]);
    }
}

/// Live input connection forwarding every received byte to the engine.
pub struct MidiInputLink {
    connection: Option<MidiInputConnection<()>>,
    port_name: String,
}

impl MidiInputLink {
    pub fn connect(port_index: usize, engine: Sender<EngineCmd>) -> Result<Self, PulseError> {
        let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| PulseError::Midi(e.to_string()))?;
        // Clock and SysEx are filtered by default on some backends.
        midi_in.ignore(Ignore::None);
        let ports = midi_in.ports();
        let port = ports
            .get(port_index)
            .ok_or_else(|| PulseError::PortNotFound(format!("#{}", port_index)))?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "Unknown".to_string());

        let connection = midi_in
            .connect(
                port,
                "pulsebox-input",
                move |_timestamp, message, _| {
                    let _ = engine.send(EngineCmd::MidiIn(message.to_vec()));
                },
                (),
            )
            .map_err(|e| PulseError::Midi(e.to_string()))?;
        log::info!(target: "midi", "input connected: {}", port_name);

        Ok(Self {
            connection: Some(connection),
            port_name,
        })
    }

    pub fn connect_matching(pattern: &str, engine: Sender<EngineCmd>) -> Result<Self, PulseError> {
        let index = find_port(&list_input_ports()?, pattern)?;
        Self::connect(index, engine)
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Drop for MidiInputLink {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}
