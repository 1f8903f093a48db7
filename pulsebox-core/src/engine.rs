//! Engine thread.
//!
//! Owns a [`Host`] on a dedicated thread and stands in for the device's
//! periodic timer interrupt: wall-clock time is converted into timer ticks at
//! the clock engine's rate. MIDI input and parameter writes arrive over a
//! command channel and are applied between ticks, never inside one.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::app::App;
use crate::error::PulseError;
use crate::host::Host;
use crate::midi::MidiSink;

/// How often the thread wakes to run due timer ticks.
const WAKE_INTERVAL: Duration = Duration::from_micros(500);

/// Longest stretch of missed time the thread replays, in milliseconds. Beyond
/// this the backlog is dropped so a stalled thread does not burst pulses.
const MAX_CATCH_UP_MS: u64 = 50;

pub enum EngineCmd {
    /// Raw bytes from an input port, in arrival order.
    MidiIn(Vec<u8>),
    SetParameter { key: u8, value: u8 },
    GetParameter { key: u8, reply: Sender<u8> },
    GetSettings { reply: Sender<Vec<u8>> },
    Shutdown,
}

struct EngineThread<A: App, S: MidiSink> {
    host: Host<A, S>,
    cmd_rx: Receiver<EngineCmd>,
    started_at: Instant,
    ticks_done: u64,
}

impl<A: App, S: MidiSink> EngineThread<A, S> {
    fn new(host: Host<A, S>, cmd_rx: Receiver<EngineCmd>) -> Self {
        Self {
            host,
            cmd_rx,
            started_at: Instant::now(),
            ticks_done: 0,
        }
    }

    fn run(mut self) -> Host<A, S> {
        loop {
            crossbeam_channel::select! {
                recv(self.cmd_rx) -> result => {
                    match result {
                        Ok(cmd) => {
                            if self.handle_cmd(cmd) {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                default(WAKE_INTERVAL) => {}
            }

            if self.drain_commands() {
                break;
            }
            self.run_due_ticks();
        }

        self.host.deactivate();
        log::debug!(target: "engine", "engine thread stopped after {} ticks", self.ticks_done);
        self.host
    }

    fn drain_commands(&mut self) -> bool {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            if self.handle_cmd(cmd) {
                return true;
            }
        }
        false
    }

    /// Returns true on shutdown.
    fn handle_cmd(&mut self, cmd: EngineCmd) -> bool {
        match cmd {
            EngineCmd::MidiIn(bytes) => self.host.on_midi_bytes(&bytes),
            EngineCmd::SetParameter { key, value } => {
                log::debug!(target: "engine", "set parameter {} = {}", key, value);
                self.host.set_parameter(key, value);
            }
            EngineCmd::GetParameter { key, reply } => {
                let _ = reply.send(self.host.get_parameter(key));
            }
            EngineCmd::GetSettings { reply } => {
                let _ = reply.send(self.host.settings());
            }
            EngineCmd::Shutdown => return true,
        }
        false
    }

    fn run_due_ticks(&mut self) {
        let rate = self.host.clock().timer_rate_hz() as u128;
        let due = (self.started_at.elapsed().as_nanos() * rate / 1_000_000_000) as u64;
        let max_backlog = self.host.clock().timer_rate_hz() as u64 * MAX_CATCH_UP_MS / 1_000;
        if due > self.ticks_done + max_backlog {
            log::warn!(
                target: "engine",
                "fell {} timer ticks behind, skipping",
                due - self.ticks_done
            );
            self.ticks_done = due - max_backlog;
        }
        while self.ticks_done < due {
            self.host.on_timer_tick();
            self.ticks_done += 1;
        }
    }
}

/// Handle to a running engine thread.
pub struct EngineHandle<A: App, S: MidiSink> {
    cmd_tx: Sender<EngineCmd>,
    join_handle: Option<JoinHandle<Host<A, S>>>,
}

impl<A, S> EngineHandle<A, S>
where
    A: App + Send + 'static,
    S: MidiSink + Send + 'static,
{
    /// Move an activated host onto its own thread.
    pub fn spawn(host: Host<A, S>) -> Result<Self, PulseError> {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let join_handle = thread::Builder::new()
            .name("pulsebox-engine".into())
            .spawn(move || EngineThread::new(host, cmd_rx).run())?;
        Ok(Self {
            cmd_tx,
            join_handle: Some(join_handle),
        })
    }

    /// Sender for input adapters that feed the engine directly.
    pub fn sender(&self) -> Sender<EngineCmd> {
        self.cmd_tx.clone()
    }

    pub fn send_cmd(&self, cmd: EngineCmd) -> Result<(), PulseError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| PulseError::EngineDisconnected)
    }

    pub fn midi_in(&self, bytes: &[u8]) -> Result<(), PulseError> {
        self.send_cmd(EngineCmd::MidiIn(bytes.to_vec()))
    }

    pub fn set_parameter(&self, key: u8, value: u8) -> Result<(), PulseError> {
        self.send_cmd(EngineCmd::SetParameter { key, value })
    }

    pub fn get_parameter(&self, key: u8) -> Result<u8, PulseError> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.send_cmd(EngineCmd::GetParameter { key, reply })?;
        rx.recv().map_err(|_| PulseError::EngineDisconnected)
    }

    pub fn settings(&self) -> Result<Vec<u8>, PulseError> {
        let (reply, rx) = crossbeam_channel::bounded(1);
        self.send_cmd(EngineCmd::GetSettings { reply })?;
        rx.recv().map_err(|_| PulseError::EngineDisconnected)
    }

    /// Stop the app, join the thread and hand the host back.
    pub fn shutdown(mut self) -> Result<Host<A, S>, PulseError> {
        let _ = self.cmd_tx.send(EngineCmd::Shutdown);
        let handle = self
            .join_handle
            .take()
            .ok_or(PulseError::EngineDisconnected)?;
        handle.join().map_err(|_| PulseError::EngineDisconnected)
    }
}

impl<A: App, S: MidiSink> Drop for EngineHandle<A, S> {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCmd::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
