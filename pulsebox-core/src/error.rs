use std::fmt;

/// Error from the edges around the engine: ports, config IO, the engine thread.
#[derive(Debug)]
pub enum PulseError {
    Midi(String),
    PortNotFound(String),
    EngineDisconnected,
    Io(std::io::Error),
}

impl From<std::io::Error> for PulseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Midi(e) => write!(f, "MIDI error: {}", e),
            Self::PortNotFound(name) => write!(f, "no MIDI port matching '{}'", name),
            Self::EngineDisconnected => write!(f, "engine thread disconnected"),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for PulseError {}
